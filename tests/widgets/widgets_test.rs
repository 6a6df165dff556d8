#[path = "../common/mod.rs"]
mod common;

use serde_json::json;

use slicer::error::{SlicerError, ValidationError};
use slicer::frame::Value;
use slicer::schema::Reference;
use slicer::sql::lit_str;
use slicer::widgets::{
    Axis, CsvWidget, DataTablesJs, FrameWidget, HighCharts, Item, Series, WidgetOutput,
};

use common::{sqlite_slicer, vertica_slicer};

const DAY_MS: i64 = 86_400_000;
const JAN_1_2016_MS: i64 = 1_451_606_400_000;

fn json_output(outputs: Vec<WidgetOutput>) -> serde_json::Value {
    match outputs.into_iter().next() {
        Some(WidgetOutput::Json(json)) => json,
        other => panic!("expected json, got {:?}", other),
    }
}

#[test]
fn test_datatables_rows() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let json = json_output(
        slicer
            .data()
            .widget(DataTablesJs::new(vec![Item::from(votes)]))
            .dimension(party)
            .fetch()
            .unwrap(),
    );

    assert_eq!(json["columns"][0]["data"], json!("political_party"));
    assert_eq!(json["columns"][0]["title"], json!("Party"));
    assert_eq!(json["columns"][1]["data"], json!("votes"));
    assert_eq!(json["columns"][1]["title"], json!("Votes"));
    assert_eq!(
        json["data"],
        json!([
            {
                "political_party": {"value": "d", "display": "Democrat"},
                "votes": {"value": 51, "display": "51"},
            },
            {
                "political_party": {"value": "r", "display": "Republican"},
                "votes": {"value": 51, "display": "51"},
            },
        ])
    );
}

#[test]
fn test_datatables_unique_dimension_uses_display() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let state = slicer.dimension("state").unwrap();

    let json = json_output(
        slicer
            .data()
            .widget(DataTablesJs::new(vec![Item::from(votes)]))
            .dimension(state)
            .fetch()
            .unwrap(),
    );

    assert_eq!(json["data"][0]["state"]["display"], json!("California"));
    assert_eq!(json["data"][1]["state"]["display"], json!("Texas"));
    assert_eq!(json["data"][1]["votes"]["value"], json!(63));
}

#[test]
fn test_datatables_totals_row() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let json = json_output(
        slicer
            .data()
            .widget(DataTablesJs::new(vec![Item::from(votes)]))
            .dimension(&party.rollup())
            .fetch()
            .unwrap(),
    );

    assert_eq!(json["data"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"][2]["political_party"]["display"], json!("Totals"));
    assert_eq!(json["data"][2]["votes"]["display"], json!("102"));
}

#[test]
fn test_highcharts_datetime_series() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let json = json_output(
        slicer
            .data()
            .widget(
                HighCharts::new()
                    .title("Votes by day")
                    .axis(Axis::new().series(Series::line(votes))),
            )
            .dimension(ts)
            .fetch()
            .unwrap(),
    );

    assert_eq!(json["title"]["text"], json!("Votes by day"));
    assert_eq!(json["xAxis"]["type"], json!("datetime"));
    assert_eq!(json["series"].as_array().unwrap().len(), 1);

    let series = &json["series"][0];
    assert_eq!(series["type"], json!("line"));
    assert_eq!(series["name"], json!("Votes"));
    assert_eq!(series["dashStyle"], json!("Solid"));
    assert_eq!(
        series["data"],
        json!([
            [JAN_1_2016_MS, 30],
            [JAN_1_2016_MS + DAY_MS, 35],
            [JAN_1_2016_MS + 2 * DAY_MS, 37],
        ])
    );
}

#[test]
fn test_highcharts_series_per_group() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let json = json_output(
        slicer
            .data()
            .widget(HighCharts::new().axis(Axis::new().series(Series::column(votes))))
            .dimension(ts)
            .dimension(party)
            .fetch()
            .unwrap(),
    );

    let names: Vec<&str> = json["series"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Votes (Democrat)", "Votes (Republican)"]);
    assert_eq!(json["series"][1]["data"][2], json!([JAN_1_2016_MS + 2 * DAY_MS, 19]));
}

#[test]
fn test_highcharts_reference_series_are_dashed() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let json = json_output(
        slicer
            .data()
            .widget(HighCharts::new().axis(Axis::new().series(Series::line(votes))))
            .dimension(ts)
            .reference(Reference::day_over_day(ts))
            .filter(ts.between(lit_str("2016-01-02 00:00:00"), lit_str("2016-01-03 00:00:00")))
            .fetch()
            .unwrap(),
    );

    assert_eq!(json["series"][1]["name"], json!("Votes (DoD)"));
    assert_eq!(json["series"][1]["dashStyle"], json!("Dash"));
    assert_eq!(json["series"][1]["data"][0], json!([JAN_1_2016_MS + DAY_MS, 30]));
}

#[test]
fn test_highcharts_categories() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let json = json_output(
        slicer
            .data()
            .widget(HighCharts::new().axis(Axis::new().series(Series::bar(votes))))
            .dimension(party)
            .fetch()
            .unwrap(),
    );

    assert_eq!(
        json["xAxis"],
        json!({"type": "category", "categories": ["Democrat", "Republican"]})
    );
    assert_eq!(json["series"][0]["data"], json!([[0, 51], [1, 51]]));
}

#[test]
fn test_highcharts_without_series_is_rejected() {
    let slicer = vertica_slicer();
    let ts = slicer.dimension("timestamp").unwrap();

    let err = slicer
        .data()
        .widget(HighCharts::new().axis(Axis::new()))
        .dimension(ts)
        .query()
        .unwrap_err();
    assert!(matches!(
        err,
        SlicerError::Validation(ValidationError::MetricRequired { .. })
    ));
}

#[test]
fn test_csv_with_pivot() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let outputs = slicer
        .data()
        .widget(CsvWidget::new(vec![Item::from(votes)]).pivot(&["political_party"]))
        .dimension(ts)
        .dimension(party)
        .fetch()
        .unwrap();

    assert_eq!(
        outputs[0],
        WidgetOutput::Csv(
            "Timestamp,Votes|Democrat,Votes|Republican\n\
             2016-01-01,15,15\n\
             2016-01-02,18,17\n\
             2016-01-03,18,19\n"
                .to_string()
        )
    );
}

#[test]
fn test_frame_pivot() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let wins = slicer.metric("wins").unwrap();
    let winner = slicer.dimension("winner").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let outputs = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes), Item::from(wins)]).pivot(&["winner"]))
        .dimension(party)
        .dimension(winner)
        .fetch()
        .unwrap();

    let WidgetOutput::Frame(frame) = &outputs[0] else {
        panic!("expected a frame");
    };
    assert_eq!(frame.index_names(), ["Party"]);
    assert_eq!(frame.column_names().len(), 4);
    assert_eq!(frame.index_at(0), &[Value::from("Democrat")]);
}
