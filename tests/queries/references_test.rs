#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;

use slicer::frame::Value;
use slicer::schema::{DatetimeInterval, Reference};
use slicer::sql::lit_str;
use slicer::widgets::{FrameWidget, Item, WidgetOutput};

use common::{sqlite_slicer, vertica_slicer};

#[test]
fn test_reference_container() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .reference(Reference::day_over_day(ts))
        .query()
        .unwrap();

    assert!(sql.contains(
        "COALESCE(\"$base\".\"$d$timestamp\",TIMESTAMPADD('day',1,\"$dod\".\"$d$timestamp\")) AS \"$d$timestamp\""
    ));
    assert!(sql.contains("\"$base\".\"$m$votes\" AS \"$m$votes\""));
    assert!(sql.contains("\"$dod\".\"$m$votes\" AS \"$m$votes_dod\""));
    assert!(sql.contains(") AS \"$base\""));
    assert!(sql.contains("FULL OUTER JOIN ("));
    assert!(sql.contains(") AS \"$dod\" ON \"$base\".\"$d$timestamp\" = TIMESTAMPADD('day',1,\"$dod\".\"$d$timestamp\")"));
}

#[test]
fn test_reference_filters_are_shifted() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .reference(Reference::week_over_week(ts))
        .filter(ts.between(lit_str("2018-01-01"), lit_str("2018-01-31")))
        .query()
        .unwrap();

    assert!(sql.contains("WHERE \"timestamp\" BETWEEN '2018-01-01' AND '2018-01-31'"));
    assert!(sql.contains(
        "WHERE TIMESTAMPADD('week',1,\"timestamp\") BETWEEN '2018-01-01' AND '2018-01-31'"
    ));
}

#[test]
fn test_delta_and_delta_percent() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .reference(Reference::year_over_year(ts).delta())
        .reference(Reference::year_over_year(ts).delta_percent())
        .query()
        .unwrap();

    // Both share one subquery.
    assert_eq!(sql.matches(") AS \"$yoy\"").count(), 1);
    assert!(sql.contains("AS \"$m$votes_yoy_delta\""));
    assert!(sql.contains("AS \"$m$votes_yoy_delta_percent\""));
    assert!(sql.contains("NULLIF(\"$yoy\".\"$m$votes\",0)"));
}

#[test]
fn test_reference_with_rollup() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .dimension(&party.rollup())
        .reference(Reference::day_over_day(ts))
        .query()
        .unwrap();

    assert_eq!(sql.matches("UNION ALL").count(), 1);
    // Each branch has its own container.
    assert_eq!(sql.matches(") AS \"$dod\"").count(), 2);
    // The totals branch joins on the timestamp only.
    assert!(sql.contains("COALESCE(\"$base\".\"$d$political_party\",\"$dod\".\"$d$political_party\")"));
    assert!(sql.contains("NULL AS \"$d$political_party\""));
}

#[test]
fn test_weekly_year_over_year_aligns_weeks() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let weekly = slicer
        .dimension("timestamp")
        .unwrap()
        .clone()
        .with_interval(DatetimeInterval::Weekly);

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(&weekly)
        .reference(Reference::year_over_year(&weekly))
        .query()
        .unwrap();

    assert!(sql.contains(
        "TIMESTAMPADD('year',-1,TRUNC(TIMESTAMPADD('year',1,\"timestamp\"),'IW'))"
    ));
}

#[test]
fn test_day_over_day_values() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let outputs = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .reference(Reference::day_over_day(ts))
        .reference(Reference::day_over_day(ts).delta())
        .filter(ts.between(lit_str("2016-01-02 00:00:00"), lit_str("2016-01-03 00:00:00")))
        .fetch()
        .unwrap();

    let WidgetOutput::Frame(frame) = &outputs[0] else {
        panic!("expected a frame");
    };
    assert_eq!(frame.column_names(), ["Votes", "Votes (DoD)", "Votes (DoD Δ)"]);
    assert_eq!(frame.len(), 2);

    let day = |d: u32| {
        Value::Timestamp(NaiveDate::from_ymd_opt(2016, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    };
    assert_eq!(frame.index_at(0), &[day(2)]);
    assert_eq!(frame.row(0), &[Value::Int(35), Value::Int(30), Value::Int(5)]);
    assert_eq!(frame.index_at(1), &[day(3)]);
    assert_eq!(frame.row(1), &[Value::Int(37), Value::Int(35), Value::Int(2)]);
}

#[test]
fn test_delta_percent_keeps_fractions() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let close = |value: &Value, expected: f64| match value {
        Value::Float(f) => (f - expected).abs() < 0.01,
        _ => false,
    };

    let outputs = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .reference(Reference::day_over_day(ts).delta_percent())
        .filter(ts.between(lit_str("2016-01-02 00:00:00"), lit_str("2016-01-03 00:00:00")))
        .fetch()
        .unwrap();
    let WidgetOutput::Frame(frame) = &outputs[0] else {
        panic!("expected a frame");
    };
    assert_eq!(frame.column_names(), ["Votes", "Votes (DoD Δ%)"]);
    // (35 - 30) * 100 / 30 and (37 - 35) * 100 / 35
    assert!(close(&frame.row(0)[1], 16.67), "{:?}", frame.row(0));
    assert!(close(&frame.row(1)[1], 5.71), "{:?}", frame.row(1));

    let outputs = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .dimension(party)
        .reference(Reference::day_over_day(ts).delta_percent())
        .filter(ts.between(lit_str("2016-01-02 00:00:00"), lit_str("2016-01-02 00:00:00")))
        .fetch()
        .unwrap();
    let WidgetOutput::Frame(frame) = &outputs[0] else {
        panic!("expected a frame");
    };
    let republican = (0..frame.len())
        .find(|&r| frame.index_at(r)[1] == Value::from("Republican"))
        .unwrap();
    // (17 - 15) * 100 / 15
    assert!(close(&frame.row(republican)[1], 13.33), "{:?}", frame.row(republican));
}
