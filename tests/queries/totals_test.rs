#[path = "../common/mod.rs"]
mod common;

use slicer::formats::TOTALS_LABEL;
use slicer::frame::Value;
use slicer::sql::lit_str;
use slicer::widgets::{FrameWidget, Item, WidgetOutput};

use common::{sqlite_slicer, vertica_slicer};

fn frame_output(outputs: Vec<WidgetOutput>) -> slicer::frame::DataFrame {
    match outputs.into_iter().next() {
        Some(WidgetOutput::Frame(frame)) => frame,
        other => panic!("expected a frame, got {:?}", other),
    }
}

#[test]
fn test_rollup_adds_union_branch() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .dimension(&party.rollup())
        .query()
        .unwrap();

    assert_eq!(sql.matches("UNION ALL").count(), 1);
    assert!(sql.contains("NULL AS \"$d$political_party\""));
    assert!(sql.ends_with("ORDER BY \"$d$timestamp\",\"$d$political_party\""));
}

#[test]
fn test_rollup_totals_every_later_dimension() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();
    let candidate = slicer.dimension("candidate").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(&party.rollup())
        .dimension(candidate)
        .query()
        .unwrap();

    // One totals branch: party and candidate both become placeholders.
    assert_eq!(sql.matches("UNION ALL").count(), 1);
    assert!(sql.contains("NULL AS \"$d$candidate\""));
    assert!(sql.contains("NULL AS \"$d$candidate_display\""));
}

#[test]
fn test_two_rollups_add_two_branches() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();
    let candidate = slicer.dimension("candidate").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .dimension(&party.rollup())
        .dimension(&candidate.rollup())
        .query()
        .unwrap();

    assert_eq!(sql.matches("UNION ALL").count(), 2);
}

#[test]
fn test_filter_excluded_from_totals() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(&party.rollup())
        .filter(party.isin(vec!["d"]).excluding_totals())
        .query()
        .unwrap();

    assert_eq!(sql.matches("WHERE").count(), 1);
}

#[test]
fn test_totals_rows_are_fetched_and_labelled() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(votes)]))
            .dimension(ts)
            .dimension(&party.rollup())
            .filter(ts.between(lit_str("2016-01-01 00:00:00"), lit_str("2016-01-01 00:00:00")))
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.index_names(), ["Timestamp", "Party"]);
    assert_eq!(frame.len(), 3);
    assert_eq!(frame.index_at(0)[1], Value::from("Democrat"));
    assert_eq!(frame.index_at(1)[1], Value::from("Republican"));
    assert_eq!(frame.index_at(2)[1], Value::from(TOTALS_LABEL));
    assert_eq!(frame.row(0), &[Value::Int(15)]);
    assert_eq!(frame.row(1), &[Value::Int(15)]);
    assert_eq!(frame.row(2), &[Value::Int(30)]);
}

#[test]
fn test_rolled_up_leading_dimension_totals_last() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(votes)]))
            .dimension(&party.rollup())
            .fetch()
            .unwrap(),
    );

    let labels: Vec<Value> = (0..frame.len()).map(|r| frame.index_at(r)[0].clone()).collect();
    assert_eq!(
        labels,
        vec![Value::from("Democrat"), Value::from("Republican"), Value::from("Totals")]
    );
    assert_eq!(frame.row(2), &[Value::Int(102)]);
}
