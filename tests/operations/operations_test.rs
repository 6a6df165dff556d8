#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;

use slicer::frame::{DataFrame, Value};
use slicer::operations::Operation;
use slicer::schema::Reference;
use slicer::sql::{lit_str, SortDir};
use slicer::widgets::{FrameWidget, Item, WidgetOutput};

use common::{sqlite_slicer, vertica_slicer};

fn frame_output(outputs: Vec<WidgetOutput>) -> DataFrame {
    match outputs.into_iter().next() {
        Some(WidgetOutput::Frame(frame)) => frame,
        other => panic!("expected a frame, got {:?}", other),
    }
}

fn column(frame: &DataFrame, position: usize) -> Vec<Value> {
    (0..frame.len()).map(|r| frame.row(r)[position].clone()).collect()
}

#[test]
fn test_cumsum() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![
                Item::from(votes),
                Item::from(Operation::cumsum(votes)),
            ]))
            .dimension(ts)
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.column_names(), ["Votes", "CumSum(Votes)"]);
    assert_eq!(column(&frame, 1), vec![Value::Int(30), Value::Int(65), Value::Int(102)]);
}

#[test]
fn test_cumsum_restarts_per_group() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(Operation::cumsum(votes))]))
            .dimension(ts)
            .dimension(party)
            .fetch()
            .unwrap(),
    );

    // Rows are (day, party) in day order; each party accumulates alone.
    assert_eq!(
        column(&frame, 0),
        vec![
            Value::Int(15),
            Value::Int(15),
            Value::Int(33),
            Value::Int(32),
            Value::Int(51),
            Value::Int(51),
        ]
    );
}

#[test]
fn test_cummean() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(Operation::cummean(votes))]))
            .dimension(ts)
            .fetch()
            .unwrap(),
    );

    assert_eq!(
        column(&frame, 0),
        vec![Value::Float(30.0), Value::Float(32.5), Value::Float(34.0)]
    );
}

#[test]
fn test_rolling_mean_widens_and_trims() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let builder = slicer
        .data()
        .widget(FrameWidget::new(vec![
            Item::from(votes),
            Item::from(Operation::rolling_mean(votes, 2, 2)),
        ]))
        .dimension(ts)
        .filter(ts.between(lit_str("2016-01-02 00:00:00"), lit_str("2016-01-03 00:00:00")));

    let sql = builder.query().unwrap();
    assert!(sql.contains("BETWEEN DATETIME('2016-01-02 00:00:00','-1 days') AND '2016-01-03 00:00:00'"));

    let frame = frame_output(builder.fetch().unwrap());
    assert_eq!(frame.len(), 2);
    assert_eq!(column(&frame, 0), vec![Value::Int(35), Value::Int(37)]);
    assert_eq!(column(&frame, 1), vec![Value::Float(32.5), Value::Float(36.0)]);
}

#[test]
fn test_cumsum_accumulates_in_time_order_under_descending_order() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![
                Item::from(votes),
                Item::from(Operation::cumsum(votes)),
            ]))
            .dimension(ts)
            .orderby(ts, SortDir::Desc)
            .fetch()
            .unwrap(),
    );

    // Rows stay newest first; the running sum still starts at the oldest day.
    assert_eq!(column(&frame, 0), vec![Value::Int(37), Value::Int(35), Value::Int(30)]);
    assert_eq!(column(&frame, 1), vec![Value::Int(102), Value::Int(65), Value::Int(30)]);
}

#[test]
fn test_rolling_mean_trims_by_date_under_descending_order() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![
                Item::from(votes),
                Item::from(Operation::rolling_mean(votes, 2, 2)),
            ]))
            .dimension(ts)
            .filter(ts.between(lit_str("2016-01-02 00:00:00"), lit_str("2016-01-03 00:00:00")))
            .orderby(ts, SortDir::Desc)
            .fetch()
            .unwrap(),
    );

    let day = |d: u32| {
        Value::Timestamp(NaiveDate::from_ymd_opt(2016, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    };
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.index_at(0), &[day(3)]);
    assert_eq!(frame.index_at(1), &[day(2)]);
    assert_eq!(column(&frame, 1), vec![Value::Float(36.0), Value::Float(32.5)]);
}

#[test]
fn test_rolling_mean_without_range_filter_is_not_widened() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(Operation::rolling_mean(votes, 3, 3))]))
        .dimension(ts)
        .query()
        .unwrap();
    assert!(!sql.contains("TIMESTAMPADD"));
}

#[test]
fn test_share_over_dimension_scrubs_its_totals() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![
                Item::from(votes),
                Item::from(Operation::share(votes, Some(party))),
            ]))
            .dimension(ts)
            .dimension(party)
            .filter(ts.between(lit_str("2016-01-03 00:00:00"), lit_str("2016-01-03 00:00:00")))
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.column_names(), ["Votes", "Share(Votes)"]);
    // No totals row was requested, so none is shown.
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.index_at(0)[1], Value::from("Democrat"));
    assert_eq!(column(&frame, 1), vec![Value::Float(18.0 * 100.0 / 37.0), Value::Float(19.0 * 100.0 / 37.0)]);
}

#[test]
fn test_share_keeps_requested_totals() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(Operation::share(votes, Some(party)))]))
            .dimension(&party.rollup())
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.len(), 3);
    assert_eq!(
        column(&frame, 0),
        vec![Value::Float(50.0), Value::Float(50.0), Value::Float(100.0)]
    );
}

#[test]
fn test_operations_run_per_reference() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(Operation::cumsum(votes))]))
            .dimension(ts)
            .reference(Reference::day_over_day(ts))
            .filter(ts.between(lit_str("2016-01-02 00:00:00"), lit_str("2016-01-03 00:00:00")))
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.column_names(), ["CumSum(Votes)", "CumSum(Votes) (DoD)"]);
    assert_eq!(column(&frame, 0), vec![Value::Int(35), Value::Int(72)]);
    assert_eq!(column(&frame, 1), vec![Value::Int(30), Value::Int(65)]);
}
