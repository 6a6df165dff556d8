#[path = "../common/mod.rs"]
mod common;

use slicer::error::{AdapterError, SlicerError};
use slicer::frame::{DataFrame, Value};
use slicer::sql::{lit_int, lit_str, SortDir};
use slicer::widgets::{FrameWidget, Item, WidgetOutput};

use common::{sqlite_slicer, vertica_slicer};

fn frame_output(outputs: Vec<WidgetOutput>) -> DataFrame {
    match outputs.into_iter().next() {
        Some(WidgetOutput::Frame(frame)) => frame,
        other => panic!("expected a frame, got {:?}", other),
    }
}

#[test]
fn test_fetch_without_dimensions() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let wins = slicer.metric("wins").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(votes), Item::from(wins)]))
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.column_names(), ["Votes", "Wins"]);
    assert_eq!(frame.len(), 1);
    assert_eq!(frame.row(0), &[Value::Int(102), Value::Int(6)]);
}

#[test]
fn test_fetch_by_joined_dimension() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let state = slicer.dimension("state").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(votes)]))
            .dimension(state)
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.index_names(), ["State"]);
    assert_eq!(frame.index_at(0), &[Value::from("California")]);
    assert_eq!(frame.row(0), &[Value::Int(39)]);
    assert_eq!(frame.index_at(1), &[Value::from("Texas")]);
    assert_eq!(frame.row(1), &[Value::Int(63)]);
}

#[test]
fn test_fetch_with_metric_filter() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let state = slicer.dimension("state").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(votes)]))
            .dimension(state)
            .filter(votes.gt(lit_int(50)))
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.len(), 1);
    assert_eq!(frame.index_at(0), &[Value::from("Texas")]);
}

#[test]
fn test_fetch_by_boolean_dimension() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let winner = slicer.dimension("winner").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(votes)]))
            .dimension(winner)
            .fetch()
            .unwrap(),
    );

    assert_eq!(frame.len(), 2);
    assert_eq!(frame.row(0), &[Value::Int(42)]);
    assert_eq!(frame.row(1), &[Value::Int(60)]);
}

#[test]
fn test_explicit_order_is_kept() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(votes)]))
            .dimension(ts)
            .orderby(votes, SortDir::Desc)
            .fetch()
            .unwrap(),
    );

    let votes: Vec<Value> = (0..frame.len()).map(|r| frame.row(r)[0].clone()).collect();
    assert_eq!(votes, vec![Value::Int(37), Value::Int(35), Value::Int(30)]);
}

#[test]
fn test_multiple_widgets_share_one_query() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let wins = slicer.metric("wins").unwrap();

    let builder = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .widget(FrameWidget::new(vec![Item::from(wins)]));

    assert_eq!(builder.queries().unwrap().len(), 1);

    let outputs = builder.fetch().unwrap();
    assert_eq!(outputs.len(), 2);
    let WidgetOutput::Frame(second) = &outputs[1] else {
        panic!("expected a frame");
    };
    assert_eq!(second.column_names(), ["Wins"]);
}

#[test]
fn test_builder_branches_by_clone() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let base = slicer.data().widget(FrameWidget::new(vec![Item::from(votes)]));
    let by_day = base.clone().dimension(ts);

    assert_ne!(base.query().unwrap(), by_day.query().unwrap());
    assert_eq!(frame_output(base.fetch().unwrap()).len(), 1);
    assert_eq!(frame_output(by_day.fetch().unwrap()).len(), 3);
}

#[test]
fn test_filtered_range() {
    let slicer = sqlite_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let frame = frame_output(
        slicer
            .data()
            .widget(FrameWidget::new(vec![Item::from(votes)]))
            .dimension(ts)
            .filter(ts.between(lit_str("2016-01-02 00:00:00"), lit_str("2016-01-03 00:00:00")))
            .fetch()
            .unwrap(),
    );
    assert_eq!(frame.len(), 2);
}

#[test]
fn test_adapter_errors_propagate() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();

    let err = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .fetch()
        .unwrap_err();
    assert!(matches!(err, SlicerError::Adapter(AdapterError::Connector(_))));
}
