#[path = "../common/mod.rs"]
mod common;

use insta::assert_snapshot;

use slicer::error::{SlicerError, ValidationError};
use slicer::schema::DatetimeInterval;
use slicer::sql::{lit_int, lit_str, SortDir};
use slicer::widgets::{Axis, FrameWidget, HighCharts, Item, Series};

use common::vertica_slicer;

#[test]
fn test_metric_without_dimensions() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .query()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT\n  SUM(\"votes\") AS \"$m$votes\"\nFROM \"politics\".\"politician\""
    );
}

#[test]
fn test_metrics_are_selected_once() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let wins = slicer.metric("wins").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes), Item::from(wins)]))
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .query()
        .unwrap();

    assert_eq!(sql.matches("AS \"$m$votes\"").count(), 1);
    assert!(sql.contains("SUM(\"is_winner\") AS \"$m$wins\""));
}

#[test]
fn test_datetime_dimension_is_truncated() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .query()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT\n  TRUNC(\"timestamp\",'DD') AS \"$d$timestamp\",\n  SUM(\"votes\") AS \"$m$votes\"\nFROM \"politics\".\"politician\"\nGROUP BY \"$d$timestamp\"\nORDER BY \"$d$timestamp\""
    );
}

#[test]
fn test_weekly_interval() {
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
        .query()
        .unwrap();

    assert_snapshot!(sql, @r#"
    SELECT
      TRUNC("timestamp",'IW') AS "$d$timestamp",
      SUM("votes") AS "$m$votes"
    FROM "politics"."politician"
    GROUP BY "$d$timestamp"
    ORDER BY "$d$timestamp"
    "#);
}

#[test]
fn test_unique_dimension_selects_display() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let candidate = slicer.dimension("candidate").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(candidate)
        .query()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT\n  \"candidate_id\" AS \"$d$candidate\",\n  \"candidate_name\" AS \"$d$candidate_display\",\n  SUM(\"votes\") AS \"$m$votes\"\nFROM \"politics\".\"politician\"\nGROUP BY \"$d$candidate\",\"$d$candidate_display\"\nORDER BY \"$d$candidate_display\""
    );
}

#[test]
fn test_joined_dimension_qualifies_columns() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let district = slicer.dimension("district").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(district)
        .query()
        .unwrap();

    assert!(sql.contains("\"politician\".\"district_id\" AS \"$d$district\""));
    assert!(sql.contains("\"district\".\"district_name\" AS \"$d$district_display\""));
    assert!(sql.contains("SUM(\"politician\".\"votes\") AS \"$m$votes\""));
    assert!(sql.contains(
        "INNER JOIN \"politics\".\"district\" ON \"politician\".\"district_id\" = \"district\".\"id\""
    ));
    assert!(!sql.contains("\"state\""));
}

#[test]
fn test_dimension_filter() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .filter(party.isin(vec!["d", "r"]))
        .query()
        .unwrap();

    assert!(sql.contains("WHERE \"political_party\" IN ('d','r')"));
}

#[test]
fn test_filters_are_anded() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();
    let winner = slicer.dimension("winner").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .filter(party.notin(vec!["i"]))
        .filter(winner.is_(true))
        .query()
        .unwrap();

    assert!(sql.contains("WHERE \"political_party\" NOT IN ('i') AND \"is_winner\" = "));
}

#[test]
fn test_range_filter() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(ts)
        .filter(ts.between(lit_str("2016-01-01"), lit_str("2016-01-03")))
        .query()
        .unwrap();

    assert!(sql.contains("WHERE \"timestamp\" BETWEEN '2016-01-01' AND '2016-01-03'"));
}

#[test]
fn test_pattern_filter_uses_display() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let candidate = slicer.dimension("candidate").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .filter(candidate.like(&["%Clinton"]).unwrap())
        .query()
        .unwrap();

    assert!(sql.contains("WHERE LOWER(\"candidate_name\") LIKE '%clinton'"));
}

#[test]
fn test_metric_filter_goes_to_having() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(party)
        .filter(votes.gt(lit_int(10)))
        .query()
        .unwrap();

    assert!(sql.contains("HAVING SUM(\"votes\") > 10"));
    assert!(!sql.contains("WHERE"));
}

#[test]
fn test_explicit_orderby_replaces_default() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(party)
        .orderby(votes, SortDir::Desc)
        .query()
        .unwrap();

    assert!(sql.ends_with("ORDER BY \"$m$votes\" DESC"));
}

#[test]
fn test_pagination() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(party)
        .limit(10)
        .offset(5)
        .query()
        .unwrap();

    assert!(sql.contains("LIMIT 10"));
    assert!(sql.contains("OFFSET 5"));
}

#[test]
fn test_widget_validation_runs_before_sql() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let ts = slicer.dimension("timestamp").unwrap();

    let err = slicer
        .data()
        .widget(HighCharts::new().axis(Axis::new().series(Series::line(votes))))
        .dimension(&ts.rollup())
        .query()
        .unwrap_err();
    assert!(matches!(
        err,
        SlicerError::Validation(ValidationError::ContinuousDimensionCannotBeRolledUp { .. })
    ));

    let err = slicer
        .data()
        .widget(HighCharts::new().axis(Axis::new()))
        .query()
        .unwrap_err();
    assert_eq!(err.to_string(), "HighCharts requires at least one metric");
}

#[test]
fn test_generated_sql_parses() {
    use sqlparser::dialect::GenericDialect;
    use sqlparser::parser::Parser;

    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let state = slicer.dimension("state").unwrap();
    let party = slicer.dimension("political_party").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(state)
        .dimension(&party.rollup())
        .query()
        .unwrap();

    Parser::parse_sql(&GenericDialect {}, &sql).unwrap();
}
