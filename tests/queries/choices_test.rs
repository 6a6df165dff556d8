#[path = "../common/mod.rs"]
mod common;

use slicer::frame::Value;
use slicer::sql::lit_int;

use common::{sqlite_slicer, vertica_slicer};

#[test]
fn test_categorical_choices_query() {
    let slicer = vertica_slicer();
    let party = slicer.dimension("political_party").unwrap();

    assert_eq!(
        slicer.choices(party).query().unwrap(),
        "SELECT\n  \"political_party\" AS \"$d$political_party\"\nFROM \"politics\".\"politician\"\nGROUP BY \"$d$political_party\"\nORDER BY \"$d$political_party\""
    );
}

#[test]
fn test_choices_with_filter_and_join() {
    let slicer = vertica_slicer();
    let candidate = slicer.dimension("candidate").unwrap();
    let state = slicer.dimension("state").unwrap();

    let sql = slicer
        .choices(candidate)
        .filter(state.isin(vec![lit_int(1)]))
        .query()
        .unwrap();

    assert!(sql.contains("INNER JOIN \"politics\".\"district\""));
    assert!(sql.contains("WHERE \"district\".\"state_id\" IN (1)"));
    assert!(sql.contains("ORDER BY \"$d$candidate_display\""));
}

#[test]
fn test_choices_queries_surface() {
    let slicer = vertica_slicer();
    let party = slicer.dimension("political_party").unwrap();

    let queries = slicer.choices(party).limit(2).offset(1).queries().unwrap();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].contains("LIMIT 2"));
    assert!(queries[0].contains("OFFSET 1"));
}

#[test]
fn test_categorical_choices_use_mapping() {
    let slicer = sqlite_slicer();
    let party = slicer.dimension("political_party").unwrap();

    let choices = slicer.choices(party).fetch().unwrap();
    assert_eq!(
        choices,
        vec![
            (Value::from("d"), "Democrat".to_string()),
            (Value::from("r"), "Republican".to_string()),
        ]
    );
}

#[test]
fn test_unique_choices_use_display_column() {
    let slicer = sqlite_slicer();
    let candidate = slicer.dimension("candidate").unwrap();

    let choices = slicer.choices(candidate).fetch().unwrap();
    assert_eq!(
        choices,
        vec![
            (Value::Int(2), "Donald Trump".to_string()),
            (Value::Int(1), "Hillary Clinton".to_string()),
        ]
    );
}

#[test]
fn test_force_include_lists_values_first() {
    let slicer = sqlite_slicer();
    let candidate = slicer.dimension("candidate").unwrap();

    let choices = slicer
        .choices(candidate)
        .force_include(vec![lit_int(1)])
        .fetch()
        .unwrap();
    assert_eq!(choices[0].1, "Hillary Clinton");
}

#[test]
fn test_latest_values() {
    let slicer = sqlite_slicer();
    let ts = slicer.dimension("timestamp").unwrap();

    let latest = slicer.latest(std::slice::from_ref(ts)).fetch().unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].0, "timestamp");
    assert_eq!(latest[0].1.to_string(), "2016-01-03 00:00:00");
}
