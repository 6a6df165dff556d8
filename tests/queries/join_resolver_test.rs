#[path = "../common/mod.rs"]
mod common;

use slicer::error::{JoinResolutionError, SlicerError};
use slicer::queries::joins::{find_joins_for_tables, find_required_tables_to_join, resolve_joins};
use slicer::schema::Join;
use slicer::sql::{sum, ExprExt, TableRef};
use slicer::widgets::{FrameWidget, Item};

use common::{tables, vertica_slicer, SCHEMA};

#[test]
fn test_required_tables_exclude_base() {
    let t = tables(Some(SCHEMA));
    let terms = [
        sum(t.politician.col("votes")),
        t.district.col("district_name"),
        t.state.col("state_name"),
    ];

    let required = find_required_tables_to_join(terms.iter(), &t.politician);
    assert_eq!(
        required.into_iter().collect::<Vec<_>>(),
        vec![t.district, t.state]
    );
}

#[test]
fn test_intermediate_tables_are_pulled_in() {
    let slicer = vertica_slicer();
    let t = tables(Some(SCHEMA));

    let joins = resolve_joins(&slicer.joins, &t.politician, [t.state.col("state_name")].iter()).unwrap();
    let joined: Vec<&TableRef> = joins.iter().map(|j| &j.table).collect();
    assert_eq!(joined, vec![&t.district, &t.state]);
}

#[test]
fn test_order_follows_dependencies_not_declaration() {
    let t = tables(Some(SCHEMA));
    // Declared out of order: state depends on district.
    let joins = vec![
        Join::new(t.state.clone(), t.district.col("state_id").eq(t.state.col("id"))),
        Join::new(t.district.clone(), t.politician.col("district_id").eq(t.district.col("id"))),
    ];

    let ordered = find_joins_for_tables(
        &joins,
        &t.politician,
        [t.state.clone()].into_iter().collect(),
    )
    .unwrap();
    assert_eq!(ordered[0].table, t.district);
    assert_eq!(ordered[1].table, t.state);
}

#[test]
fn test_unused_joins_are_left_out() {
    let slicer = vertica_slicer();
    let t = tables(Some(SCHEMA));

    let joins = resolve_joins(&slicer.joins, &t.politician, [t.politician.col("votes")].iter()).unwrap();
    assert!(joins.is_empty());
}

#[test]
fn test_missing_join_is_reported() {
    let t = tables(Some(SCHEMA));
    let county = TableRef::new("county").with_schema(SCHEMA);

    let err = resolve_joins(&[], &t.politician, [county.col("name")].iter()).unwrap_err();
    assert!(matches!(
        err,
        SlicerError::JoinResolution(JoinResolutionError::MissingTableJoin { ref table }) if table == "politics.county"
    ));
}

#[test]
fn test_slicer_rejects_definition_on_unjoined_table() {
    let t = tables(Some(SCHEMA));
    let county = TableRef::new("county").with_schema(SCHEMA);

    let err = slicer::Slicer::builder(
        std::sync::Arc::new(slicer::database::VerticaDatabase::new()),
        t.politician.clone(),
    )
    .dimension(slicer::schema::Dimension::unique("county", county.col("id")))
    .build()
    .unwrap_err();
    assert_eq!(err.to_string(), "could not find a join for table `politics.county`");
}

#[test]
fn test_data_query_joins_in_dependency_order() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let state = slicer.dimension("state").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .dimension(state)
        .query()
        .unwrap();

    let district_join = sql.find("JOIN \"politics\".\"district\"").unwrap();
    let state_join = sql.find("JOIN \"politics\".\"state\"").unwrap();
    assert!(district_join < state_join);
}

#[test]
fn test_filter_terms_require_joins() {
    let slicer = vertica_slicer();
    let votes = slicer.metric("votes").unwrap();
    let district = slicer.dimension("district").unwrap();

    let sql = slicer
        .data()
        .widget(FrameWidget::new(vec![Item::from(votes)]))
        .filter(district.like(&["houston"]).unwrap())
        .query()
        .unwrap();

    assert!(sql.contains("JOIN \"politics\".\"district\""));
    assert!(sql.contains("LOWER(\"district\".\"district_name\") LIKE 'houston'"));
}
