//! The politics fixture shared by the integration tests.
//!
//! `politician` is the fact table: one row per candidate, district and
//! election day. `district` and `state` are reached through joins.

#![allow(dead_code)]

use std::sync::Arc;

use slicer::database::{Database, SqliteDatabase, VerticaDatabase};
use slicer::schema::{Dimension, Join, Metric, Slicer};
use slicer::sql::{sum, ExprExt, TableRef};

pub const SCHEMA: &str = "politics";

pub struct Tables {
    pub politician: TableRef,
    pub district: TableRef,
    pub state: TableRef,
}

pub fn tables(schema: Option<&str>) -> Tables {
    let table = |name: &str| match schema {
        Some(schema) => TableRef::new(name).with_schema(schema),
        None => TableRef::new(name),
    };
    Tables {
        politician: table("politician"),
        district: table("district"),
        state: table("state"),
    }
}

/// The politics slicer over `database`.
pub fn politics_slicer(database: Arc<dyn Database>, schema: Option<&str>) -> Slicer {
    let Tables {
        politician,
        district,
        state,
    } = tables(schema);

    Slicer::builder(database, politician.clone())
        .join(Join::new(
            district.clone(),
            politician.col("district_id").eq(district.col("id")),
        ))
        .join(Join::new(
            state.clone(),
            district.col("state_id").eq(state.col("id")),
        ))
        .dimension(Dimension::datetime("timestamp", politician.col("timestamp")).with_label("Timestamp"))
        .dimension(
            Dimension::categorical(
                "political_party",
                politician.col("political_party"),
                &[("d", "Democrat"), ("r", "Republican"), ("i", "Independent")],
            )
            .with_label("Party"),
        )
        .dimension(
            Dimension::unique("candidate", politician.col("candidate_id"))
                .with_display(politician.col("candidate_name"))
                .with_label("Candidate"),
        )
        .dimension(
            Dimension::unique("district", politician.col("district_id"))
                .with_display(district.col("district_name"))
                .with_label("District"),
        )
        .dimension(
            Dimension::unique("state", district.col("state_id"))
                .with_display(state.col("state_name"))
                .with_label("State"),
        )
        .dimension(Dimension::boolean("winner", politician.col("is_winner")).with_label("Winner"))
        .dimension(Dimension::continuous("votes_bucket", politician.col("votes")).with_label("Votes Bucket"))
        .metric(Metric::new("votes", sum(politician.col("votes"))).with_label("Votes"))
        .metric(Metric::new("wins", sum(politician.col("is_winner"))).with_label("Wins"))
        .build()
        .expect("politics slicer")
}

/// The politics slicer on Vertica, for SQL assertions.
pub fn vertica_slicer() -> Slicer {
    politics_slicer(Arc::new(VerticaDatabase::new()), Some(SCHEMA))
}

const FIXTURE: &str = "
CREATE TABLE state (id INTEGER PRIMARY KEY, state_name TEXT);
CREATE TABLE district (id INTEGER PRIMARY KEY, district_name TEXT, state_id INTEGER);
CREATE TABLE politician (
    timestamp TEXT,
    political_party TEXT,
    candidate_id INTEGER,
    candidate_name TEXT,
    votes INTEGER,
    is_winner INTEGER,
    district_id INTEGER
);

INSERT INTO state VALUES (1, 'Texas'), (2, 'California');
INSERT INTO district VALUES (1, 'Houston', 1), (2, 'Los Angeles', 2);

INSERT INTO politician VALUES
    ('2016-01-01 00:00:00', 'd', 1, 'Hillary Clinton', 10, 1, 1),
    ('2016-01-01 00:00:00', 'r', 2, 'Donald Trump', 8, 0, 1),
    ('2016-01-01 00:00:00', 'd', 1, 'Hillary Clinton', 5, 0, 2),
    ('2016-01-01 00:00:00', 'r', 2, 'Donald Trump', 7, 1, 2),
    ('2016-01-02 00:00:00', 'd', 1, 'Hillary Clinton', 12, 1, 1),
    ('2016-01-02 00:00:00', 'r', 2, 'Donald Trump', 9, 0, 1),
    ('2016-01-02 00:00:00', 'd', 1, 'Hillary Clinton', 6, 0, 2),
    ('2016-01-02 00:00:00', 'r', 2, 'Donald Trump', 8, 1, 2),
    ('2016-01-03 00:00:00', 'd', 1, 'Hillary Clinton', 14, 1, 1),
    ('2016-01-03 00:00:00', 'r', 2, 'Donald Trump', 10, 0, 1),
    ('2016-01-03 00:00:00', 'd', 1, 'Hillary Clinton', 4, 0, 2),
    ('2016-01-03 00:00:00', 'r', 2, 'Donald Trump', 9, 1, 2);
";

/// The politics slicer on an in-memory SQLite database loaded with the
/// fixture rows.
///
/// Votes per day: 30, 35 and 37; Democrats 15, 18, 18.
pub fn sqlite_slicer() -> Slicer {
    let db = SqliteDatabase::open_in_memory().expect("in-memory database");
    db.execute_batch(FIXTURE).expect("fixture");
    politics_slicer(Arc::new(db), None)
}
