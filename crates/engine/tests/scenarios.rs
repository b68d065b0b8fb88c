//! End-to-end scenarios driven entirely through `Database`, exercising the
//! DDL/COPY FROM/HNSW surface the way a caller outside the crate would.

use csv::StringRecord;
use gq_binder::parse_tree::{
    ParsedAlter, ParsedAlterAction, ParsedCopyFrom, ParsedCreateNodeTable, ParsedCreateRelTable, ParsedPropertyDef, ParsedScanColumn, ParsedStatement,
};
use gq_common::{LogicalType, Multiplicity, Value};
use gq_engine::{Database, DdlOutcome, EngineError};
use std::collections::HashMap;
use tempfile::tempdir;

fn create_person_table() -> ParsedStatement {
    ParsedStatement::CreateNodeTable(ParsedCreateNodeTable {
        table_name: "Person".into(),
        properties: vec![
            ParsedPropertyDef {
                name: "id".into(),
                logical_type: LogicalType::Int64,
                default: None,
            },
            ParsedPropertyDef {
                name: "name".into(),
                logical_type: LogicalType::String,
                default: None,
            },
        ],
        primary_key_name: "id".into(),
    })
}

fn copy_person_from(rows: &[[&str; 2]]) -> (ParsedCopyFrom, Vec<StringRecord>) {
    let stmt = ParsedCopyFrom {
        table_name: "Person".into(),
        source_columns: vec![
            ParsedScanColumn {
                name: "id".into(),
                logical_type: LogicalType::Int64,
            },
            ParsedScanColumn {
                name: "name".into(),
                logical_type: LogicalType::String,
            },
        ],
        parsing_options: HashMap::new(),
        ..Default::default()
    };
    let rows = rows.iter().map(|r| StringRecord::from(r.to_vec())).collect();
    (stmt, rows)
}

// S1: a node COPY FROM with an INT64 primary key lands every row and
// builds a PK index callers can resolve endpoints against later.
#[test]
fn s1_node_copy_from_populates_rows_under_an_int64_primary_key() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path()).unwrap();

    let outcome = db.execute_ddl(&create_person_table()).unwrap();
    let table_id = match outcome {
        DdlOutcome::Table(id) => id,
        _ => panic!("expected a table id"),
    };

    let (stmt, rows) = copy_person_from(&[["1", "Alice"], ["2", "Bob"]]);
    let row_count = db.execute_copy_from(&stmt, &rows).unwrap();
    assert_eq!(row_count, 2);

    db.with_node_table(table_id, |t| {
        let t = t.unwrap();
        assert_eq!(t.row_count(), 2);
    });
}

// S2: a duplicate primary key in the same COPY FROM batch is rejected and
// leaves nothing committed.
#[test]
fn s2_duplicate_primary_key_is_rejected_and_nothing_commits() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path()).unwrap();
    let table_id = match db.execute_ddl(&create_person_table()).unwrap() {
        DdlOutcome::Table(id) => id,
        _ => panic!("expected a table id"),
    };

    let (stmt, rows) = copy_person_from(&[["1", "Alice"], ["1", "Bob"]]);
    let err = db.execute_copy_from(&stmt, &rows).unwrap_err();
    assert!(matches!(err, EngineError::Copy(gq_copy::CopyError::PkDuplicate(_))));

    db.with_node_table(table_id, |t| assert!(t.is_none(), "failed copy must not stage a table"));
}

// S3: a single-multiplicity relationship rejects a second edge out of the
// same source node.
#[test]
fn s3_single_multiplicity_violation_is_rejected() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path()).unwrap();
    db.execute_ddl(&create_person_table()).unwrap();
    let (person_copy, person_rows) = copy_person_from(&[["1", "Alice"], ["2", "Bob"], ["3", "Carol"]]);
    db.execute_copy_from(&person_copy, &person_rows).unwrap();

    db.execute_ddl(&ParsedStatement::CreateRelTable(ParsedCreateRelTable {
        table_name: "ReportsTo".into(),
        src_table_name: "Person".into(),
        dst_table_name: "Person".into(),
        src_multiplicity: Multiplicity::Many,
        dst_multiplicity: Multiplicity::One,
        properties: vec![],
    }))
    .unwrap();

    let stmt = ParsedCopyFrom {
        table_name: "ReportsTo".into(),
        source_columns: vec![
            ParsedScanColumn {
                name: "from".into(),
                logical_type: LogicalType::Int64,
            },
            ParsedScanColumn {
                name: "to".into(),
                logical_type: LogicalType::Int64,
            },
        ],
        parsing_options: HashMap::new(),
        ..Default::default()
    };
    let rows = vec![StringRecord::from(vec!["1", "2"]), StringRecord::from(vec!["1", "3"])];
    let err = db.execute_copy_from(&stmt, &rows).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Copy(gq_copy::CopyError::SingleMultiplicityViolation { .. })
    ));
}

// S5: an EXISTS subquery binds to a SUBQUERY expression and a COUNT(*) > 0
// projection sharing its unique name, so a later substitution pass can
// graft the subquery's materialized result straight into the projection.
#[test]
fn s5_exists_subquery_shares_its_unique_name_with_the_projection() {
    let (subquery, projection) = gq_binder::bind_subquery::bind_subquery(gq_expr::SubqueryKind::Exists, &["p".to_string()], None);
    assert_eq!(subquery.unique_name, projection.unique_name);
    assert_eq!(projection.logical_type, LogicalType::Bool);
    match &subquery.kind {
        gq_expr::ExpressionKind::Subquery(s) => {
            assert_eq!(s.subquery_kind, gq_expr::SubqueryKind::Exists);
            assert_eq!(s.query_node_internal_ids.len(), 1);
        }
        _ => panic!("expected a SUBQUERY expression"),
    }
}

// S6: renaming a table and reopening the database round-trips the new name
// through the WAL-backed catalog.
#[test]
fn s6_catalog_rename_survives_a_reopen() {
    let dir = tempdir().unwrap();
    {
        let db = Database::open(dir.path()).unwrap();
        db.execute_ddl(&create_person_table()).unwrap();
        db.execute_ddl(&ParsedStatement::Alter(ParsedAlter {
            table_name: "Person".into(),
            action: ParsedAlterAction::RenameTable { new_name: "Member".into() },
        }))
        .unwrap();
        db.with_catalog(|c| {
            assert!(!c.contains_table("Person"));
            assert!(c.contains_table("Member"));
        });
    }

    let reopened = Database::open(dir.path()).unwrap();
    reopened.with_catalog(|c| assert!(c.contains_table("Member")));
}

// An HNSW index created through the façade is queryable immediately and
// its auxiliary rel tables land in the same committed transaction.
#[test]
fn hnsw_index_created_through_the_database_is_immediately_queryable() {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path()).unwrap();
    db.execute_ddl(&ParsedStatement::CreateNodeTable(ParsedCreateNodeTable {
        table_name: "Doc".into(),
        properties: vec![
            ParsedPropertyDef {
                name: "id".into(),
                logical_type: LogicalType::Int64,
                default: None,
            },
            ParsedPropertyDef {
                name: "embedding".into(),
                logical_type: LogicalType::FixedList {
                    child: Box::new(LogicalType::Float),
                    num_elements: 2,
                },
                default: None,
            },
        ],
        primary_key_name: "id".into(),
    }))
    .unwrap();

    let vectors: Vec<(u32, Value)> = (0..6).map(|i| (i, Value::List(vec![Value::Float(i as f32), Value::Float(0.0)]))).collect();
    let result = db
        .create_hnsw_index("Doc", "embedding", "doc_idx", &vectors, gq_vector_index::HnswConfig::default())
        .unwrap();

    let hits = db.query_hnsw_index(&result.index, &Value::List(vec![Value::Float(0.0), Value::Float(0.0)]), 3, 10).unwrap();
    assert!(!hits.is_empty());

    db.with_rel_table(result.upper_rel_table_id, |t| assert!(t.is_some()));
    db.with_rel_table(result.lower_rel_table_id, |t| assert!(t.is_some()));
}
