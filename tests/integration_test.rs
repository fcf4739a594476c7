use std::fs::remove_file;

use rand::seq::SliceRandom;
use rand::thread_rng;

use minidb::statements::{prepare_statement, Statement};
use minidb::table::{ExecuteError, Row, Table};
use minidb::vm::execute_statement;

fn test_row(id: u32) -> Row {
    Row::new(id, &format!("user{}", id), &format!("user{}@example.com", id))
}

fn scan_keys(table: &mut Table) -> Vec<u32> {
    let mut keys = Vec::new();
    let mut cursor = table.cursor().unwrap();
    while !cursor.end_of_table() {
        keys.push(cursor.key().unwrap());
        cursor.advance().unwrap();
    }
    keys
}

#[test]
fn statement_pipeline_end_to_end() {
    let filename = "test_integration_pipeline.db";
    remove_file(filename).ok();

    let mut table = Table::open(filename).unwrap();
    for input in ["insert 1 alice a@x.com", "insert 2 bob b@x.com"] {
        let statement = prepare_statement(input).unwrap();
        execute_statement(&statement, &mut table).unwrap();
    }

    // Re-inserting key 1 through the pipeline reports a duplicate.
    let statement = prepare_statement("insert 1 carol c@x.com").unwrap();
    let err = execute_statement(&statement, &mut table).unwrap_err();
    assert!(matches!(err, ExecuteError::DuplicateKey));

    let statement = prepare_statement("select").unwrap();
    assert_eq!(statement, Statement::Select);
    execute_statement(&statement, &mut table).unwrap();

    let mut cursor = table.cursor().unwrap();
    assert_eq!(cursor.row().unwrap(), Row::new(1, "alice", "a@x.com"));
    cursor.advance().unwrap();
    assert_eq!(cursor.row().unwrap(), Row::new(2, "bob", "b@x.com"));
    cursor.advance().unwrap();
    assert!(cursor.end_of_table());

    table.close().unwrap();
    remove_file(filename).unwrap();
}

#[test]
fn shuffled_inserts_scan_sorted_after_reopen() {
    let filename = "test_integration_shuffled.db";
    remove_file(filename).ok();

    let mut ids: Vec<u32> = (1..=1000).collect();
    ids.shuffle(&mut thread_rng());

    let mut table = Table::open_with_max_pages(filename, 400).unwrap();
    for id in &ids {
        table.insert(&test_row(*id)).unwrap();
    }
    assert_eq!(scan_keys(&mut table), (1..=1000).collect::<Vec<u32>>());
    table.close().unwrap();

    let mut table = Table::open_with_max_pages(filename, 400).unwrap();
    assert_eq!(scan_keys(&mut table), (1..=1000).collect::<Vec<u32>>());
    table.close().unwrap();
    remove_file(filename).unwrap();
}

// Enough sequential inserts to overflow the root internal node, so the
// tree reaches three levels and the scan has to stitch leaves back
// together across two internal subtrees.
#[test]
fn three_level_tree_stays_sorted_and_persistent() {
    let filename = "test_integration_deep.db";
    remove_file(filename).ok();

    const COUNT: u32 = 4000;
    let mut table = Table::open_with_max_pages(filename, 1024).unwrap();
    for id in 1..=COUNT {
        table.insert(&test_row(id)).unwrap();
    }
    assert_eq!(scan_keys(&mut table), (1..=COUNT).collect::<Vec<u32>>());

    // Point reads still route correctly through two internal levels.
    let err = table.insert(&test_row(1)).unwrap_err();
    assert!(matches!(err, ExecuteError::DuplicateKey));
    let err = table.insert(&test_row(COUNT)).unwrap_err();
    assert!(matches!(err, ExecuteError::DuplicateKey));

    table.close().unwrap();

    let mut table = Table::open_with_max_pages(filename, 1024).unwrap();
    assert_eq!(scan_keys(&mut table), (1..=COUNT).collect::<Vec<u32>>());
    let mut cursor = table.cursor().unwrap();
    assert_eq!(cursor.row().unwrap(), test_row(1));
    table.close().unwrap();
    remove_file(filename).unwrap();
}
