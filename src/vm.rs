use crate::statements::Statement;
use crate::table::{ExecuteError, Table};

/// Execute one prepared statement against the open table.
pub fn execute_statement(statement: &Statement, table: &mut Table) -> Result<(), ExecuteError> {
    match statement {
        Statement::Insert(row) => table.insert(row),
        Statement::Select => execute_select(table),
    }
}

/// Stream every row in key order to stdout.
fn execute_select(table: &mut Table) -> Result<(), ExecuteError> {
    let mut cursor = table.cursor()?;
    while !cursor.end_of_table() {
        println!("{}", cursor.row()?);
        cursor.advance()?;
    }
    Ok(())
}
