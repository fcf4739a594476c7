use std::{env, process};

use log::error;

use minidb::meta_commands::{handle_meta_command, MetaCommand, MetaCommandError};
use minidb::repl::{print_prompt, REPL};
use minidb::statements::{prepare_statement, PrepareError};
use minidb::table::{ExecuteError, Table};
use minidb::vm::execute_statement;
use minidb_page::pager::PagerError;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Must supply a database filename.");
        process::exit(1);
    }

    let mut table = match Table::open(&args[1]) {
        Ok(table) => table,
        Err(err) => {
            error!("cannot open {}: {:?}", args[1], err);
            println!("Unable to open file.");
            process::exit(1);
        }
    };

    // All fatal storage errors funnel here so the table is flushed and
    // closed exactly once before the process gives up.
    match repl_loop(&mut table) {
        Ok(()) => {
            if let Err(err) = table.close() {
                error!("error closing db file: {:?}", err);
                process::exit(1);
            }
        }
        Err(err) => {
            error!("fatal storage error: {:?}", err);
            let _ = table.close();
            process::exit(1);
        }
    }
}

fn repl_loop(table: &mut Table) -> Result<(), PagerError> {
    let repl = REPL {};
    loop {
        print_prompt();
        let input = repl.read_line()?;

        if input.starts_with('.') {
            match handle_meta_command(&input) {
                Ok(MetaCommand::Exit) => return Ok(()),
                Err(MetaCommandError::UnrecognizedCommand) => {
                    println!("Unrecognized command '{}'", input);
                }
            }
            continue;
        }

        let statement = match prepare_statement(&input) {
            Ok(statement) => statement,
            Err(PrepareError::StringTooLong) => {
                println!("String is too long.");
                continue;
            }
            Err(PrepareError::SyntaxError) => {
                println!("Syntax error. Could not parse statement.");
                continue;
            }
            Err(PrepareError::UnrecognizedStatement) => {
                println!("Unrecognized keyword at start of '{}'.", input);
                continue;
            }
        };

        match execute_statement(&statement, table) {
            Ok(()) => println!("Executed."),
            Err(ExecuteError::DuplicateKey) => println!("Error: Duplicate key."),
            Err(ExecuteError::TableFull) => println!("Error: Table full."),
            Err(ExecuteError::Pager(err)) => return Err(err),
        }
    }
}
