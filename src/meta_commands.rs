/// Meta commands are the `.`-prefixed inputs handled outside the statement
/// pipeline.
#[derive(Debug, PartialEq)]
pub enum MetaCommand {
    Exit,
}

#[derive(Debug, PartialEq)]
pub enum MetaCommandError {
    UnrecognizedCommand,
}

/// Dispatch a meta command. `.exit` is reported back rather than handled
/// here so teardown stays in one place.
pub fn handle_meta_command(input: &str) -> Result<MetaCommand, MetaCommandError> {
    if input == ".exit" {
        Ok(MetaCommand::Exit)
    } else {
        Err(MetaCommandError::UnrecognizedCommand)
    }
}
