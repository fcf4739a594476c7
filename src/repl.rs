use std::io::{self, Write};

pub struct REPL {}

impl REPL {
    /// Read one command line from stdin, trimmed. End of input is an error:
    /// the loop has nothing left to drive it.
    pub fn read_line(&self) -> Result<String, io::Error> {
        let mut buffer = String::new();
        let stdin = std::io::stdin();
        let bytes_read = stdin.read_line(&mut buffer)?;
        if bytes_read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        let buffer = buffer.trim().to_string();
        Ok(buffer)
    }
}

pub fn print_prompt() {
    print!("db > ");
    io::stdout().flush().unwrap();
}
