use crate::table::{Row, COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE};

#[derive(Debug, PartialEq)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, PartialEq)]
pub enum PrepareError {
    SyntaxError,
    StringTooLong,
    UnrecognizedStatement,
}

/// Parse one command line into a statement. Dispatch goes by the leading
/// keyword; `insert` then wants an id and the two columns.
pub fn prepare_statement(input: &str) -> Result<Statement, PrepareError> {
    if input.starts_with("insert") {
        prepare_insert(input)
    } else if input.starts_with("select") {
        Ok(Statement::Select)
    } else {
        Err(PrepareError::UnrecognizedStatement)
    }
}

fn prepare_insert(input: &str) -> Result<Statement, PrepareError> {
    let mut tokens = input.split_whitespace();
    tokens.next(); // keyword
    let id = tokens.next().ok_or(PrepareError::SyntaxError)?;
    let username = tokens.next().ok_or(PrepareError::SyntaxError)?;
    let email = tokens.next().ok_or(PrepareError::SyntaxError)?;

    let id: u32 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
    if username.len() > COLUMN_USERNAME_SIZE {
        return Err(PrepareError::StringTooLong);
    }
    if email.len() > COLUMN_EMAIL_SIZE {
        return Err(PrepareError::StringTooLong);
    }
    Ok(Statement::Insert(Row::new(id, username, email)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_statement() {
        let statement = prepare_statement("insert 1 alice a@x.com").unwrap();
        assert_eq!(
            statement,
            Statement::Insert(Row::new(1, "alice", "a@x.com"))
        );
    }

    #[test]
    fn select_statement() {
        assert_eq!(prepare_statement("select"), Ok(Statement::Select));
    }

    #[test]
    fn insert_missing_fields() {
        assert_eq!(
            prepare_statement("insert 1 alice"),
            Err(PrepareError::SyntaxError)
        );
    }

    #[test]
    fn insert_non_numeric_id() {
        assert_eq!(
            prepare_statement("insert abc alice a@x.com"),
            Err(PrepareError::SyntaxError)
        );
    }

    #[test]
    fn insert_negative_id() {
        assert_eq!(
            prepare_statement("insert -1 alice a@x.com"),
            Err(PrepareError::SyntaxError)
        );
    }

    #[test]
    fn username_too_long() {
        let username = "u".repeat(COLUMN_USERNAME_SIZE + 1);
        assert_eq!(
            prepare_statement(&format!("insert 1 {} a@x.com", username)),
            Err(PrepareError::StringTooLong)
        );
    }

    #[test]
    fn email_too_long() {
        let email = "e".repeat(COLUMN_EMAIL_SIZE + 1);
        assert_eq!(
            prepare_statement(&format!("insert 1 alice {}", email)),
            Err(PrepareError::StringTooLong)
        );
    }

    #[test]
    fn email_at_limit() {
        let email = "e".repeat(COLUMN_EMAIL_SIZE);
        assert!(prepare_statement(&format!("insert 1 alice {}", email)).is_ok());
    }

    #[test]
    fn unrecognized_keyword() {
        assert_eq!(
            prepare_statement("delete 1"),
            Err(PrepareError::UnrecognizedStatement)
        );
    }
}
