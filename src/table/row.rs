use std::fmt;

use super::{
    COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, EMAIL_OFFSET, ID_OFFSET, ROW_SIZE, USERNAME_OFFSET,
};

/// One table row: a `u32` id keyed by the tree plus two bounded text
/// columns. On disk the row is a fixed 291-byte block: id (little-endian)
/// at offset 0, username at 4, email at 36, each column zero-padded to its
/// column width.
#[derive(Debug, PartialEq, Clone)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    /// Both columns must already fit their widths; the statement layer
    /// rejects longer strings before a `Row` is built.
    pub fn new(id: u32, username: &str, email: &str) -> Self {
        assert!(username.len() <= COLUMN_USERNAME_SIZE);
        assert!(email.len() <= COLUMN_EMAIL_SIZE);
        Self {
            id,
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    pub fn serialize(&self, buf: &mut [u8; ROW_SIZE]) {
        buf.fill(0);
        buf[ID_OFFSET..ID_OFFSET + 4].copy_from_slice(&self.id.to_le_bytes());
        buf[USERNAME_OFFSET..USERNAME_OFFSET + self.username.len()]
            .copy_from_slice(self.username.as_bytes());
        buf[EMAIL_OFFSET..EMAIL_OFFSET + self.email.len()].copy_from_slice(self.email.as_bytes());
    }

    pub fn deserialize(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), ROW_SIZE);
        let mut id_bytes = [0; 4];
        id_bytes.copy_from_slice(&buf[ID_OFFSET..ID_OFFSET + 4]);
        Self {
            id: u32::from_le_bytes(id_bytes),
            username: read_column(&buf[USERNAME_OFFSET..USERNAME_OFFSET + COLUMN_USERNAME_SIZE]),
            email: read_column(&buf[EMAIL_OFFSET..EMAIL_OFFSET + COLUMN_EMAIL_SIZE]),
        }
    }
}

/// The padding convention leaves the tail of a column zeroed; the text is
/// everything before the first NUL.
fn read_column(buf: &[u8]) -> String {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

#[cfg(test)]
mod row {
    use super::{Row, COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, ROW_SIZE};

    #[test]
    fn round_trip() {
        let row = Row::new(1, "alice", "a@x.com");
        let mut buf = [0; ROW_SIZE];
        row.serialize(&mut buf);
        assert_eq!(Row::deserialize(&buf), row);
    }

    #[test]
    fn round_trip_max_width_columns() {
        let username = "u".repeat(COLUMN_USERNAME_SIZE);
        let email = "e".repeat(COLUMN_EMAIL_SIZE);
        let row = Row::new(u32::MAX, &username, &email);
        let mut buf = [0; ROW_SIZE];
        row.serialize(&mut buf);
        assert_eq!(Row::deserialize(&buf), row);
    }

    #[test]
    fn round_trip_empty_columns() {
        let row = Row::new(0, "", "");
        let mut buf = [0; ROW_SIZE];
        row.serialize(&mut buf);
        assert_eq!(Row::deserialize(&buf), row);
    }

    #[test]
    fn serialize_pads_with_zeroes() {
        let row = Row::new(7, "bob", "b@x.com");
        let mut buf = [0xff; ROW_SIZE];
        row.serialize(&mut buf);
        assert_eq!(buf[4 + 3], 0);
        assert_eq!(buf[ROW_SIZE - 1], 0);
    }

    #[test]
    fn display_format() {
        let row = Row::new(1, "alice", "a@x.com");
        assert_eq!(format!("{}", row), "(1, alice, a@x.com)");
    }

    #[test]
    #[should_panic]
    fn username_over_limit() {
        Row::new(1, &"u".repeat(COLUMN_USERNAME_SIZE + 1), "a@x.com");
    }
}
