pub mod btree;
mod cursor;
mod row;
mod table;

pub use cursor::Cursor;
pub use row::Row;
pub use table::Table;

use minidb_page::pager::PagerError;

pub const COLUMN_USERNAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 255;

const ID_SIZE: usize = std::mem::size_of::<u32>();
const ID_OFFSET: usize = 0;
const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
const EMAIL_OFFSET: usize = USERNAME_OFFSET + COLUMN_USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + COLUMN_USERNAME_SIZE + COLUMN_EMAIL_SIZE;

/// Outcome of a statement that touched the tree. `DuplicateKey` and
/// `TableFull` are recoverable and reported to the command loop;
/// `Pager` wraps a fatal storage error.
#[derive(Debug)]
pub enum ExecuteError {
    DuplicateKey,
    TableFull,
    Pager(PagerError),
}

impl From<PagerError> for ExecuteError {
    fn from(err: PagerError) -> Self {
        Self::Pager(err)
    }
}
