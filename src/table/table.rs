use minidb_page::pager::{Pager, PagerError};

use super::btree::{self, node, Slot};
use super::{Cursor, ExecuteError, Row, ROW_SIZE};

/// One open database: a pager over one file plus the root page number.
/// The root always lives at page 0.
pub struct Table {
    pub(crate) pager: Pager,
    pub(crate) root_page_num: usize,
}

impl Table {
    pub fn open(filename: &str) -> Result<Self, PagerError> {
        Self::with_pager(Pager::open(filename)?)
    }

    pub fn open_with_max_pages(filename: &str, max_pages: usize) -> Result<Self, PagerError> {
        Self::with_pager(Pager::open_with_max_pages(filename, max_pages)?)
    }

    fn with_pager(mut pager: Pager) -> Result<Self, PagerError> {
        if pager.num_pages() == 0 {
            // New database file. Page 0 becomes an empty root leaf, in
            // memory only until the first flush.
            let page = pager.get_page_mut(0)?;
            node::initialize_leaf_node(page);
            node::set_is_root(page, true);
        }
        Ok(Self {
            pager,
            root_page_num: 0,
        })
    }

    /// Insert a row keyed by its id. Rejects an id that is already present
    /// without touching the tree.
    pub fn insert(&mut self, row: &Row) -> Result<(), ExecuteError> {
        let (page_num, slot) = btree::find(&mut self.pager, self.root_page_num, row.id)?;
        let cell_num = match slot {
            Slot::Cell(_) => return Err(ExecuteError::DuplicateKey),
            Slot::Hole(cell_num) => cell_num,
        };
        let mut value = [0; ROW_SIZE];
        row.serialize(&mut value);
        btree::leaf_insert(&mut self.pager, page_num, cell_num, row.id, &value)
    }

    /// Cursor over all rows in key order.
    pub fn cursor(&mut self) -> Result<Cursor<'_>, PagerError> {
        Cursor::table_start(self)
    }

    /// Flush every cached page and release the file. Consumes the table so
    /// nothing can touch unflushed state afterwards.
    pub fn close(mut self) -> Result<(), PagerError> {
        self.pager.flush_all()
    }
}
