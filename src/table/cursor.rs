use minidb_page::pager::PagerError;

use super::btree::{self, node};
use super::{Row, Table};

/// A transient position inside the tree: the page of a leaf plus a cell
/// index into it. Forward-only and single-use; re-scanning takes a new
/// cursor.
pub struct Cursor<'a> {
    table: &'a mut Table,
    page_num: usize,
    cell_num: u32,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    /// Position at the first cell of the leftmost leaf.
    pub fn table_start(table: &'a mut Table) -> Result<Self, PagerError> {
        let root = table.root_page_num;
        let page_num = btree::leftmost_leaf(&mut table.pager, root)?;
        let num_cells = node::leaf_num_cells(table.pager.get_page(page_num)?);
        Ok(Cursor {
            table,
            page_num,
            cell_num: 0,
            end_of_table: num_cells == 0,
        })
    }

    pub fn end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// Step to the next cell, crossing into the next leaf when the current
    /// one is exhausted.
    pub fn advance(&mut self) -> Result<(), PagerError> {
        if self.end_of_table {
            panic!("End of table");
        }
        self.cell_num += 1;
        let num_cells = node::leaf_num_cells(self.table.pager.get_page(self.page_num)?);
        if self.cell_num >= num_cells {
            match btree::next_leaf(&mut self.table.pager, self.page_num)? {
                Some(next) => {
                    self.page_num = next;
                    self.cell_num = 0;
                }
                None => self.end_of_table = true,
            }
        }
        Ok(())
    }

    pub fn key(&mut self) -> Result<u32, PagerError> {
        let page = self.table.pager.get_page(self.page_num)?;
        Ok(node::leaf_key(page, self.cell_num))
    }

    /// The record bytes under the cursor, viewed in place.
    pub fn value(&mut self) -> Result<&[u8], PagerError> {
        let page = self.table.pager.get_page(self.page_num)?;
        Ok(node::leaf_value(page, self.cell_num))
    }

    pub fn row(&mut self) -> Result<Row, PagerError> {
        Ok(Row::deserialize(self.value()?))
    }
}
