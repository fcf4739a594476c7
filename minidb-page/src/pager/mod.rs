#[cfg(test)]
mod tests;

use std::{
    collections::HashMap,
    fs::File,
    io::{self, Read, Seek, SeekFrom, Write},
};

use log::debug;

use crate::page::{Page, PAGE_SIZE};

/// Default ceiling on the number of pages a table may occupy.
pub const TABLE_MAX_PAGES: usize = 100;

#[derive(Debug)]
pub enum PagerError {
    Io(io::Error),
    /// Requested page number is past the pager's configured ceiling.
    OutOfBounds {
        page_num: usize,
        max_pages: usize,
    },
    /// File length is not a whole number of pages.
    CorruptFile {
        file_length: u64,
    },
    /// Flush of a page that is not resident in the cache.
    PageNotCached(usize),
}

impl From<io::Error> for PagerError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Owns the database file and an in-memory page cache keyed by page number.
///
/// Pages are read and written whole; there is no partial-page I/O. The cache
/// never evicts: a page stays resident (and possibly dirty) until it is
/// flushed and the pager is dropped.
#[derive(Debug)]
pub struct Pager {
    file: File,
    file_length: u64,
    /// High-water mark of allocated pages, cached or on disk.
    num_pages: usize,
    max_pages: usize,
    pages: HashMap<usize, Page>,
}

impl Pager {
    pub fn open(filename: &str) -> Result<Self, PagerError> {
        Self::open_with_max_pages(filename, TABLE_MAX_PAGES)
    }

    pub fn open_with_max_pages(filename: &str, max_pages: usize) -> Result<Self, PagerError> {
        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .open(filename)?;
        let file_length = file.seek(SeekFrom::End(0))?;
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(PagerError::CorruptFile { file_length });
        }
        Ok(Self {
            file,
            file_length,
            num_pages: (file_length / PAGE_SIZE as u64) as usize,
            max_pages,
            pages: HashMap::new(),
        })
    }

    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Until pages are recycled, new pages always go onto the end of the
    /// database file.
    pub fn get_unused_page_num(&self) -> usize {
        self.num_pages
    }

    pub fn get_page(&mut self, page_num: usize) -> Result<&Page, PagerError> {
        self.ensure_cached(page_num)?;
        Ok(&self.pages[&page_num])
    }

    pub fn get_page_mut(&mut self, page_num: usize) -> Result<&mut Page, PagerError> {
        self.ensure_cached(page_num)?;
        Ok(self.pages.get_mut(&page_num).unwrap())
    }

    /// Write one page back to the file at its page-aligned offset.
    pub fn flush(&mut self, page_num: usize) -> Result<(), PagerError> {
        let page = self
            .pages
            .get(&page_num)
            .ok_or(PagerError::PageNotCached(page_num))?;
        debug!("flushing page {}", page_num);
        self.file
            .seek(SeekFrom::Start((page_num * PAGE_SIZE) as u64))?;
        self.file.write_all(page.as_bytes())?;
        let end = ((page_num + 1) * PAGE_SIZE) as u64;
        if end > self.file_length {
            self.file_length = end;
        }
        Ok(())
    }

    /// Flush every resident page in page-number order and sync the file.
    pub fn flush_all(&mut self) -> Result<(), PagerError> {
        let mut resident: Vec<usize> = self.pages.keys().copied().collect();
        resident.sort_unstable();
        for page_num in resident {
            self.flush(page_num)?;
        }
        self.file.sync_all()?;
        Ok(())
    }

    fn ensure_cached(&mut self, page_num: usize) -> Result<(), PagerError> {
        if page_num >= self.max_pages {
            return Err(PagerError::OutOfBounds {
                page_num,
                max_pages: self.max_pages,
            });
        }
        if !self.pages.contains_key(&page_num) {
            // Cache miss. Start from a zeroed buffer and fill it from the
            // file when the page already exists on disk.
            let mut page = Page::init();
            let pages_on_disk = (self.file_length / PAGE_SIZE as u64) as usize;
            if page_num < pages_on_disk {
                debug!("page {} cache miss, reading from file", page_num);
                self.file
                    .seek(SeekFrom::Start((page_num * PAGE_SIZE) as u64))?;
                self.file.read_exact(page.as_bytes_mut())?;
            }
            self.pages.insert(page_num, page);
            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
        }
        Ok(())
    }
}
