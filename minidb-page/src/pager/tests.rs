use serial_test::serial;

use std::fs::{remove_file, File, OpenOptions};
use std::io::Write;

use crate::page::PAGE_SIZE;
use crate::pager::{Pager, PagerError, TABLE_MAX_PAGES};

static TEST_FILE: &str = "test_pager.db";

fn initialize() {
    File::create(TEST_FILE).unwrap();
}

#[test]
#[serial]
fn open_empty_file() {
    initialize();
    let pager = Pager::open(TEST_FILE).unwrap();
    assert_eq!(pager.num_pages(), 0);
    assert_eq!(pager.max_pages(), TABLE_MAX_PAGES);
    assert_eq!(pager.get_unused_page_num(), 0);
}

#[test]
#[serial]
fn fresh_page_is_zeroed() {
    initialize();
    let mut pager = Pager::open(TEST_FILE).unwrap();
    let page = pager.get_page(0).unwrap();
    assert_eq!(page.as_bytes(), &[0; PAGE_SIZE]);
    assert_eq!(pager.num_pages(), 1);
}

#[test]
#[serial]
fn modify_flush_reload() {
    initialize();
    let mut pager = Pager::open(TEST_FILE).unwrap();
    let page = pager.get_page_mut(0).unwrap();
    page.write_buf_at(0, &[0x1; PAGE_SIZE]);
    pager.flush(0).unwrap();
    drop(pager);

    let mut pager = Pager::open(TEST_FILE).unwrap();
    assert_eq!(pager.num_pages(), 1);
    let page = pager.get_page(0).unwrap();
    assert_eq!(page.as_bytes(), &[0x1; PAGE_SIZE]);
}

#[test]
#[serial]
fn flush_all_persists_every_page() {
    initialize();
    let mut pager = Pager::open(TEST_FILE).unwrap();
    for i in 0..10 {
        let page = pager.get_page_mut(i).unwrap();
        page.write_buf_at(0, &[i as u8; PAGE_SIZE]);
    }
    pager.flush_all().unwrap();
    drop(pager);

    let mut pager = Pager::open(TEST_FILE).unwrap();
    assert_eq!(pager.num_pages(), 10);
    for i in 0..10 {
        let page = pager.get_page(i).unwrap();
        assert_eq!(page.read_u8_at(0), i as u8, "Error at page {}", i);
    }
}

#[test]
#[serial]
fn get_off_limit_page() {
    initialize();
    let mut pager = Pager::open(TEST_FILE).unwrap();
    let err = pager.get_page(TABLE_MAX_PAGES).unwrap_err();
    assert!(matches!(
        err,
        PagerError::OutOfBounds {
            page_num: TABLE_MAX_PAGES,
            max_pages: TABLE_MAX_PAGES,
        }
    ));
}

#[test]
#[serial]
fn flush_non_resident_page() {
    initialize();
    let mut pager = Pager::open(TEST_FILE).unwrap();
    let err = pager.flush(3).unwrap_err();
    assert!(matches!(err, PagerError::PageNotCached(3)));
}

#[test]
#[serial]
fn corrupt_file_length() {
    initialize();
    let mut file = OpenOptions::new().write(true).open(TEST_FILE).unwrap();
    file.write_all(&[0; PAGE_SIZE + 1]).unwrap();
    drop(file);

    let err = Pager::open(TEST_FILE).unwrap_err();
    assert!(matches!(err, PagerError::CorruptFile { .. }));
    remove_file(TEST_FILE).unwrap();
}

#[test]
#[serial]
fn raised_ceiling() {
    initialize();
    let mut pager = Pager::open_with_max_pages(TEST_FILE, 500).unwrap();
    assert!(pager.get_page(499).is_ok());
    assert!(pager.get_page(500).is_err());
    assert_eq!(pager.num_pages(), 500);
}
