//! Pure offset arithmetic over a page holding one tree node. No I/O here:
//! every function below reads or writes header fields and cells through the
//! page's bounds-checked accessors.

use minidb_page::page::Page;

use super::{
    CellsCount, NodePointer, NodeType, INTERNAL_NODE_CELL_SIZE, INTERNAL_NODE_CHILD_SIZE,
    INTERNAL_NODE_HEADER_SIZE, INTERNAL_NODE_MAX_KEYS, INTERNAL_NODE_NUM_KEYS,
    INTERNAL_NODE_RIGHT_CHILD, IS_ROOT, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE,
    LEAF_NODE_KEY_SIZE, LEAF_NODE_MAX_CELLS, LEAF_NODE_NUM_CELLS, LEAF_NODE_VALUE_SIZE, NODE_TYPE,
    PARENT_POINTER,
};
use crate::table::ROW_SIZE;

#[derive(Debug, PartialEq)]
pub enum Slot {
    /// Represent a slot which is not occupied by the key yet
    Hole(u32),
    /// Represent a slot which is occupied by the key
    Cell(u32),
}

pub fn node_type(page: &Page) -> NodeType {
    NodeType::from_u8(page.read_u8_at(NODE_TYPE.0))
}

pub fn set_node_type(page: &mut Page, node_type: NodeType) {
    page.write_u8_at(NODE_TYPE.0, node_type.to_u8());
}

pub fn is_root(page: &Page) -> bool {
    page.read_u8_at(IS_ROOT.0) != 0
}

pub fn set_is_root(page: &mut Page, is_root: bool) {
    page.write_u8_at(IS_ROOT.0, is_root as u8);
}

pub fn parent(page: &Page) -> NodePointer {
    page.read_u32_at(PARENT_POINTER.0)
}

pub fn set_parent(page: &mut Page, parent: NodePointer) {
    page.write_u32_at(PARENT_POINTER.0, parent);
}

/// Zero out the leaf header: an empty non-root leaf with no parent. The
/// rest of the page may hold stale bytes; the cell count makes them
/// unreachable.
pub fn initialize_leaf_node(page: &mut Page) {
    set_node_type(page, NodeType::Leaf);
    set_is_root(page, false);
    set_parent(page, 0);
    set_leaf_num_cells(page, 0);
}

pub fn initialize_internal_node(page: &mut Page) {
    set_node_type(page, NodeType::Internal);
    set_is_root(page, false);
    set_parent(page, 0);
    set_internal_num_keys(page, 0);
    set_internal_right_child(page, 0);
}

pub fn leaf_num_cells(page: &Page) -> CellsCount {
    page.read_u32_at(LEAF_NODE_NUM_CELLS.0)
}

pub fn set_leaf_num_cells(page: &mut Page, num_cells: CellsCount) {
    page.write_u32_at(LEAF_NODE_NUM_CELLS.0, num_cells);
}

fn leaf_cell_offset(cell_num: u32) -> usize {
    assert!(
        (cell_num as usize) < LEAF_NODE_MAX_CELLS,
        "leaf cell {} out of range",
        cell_num
    );
    LEAF_NODE_HEADER_SIZE + cell_num as usize * LEAF_NODE_CELL_SIZE
}

pub fn leaf_key(page: &Page, cell_num: u32) -> u32 {
    assert!(cell_num < leaf_num_cells(page));
    page.read_u32_at(leaf_cell_offset(cell_num))
}

/// Record bytes of cell `cell_num`, viewed in place.
pub fn leaf_value(page: &Page, cell_num: u32) -> &[u8] {
    assert!(cell_num < leaf_num_cells(page));
    page.read_buf_at(
        leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE,
        LEAF_NODE_VALUE_SIZE,
    )
}

/// Copy cell `cell_num` out of the page.
pub fn leaf_cell(page: &Page, cell_num: u32) -> (u32, [u8; ROW_SIZE]) {
    let mut value = [0; ROW_SIZE];
    value.copy_from_slice(leaf_value(page, cell_num));
    (leaf_key(page, cell_num), value)
}

/// Overwrite the cell slot without touching the cell count. The caller
/// keeps `cell_num` within capacity and the count consistent.
pub fn set_leaf_cell(page: &mut Page, cell_num: u32, key: u32, value: &[u8; ROW_SIZE]) {
    let offset = leaf_cell_offset(cell_num);
    page.write_u32_at(offset, key);
    page.write_buf_at(offset + LEAF_NODE_KEY_SIZE, value);
}

/// Shift-and-insert into a non-full leaf: every cell at or after `cell_num`
/// moves one slot right (highest first), then the new cell lands at
/// `cell_num` and the count grows by one.
pub fn leaf_insert_cell(page: &mut Page, cell_num: u32, key: u32, value: &[u8; ROW_SIZE]) {
    let num_cells = leaf_num_cells(page);
    assert!((num_cells as usize) < LEAF_NODE_MAX_CELLS);
    assert!(cell_num <= num_cells);
    if cell_num < num_cells {
        let src = leaf_cell_offset(cell_num);
        let dest = src + LEAF_NODE_CELL_SIZE;
        page.copy_within(src, dest, (num_cells - cell_num) as usize * LEAF_NODE_CELL_SIZE);
    }
    set_leaf_cell(page, cell_num, key, value);
    set_leaf_num_cells(page, num_cells + 1);
}

/// Binary search over the sorted cell array. Keeps `lo <= target <= hi`
/// and stops at `lo == hi`: the first cell with key >= the probe, reported
/// as `Cell` on an exact hit and `Hole` otherwise.
pub fn leaf_search(page: &Page, key: u32) -> Slot {
    let mut lo = 0;
    let mut hi = leaf_num_cells(page);
    while lo < hi {
        let mid = (lo + hi) / 2;
        let mid_key = leaf_key(page, mid);
        if key == mid_key {
            return Slot::Cell(mid);
        }
        if key < mid_key {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Slot::Hole(lo)
}

pub fn internal_num_keys(page: &Page) -> CellsCount {
    page.read_u32_at(INTERNAL_NODE_NUM_KEYS.0)
}

pub fn set_internal_num_keys(page: &mut Page, num_keys: CellsCount) {
    page.write_u32_at(INTERNAL_NODE_NUM_KEYS.0, num_keys);
}

pub fn internal_right_child(page: &Page) -> NodePointer {
    page.read_u32_at(INTERNAL_NODE_RIGHT_CHILD.0)
}

pub fn set_internal_right_child(page: &mut Page, child: NodePointer) {
    page.write_u32_at(INTERNAL_NODE_RIGHT_CHILD.0, child);
}

fn internal_cell_offset(cell_num: u32) -> usize {
    assert!(
        (cell_num as usize) < INTERNAL_NODE_MAX_KEYS,
        "internal cell {} out of range",
        cell_num
    );
    INTERNAL_NODE_HEADER_SIZE + cell_num as usize * INTERNAL_NODE_CELL_SIZE
}

/// Separator key of cell `cell_num`: the maximum key in `child(cell_num)`'s
/// subtree.
pub fn internal_key(page: &Page, cell_num: u32) -> u32 {
    assert!(cell_num < internal_num_keys(page));
    page.read_u32_at(internal_cell_offset(cell_num) + INTERNAL_NODE_CHILD_SIZE)
}

/// Child at `child_num`, where `child_num == num_keys` addresses the
/// rightmost child.
pub fn internal_child(page: &Page, child_num: u32) -> NodePointer {
    let num_keys = internal_num_keys(page);
    assert!(child_num <= num_keys);
    if child_num == num_keys {
        internal_right_child(page)
    } else {
        page.read_u32_at(internal_cell_offset(child_num))
    }
}

pub fn set_internal_cell(page: &mut Page, cell_num: u32, child: NodePointer, key: u32) {
    let offset = internal_cell_offset(cell_num);
    page.write_u32_at(offset, child);
    page.write_u32_at(offset + INTERNAL_NODE_CHILD_SIZE, key);
}

/// Shift-and-insert a routing cell into a non-full internal node.
pub fn internal_insert_cell(page: &mut Page, cell_num: u32, child: NodePointer, key: u32) {
    let num_keys = internal_num_keys(page);
    assert!((num_keys as usize) < INTERNAL_NODE_MAX_KEYS);
    assert!(cell_num <= num_keys);
    if cell_num < num_keys {
        let src = internal_cell_offset(cell_num);
        let dest = src + INTERNAL_NODE_CELL_SIZE;
        page.copy_within(
            src,
            dest,
            (num_keys - cell_num) as usize * INTERNAL_NODE_CELL_SIZE,
        );
    }
    set_internal_cell(page, cell_num, child, key);
    set_internal_num_keys(page, num_keys + 1);
}

/// Index of the child responsible for `key`: the first cell whose separator
/// is >= `key`, or `num_keys` (the rightmost child) when every separator is
/// smaller.
pub fn internal_find_child(page: &Page, key: u32) -> u32 {
    let mut lo = 0;
    let mut hi = internal_num_keys(page);
    while lo < hi {
        let mid = (lo + hi) / 2;
        if key <= internal_key(page, mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

/// Cell index holding `child`, or `None` when `child` is the rightmost
/// child (or absent).
pub fn internal_child_index(page: &Page, child: NodePointer) -> Option<u32> {
    (0..internal_num_keys(page)).find(|i| page.read_u32_at(internal_cell_offset(*i)) == child)
}

/// Swap one child reference for another, keeping its separator key (or its
/// rightmost slot). Used when a split hands a page's upper half to a new
/// page.
pub fn replace_internal_child(page: &mut Page, old_child: NodePointer, new_child: NodePointer) {
    match internal_child_index(page, old_child) {
        Some(idx) => {
            let key = internal_key(page, idx);
            set_internal_cell(page, idx, new_child, key);
        }
        None => {
            assert_eq!(
                internal_right_child(page),
                old_child,
                "child {} is not referenced by this node",
                old_child
            );
            set_internal_right_child(page, new_child);
        }
    }
}
