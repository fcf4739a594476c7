pub mod node;

use std::mem::size_of;

use log::info;
use minidb_page::page::{Page, PAGE_SIZE};
use minidb_page::pager::{Pager, PagerError};

pub use self::node::Slot;

use super::{ExecuteError, ROW_SIZE};

pub type LeafNodeKey = u32;
pub type NodePointer = u32;
pub type CellsCount = u32;

/// Common Node Header Layout
/// (<offset>, <size>)
const NODE_TYPE: (usize, usize) = (0, size_of::<u8>());
/// (<offset>, <size>)
const IS_ROOT: (usize, usize) = (NODE_TYPE.0 + NODE_TYPE.1, size_of::<u8>());
/// (<offset>, <size>)
const PARENT_POINTER: (usize, usize) = (IS_ROOT.0 + IS_ROOT.1, size_of::<NodePointer>());
const COMMON_NODE_HEADER_SIZE: usize = NODE_TYPE.1 + IS_ROOT.1 + PARENT_POINTER.1;

/// Leaf Node Header Layout
/// (<offset>, <size>)
const LEAF_NODE_NUM_CELLS: (usize, usize) = (COMMON_NODE_HEADER_SIZE, size_of::<CellsCount>());
const LEAF_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS.1;

/// Leaf Node Body Layout
const LEAF_NODE_KEY_SIZE: usize = size_of::<LeafNodeKey>();
const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;
const LEAF_NODE_RIGHT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) / 2;
const LEAF_NODE_LEFT_SPLIT_COUNT: usize = LEAF_NODE_MAX_CELLS + 1 - LEAF_NODE_RIGHT_SPLIT_COUNT;

/// Internal Node Header Layout
/// (<offset>, <size>)
const INTERNAL_NODE_NUM_KEYS: (usize, usize) = (COMMON_NODE_HEADER_SIZE, size_of::<CellsCount>());
/// (<offset>, <size>)
const INTERNAL_NODE_RIGHT_CHILD: (usize, usize) = (
    INTERNAL_NODE_NUM_KEYS.0 + INTERNAL_NODE_NUM_KEYS.1,
    size_of::<NodePointer>(),
);
const INTERNAL_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + INTERNAL_NODE_NUM_KEYS.1 + INTERNAL_NODE_RIGHT_CHILD.1;

/// Internal Node Body Layout
const INTERNAL_NODE_CHILD_SIZE: usize = size_of::<NodePointer>();
const INTERNAL_NODE_KEY_SIZE: usize = size_of::<LeafNodeKey>();
const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;
pub const INTERNAL_NODE_MAX_KEYS: usize =
    (PAGE_SIZE - INTERNAL_NODE_HEADER_SIZE) / INTERNAL_NODE_CELL_SIZE;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum NodeType {
    Internal,
    Leaf,
}

impl NodeType {
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            0x2 => Self::Internal,
            0x5 => Self::Leaf,
            _ => panic!("Invalid node type: {}", byte),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            Self::Internal => 0x2,
            Self::Leaf => 0x5,
        }
    }
}

/// Walk from `root_page_num` down to the leaf responsible for `key` and
/// binary-search it. The returned slot is an exact hit or the insertion
/// point.
pub fn find(
    pager: &mut Pager,
    root_page_num: usize,
    key: u32,
) -> Result<(usize, Slot), PagerError> {
    let mut page_num = root_page_num;
    loop {
        let page = pager.get_page(page_num)?;
        match node::node_type(page) {
            NodeType::Leaf => return Ok((page_num, node::leaf_search(page, key))),
            NodeType::Internal => {
                let child_idx = node::internal_find_child(page, key);
                page_num = node::internal_child(page, child_idx) as usize;
            }
        }
    }
}

/// First leaf in key order under `page_num`.
pub fn leftmost_leaf(pager: &mut Pager, page_num: usize) -> Result<usize, PagerError> {
    let mut page_num = page_num;
    loop {
        let page = pager.get_page(page_num)?;
        if node::node_type(page) == NodeType::Leaf {
            return Ok(page_num);
        }
        page_num = node::internal_child(page, 0) as usize;
    }
}

/// Leaf following `leaf_page_num` in key order, found by climbing parent
/// back-references to the nearest ancestor with a further subtree and
/// descending to its leftmost leaf. `None` past the last leaf.
pub fn next_leaf(pager: &mut Pager, leaf_page_num: usize) -> Result<Option<usize>, PagerError> {
    let mut child = leaf_page_num;
    loop {
        let page = pager.get_page(child)?;
        if node::is_root(page) {
            return Ok(None);
        }
        let parent = node::parent(page) as usize;
        let parent_page = pager.get_page(parent)?;
        match node::internal_child_index(parent_page, child as NodePointer) {
            Some(idx) => {
                let next = node::internal_child(parent_page, idx + 1) as usize;
                return Ok(Some(leftmost_leaf(pager, next)?));
            }
            // Rightmost child of this parent, keep climbing.
            None => child = parent,
        }
    }
}

/// Insert a cell into the leaf at `page_num`, splitting it when full.
/// `cell_num` is the slot returned by [`find`]; duplicate detection has
/// already happened by the time this runs.
pub fn leaf_insert(
    pager: &mut Pager,
    page_num: usize,
    cell_num: u32,
    key: u32,
    value: &[u8; ROW_SIZE],
) -> Result<(), ExecuteError> {
    let page = pager.get_page(page_num)?;
    if node::leaf_num_cells(page) as usize >= LEAF_NODE_MAX_CELLS {
        return leaf_split_insert(pager, page_num, cell_num, key, value);
    }
    let page = pager.get_page_mut(page_num)?;
    node::leaf_insert_cell(page, cell_num, key, value);
    Ok(())
}

/// Number of fresh pages a split starting at `page_num` will allocate: one
/// per full node along the parent chain, two when the chain reaches the
/// root. Computed before mutating anything so a rejected insert leaves the
/// tree untouched.
fn split_page_cost(pager: &mut Pager, page_num: usize) -> Result<usize, PagerError> {
    let mut cost = 0;
    let mut page_num = page_num;
    loop {
        let page = pager.get_page(page_num)?;
        if node::is_root(page) {
            return Ok(cost + 2);
        }
        cost += 1;
        let parent = node::parent(page) as usize;
        let parent_page = pager.get_page(parent)?;
        if (node::internal_num_keys(parent_page) as usize) < INTERNAL_NODE_MAX_KEYS {
            return Ok(cost);
        }
        page_num = parent;
    }
}

fn leaf_split_insert(
    pager: &mut Pager,
    page_num: usize,
    cell_num: u32,
    key: u32,
    value: &[u8; ROW_SIZE],
) -> Result<(), ExecuteError> {
    let cost = split_page_cost(pager, page_num)?;
    if pager.num_pages() + cost > pager.max_pages() {
        return Err(ExecuteError::TableFull);
    }

    // All cells of the overflowing leaf plus the incoming one, in key order.
    let (mut cells, parent, was_root) = {
        let page = pager.get_page(page_num)?;
        let num_cells = node::leaf_num_cells(page);
        let mut cells = Vec::with_capacity(num_cells as usize + 1);
        for i in 0..num_cells {
            cells.push(node::leaf_cell(page, i));
        }
        (cells, node::parent(page), node::is_root(page))
    };
    cells.insert(cell_num as usize, (key, *value));

    let right_cells = cells.split_off(LEAF_NODE_LEFT_SPLIT_COUNT);
    let left_cells = cells;
    debug_assert_eq!(right_cells.len(), LEAF_NODE_RIGHT_SPLIT_COUNT);
    let separator = left_cells[LEAF_NODE_LEFT_SPLIT_COUNT - 1].0;
    let right_max = right_cells[right_cells.len() - 1].0;

    if was_root {
        // The root must stay at its page number: move both halves out to
        // fresh pages and turn this page into an internal root over them.
        let left_page_num = pager.get_unused_page_num();
        write_leaf(
            pager.get_page_mut(left_page_num)?,
            &left_cells,
            page_num as NodePointer,
        );
        let right_page_num = pager.get_unused_page_num();
        write_leaf(
            pager.get_page_mut(right_page_num)?,
            &right_cells,
            page_num as NodePointer,
        );

        let page = pager.get_page_mut(page_num)?;
        node::initialize_internal_node(page);
        node::set_is_root(page, true);
        node::set_internal_cell(page, 0, left_page_num as NodePointer, separator);
        node::set_internal_num_keys(page, 1);
        node::set_internal_right_child(page, right_page_num as NodePointer);
        info!(
            "split root leaf {} into {} | {} at key {}",
            page_num, left_page_num, right_page_num, separator
        );
    } else {
        // The low half stays in place; the high half moves to a fresh page
        // which takes over the old page's slot in the parent, and the low
        // half is re-inserted under the separator key.
        let right_page_num = pager.get_unused_page_num();
        write_leaf(pager.get_page_mut(right_page_num)?, &right_cells, parent);

        let page = pager.get_page_mut(page_num)?;
        node::set_leaf_num_cells(page, left_cells.len() as CellsCount);
        for (i, (cell_key, cell_value)) in left_cells.iter().enumerate() {
            node::set_leaf_cell(page, i as u32, *cell_key, cell_value);
        }

        let parent_page = pager.get_page_mut(parent as usize)?;
        node::replace_internal_child(parent_page, page_num as NodePointer, right_page_num as NodePointer);
        internal_insert(pager, parent as usize, page_num as NodePointer, separator)?;
        info!(
            "split leaf {} into {} | {} at key {} (right max {})",
            page_num, page_num, right_page_num, separator, right_max
        );
    }
    Ok(())
}

/// Insert a `(child, key)` routing cell into the internal node at
/// `page_num`, splitting it when full.
fn internal_insert(
    pager: &mut Pager,
    page_num: usize,
    child: NodePointer,
    key: u32,
) -> Result<(), ExecuteError> {
    let page = pager.get_page(page_num)?;
    if node::internal_num_keys(page) as usize >= INTERNAL_NODE_MAX_KEYS {
        return internal_split_insert(pager, page_num, child, key);
    }
    let page = pager.get_page_mut(page_num)?;
    let idx = node::internal_find_child(page, key);
    node::internal_insert_cell(page, idx, child, key);
    let child_page = pager.get_page_mut(child as usize)?;
    node::set_parent(child_page, page_num as NodePointer);
    Ok(())
}

fn internal_split_insert(
    pager: &mut Pager,
    page_num: usize,
    new_child: NodePointer,
    new_key: u32,
) -> Result<(), ExecuteError> {
    let (mut entries, right_child, parent, was_root) = {
        let page = pager.get_page(page_num)?;
        let num_keys = node::internal_num_keys(page);
        let mut entries = Vec::with_capacity(num_keys as usize + 1);
        for i in 0..num_keys {
            entries.push((node::internal_child(page, i), node::internal_key(page, i)));
        }
        (
            entries,
            node::internal_right_child(page),
            node::parent(page),
            node::is_root(page),
        )
    };
    let insert_at = entries.partition_point(|(_, k)| *k < new_key);
    entries.insert(insert_at, (new_child, new_key));

    // Classic median promotion: the middle separator moves to the parent
    // and its child becomes the left node's rightmost child.
    let mid = entries.len() / 2;
    let promoted = entries[mid].1;
    let left_right_child = entries[mid].0;
    let right_entries = entries.split_off(mid + 1);
    entries.truncate(mid);
    let left_entries = entries;

    if was_root {
        let left_page_num = pager.get_unused_page_num();
        write_internal(
            pager.get_page_mut(left_page_num)?,
            &left_entries,
            left_right_child,
            page_num as NodePointer,
        );
        let right_page_num = pager.get_unused_page_num();
        write_internal(
            pager.get_page_mut(right_page_num)?,
            &right_entries,
            right_child,
            page_num as NodePointer,
        );

        let page = pager.get_page_mut(page_num)?;
        node::initialize_internal_node(page);
        node::set_is_root(page, true);
        node::set_internal_cell(page, 0, left_page_num as NodePointer, promoted);
        node::set_internal_num_keys(page, 1);
        node::set_internal_right_child(page, right_page_num as NodePointer);

        update_children_parent(pager, left_page_num)?;
        update_children_parent(pager, right_page_num)?;
        info!(
            "split root internal {} into {} | {} at key {}",
            page_num, left_page_num, right_page_num, promoted
        );
    } else {
        let right_page_num = pager.get_unused_page_num();
        write_internal(
            pager.get_page_mut(right_page_num)?,
            &right_entries,
            right_child,
            parent,
        );

        let page = pager.get_page_mut(page_num)?;
        node::set_internal_num_keys(page, left_entries.len() as CellsCount);
        for (i, (cell_child, cell_key)) in left_entries.iter().enumerate() {
            node::set_internal_cell(page, i as u32, *cell_child, *cell_key);
        }
        node::set_internal_right_child(page, left_right_child);

        update_children_parent(pager, page_num)?;
        update_children_parent(pager, right_page_num)?;

        let parent_page = pager.get_page_mut(parent as usize)?;
        node::replace_internal_child(parent_page, page_num as NodePointer, right_page_num as NodePointer);
        internal_insert(pager, parent as usize, page_num as NodePointer, promoted)?;
        info!(
            "split internal {} into {} | {} at key {}",
            page_num, page_num, right_page_num, promoted
        );
    }
    Ok(())
}

/// Point every child of the internal node at `page_num` back at it.
fn update_children_parent(pager: &mut Pager, page_num: usize) -> Result<(), PagerError> {
    let children: Vec<NodePointer> = {
        let page = pager.get_page(page_num)?;
        (0..=node::internal_num_keys(page))
            .map(|i| node::internal_child(page, i))
            .collect()
    };
    for child in children {
        let child_page = pager.get_page_mut(child as usize)?;
        node::set_parent(child_page, page_num as NodePointer);
    }
    Ok(())
}

fn write_leaf(page: &mut Page, cells: &[(u32, [u8; ROW_SIZE])], parent: NodePointer) {
    node::initialize_leaf_node(page);
    node::set_parent(page, parent);
    for (i, (key, value)) in cells.iter().enumerate() {
        node::set_leaf_cell(page, i as u32, *key, value);
    }
    node::set_leaf_num_cells(page, cells.len() as CellsCount);
}

fn write_internal(
    page: &mut Page,
    entries: &[(NodePointer, u32)],
    right_child: NodePointer,
    parent: NodePointer,
) {
    node::initialize_internal_node(page);
    node::set_parent(page, parent);
    for (i, (child, key)) in entries.iter().enumerate() {
        node::set_internal_cell(page, i as u32, *child, *key);
    }
    node::set_internal_num_keys(page, entries.len() as CellsCount);
    node::set_internal_right_child(page, right_child);
}
