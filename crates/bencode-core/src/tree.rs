//! Generic owned N-ary tree.
//!
//! A [`TreeNode`] exclusively owns its children; there are no parent
//! back-pointers. Code that needs parent context addresses nodes through an
//! index path from the root (`&[usize]`, one child index per level).
//!
//! The payload type decides, through [`NodeValue`], whether a node may have
//! children at all and whether those children must stay sorted by key. The
//! structural editors enforce both rules and panic on violation: inserting a
//! child into a scalar or out of key order is a bug in the caller, not bad
//! input.
//!
//! Because nodes are moved in and out by value, a node can never be attached
//! to two parents at once; the "already owned" precondition of a pointer-based
//! tree is checked by the compiler.

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

/// Behavior a payload type supplies to [`TreeNode`].
pub trait NodeValue {
    /// Whether a node with this payload may own children.
    fn is_container(&self) -> bool;

    /// Key of the node within a keyed parent.
    fn key(&self) -> Option<&[u8]>;

    /// Whether the children of a node with this payload are kept in strictly
    /// ascending byte order of their keys.
    fn orders_children(&self) -> bool;
}

/// A node of an owned, ordered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    value: T,
    children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Create a leaf node holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn children(&self) -> &[TreeNode<T>] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Child at `index`, or `None` when out of range.
    pub fn child(&self, index: usize) -> Option<&TreeNode<T>> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut TreeNode<T>> {
        self.children.get_mut(index)
    }

    /// Detach the child at `index` and hand its subtree to the caller.
    pub fn remove_child(&mut self, index: usize) -> Option<TreeNode<T>> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Detach and drop the child at `index`. Returns whether a child existed.
    pub fn delete_child(&mut self, index: usize) -> bool {
        self.remove_child(index).is_some()
    }

    /// Drop every child.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Descendant addressed by `path`; the empty path is `self`.
    pub fn node(&self, path: &[usize]) -> Option<&TreeNode<T>> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut TreeNode<T>> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Number of nodes in this subtree, `self` included.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::subtree_len)
            .sum::<usize>()
    }
}

impl<T: NodeValue> TreeNode<T> {
    /// Attach `node` as the new last child.
    ///
    /// # Panics
    ///
    /// When `self` is not a container, or when `self` orders its children and
    /// `node`'s key does not sort after the current last child.
    pub fn append_child(&mut self, node: TreeNode<T>) {
        let index = self.children.len();
        self.insert_child(index, node);
    }

    /// Attach `node` at `index`, shifting later children one position right.
    ///
    /// # Panics
    ///
    /// When `index > child_count()`, when `self` is not a container, or when
    /// `self` orders its children and `node` would break the key order.
    pub fn insert_child(&mut self, index: usize, node: TreeNode<T>) {
        assert!(
            self.value.is_container(),
            "precondition violated: scalar nodes cannot own children"
        );
        assert!(
            index <= self.children.len(),
            "precondition violated: insert index {index} out of range 0..={}",
            self.children.len()
        );
        if self.value.orders_children() {
            assert!(
                self.fits_at(index, &node),
                "precondition violated: child key does not sort at index {index}"
            );
        }
        self.children.insert(index, node);
    }

    /// Move the child at `from` to position `to`, preserving the relative
    /// order of every other child. `to` is the final index of the moved child.
    ///
    /// # Panics
    ///
    /// When either index is out of range, or when `self` orders its children
    /// and the move would break the key order.
    pub fn move_child(&mut self, from: usize, to: usize) {
        let len = self.children.len();
        assert!(
            from < len && to < len,
            "precondition violated: move {from} -> {to} out of range 0..{len}"
        );
        if from == to {
            return;
        }
        let node = self.children.remove(from);
        if self.value.orders_children() && !self.fits_at(to, &node) {
            self.children.insert(from, node);
            panic!("precondition violated: moving child {from} -> {to} breaks key order");
        }
        self.children.insert(to, node);
    }

    /// First child whose key equals `key`.
    pub fn child_by_key(&self, key: &[u8]) -> Option<&TreeNode<T>> {
        self.position_of_key(key).map(|index| &self.children[index])
    }

    pub fn child_by_key_mut(&mut self, key: &[u8]) -> Option<&mut TreeNode<T>> {
        self.position_of_key(key)
            .map(move |index| &mut self.children[index])
    }

    /// Index of the first child whose key equals `key`.
    ///
    /// Ordered parents are searched by bisection, others by linear scan.
    pub fn position_of_key(&self, key: &[u8]) -> Option<usize> {
        if self.value.orders_children() {
            self.sorted_position(key).ok()
        } else {
            self.children
                .iter()
                .position(|child| child.value.key() == Some(key))
        }
    }

    /// Bisect the children of an ordered parent for `key`.
    ///
    /// `Ok(index)` when a child with that key exists, `Err(index)` with the
    /// insertion point otherwise. Children without a key sort first.
    pub fn sorted_position(&self, key: &[u8]) -> Result<usize, usize> {
        self.children
            .binary_search_by(|child| compare_keys(child.value.key(), Some(key)))
    }

    fn fits_at(&self, index: usize, node: &TreeNode<T>) -> bool {
        let key = node.value.key();
        if key.is_none() {
            return false;
        }
        let after_prev = index == 0
            || compare_keys(self.children[index - 1].value.key(), key) == Ordering::Less;
        let before_next = index == self.children.len()
            || compare_keys(key, self.children[index].value.key()) == Ordering::Less;
        after_prev && before_next
    }
}

impl<T> Index<usize> for TreeNode<T> {
    type Output = TreeNode<T>;

    fn index(&self, index: usize) -> &TreeNode<T> {
        &self.children[index]
    }
}

impl<T> IndexMut<usize> for TreeNode<T> {
    fn index_mut(&mut self, index: usize) -> &mut TreeNode<T> {
        &mut self.children[index]
    }
}

fn compare_keys(a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
    a.cmp(&b)
}
