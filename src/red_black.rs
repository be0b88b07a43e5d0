//! A red-black tree storing a set of ordered values. Each node owns its children through raw
//! pointers and keeps a non-owning pointer to its parent so the fixups can walk back up the tree
//! after an insert or a removal.
//!
//! # Examples
//!
//! ```
//! use rbtree::red_black::{Color, Tree};
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert!(!tree.contains(&1));
//!
//! assert!(tree.insert(1));
//! assert!(tree.contains(&1));
//!
//! // Inserting a value that's already present does nothing.
//! assert!(!tree.insert(1));
//! assert_eq!(tree.len(), 1);
//!
//! tree.insert(2);
//! tree.insert(3);
//!
//! // Ascending inserts still leave a balanced tree.
//! let root = tree.snapshot().unwrap();
//! assert_eq!((*root.value, root.color), (2, Color::Black));
//!
//! assert!(tree.remove(&2));
//! assert!(!tree.remove(&2));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use log::{debug, trace};
use thiserror::Error;

/// The label every node carries. Absent children count as [`Color::Black`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Newly inserted nodes start out red.
    Red,
    /// The root and every absent child are black.
    Black,
}

/// A broken red-black or search tree property reported by [`Tree::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The root of a non-empty tree is red.
    #[error("the root is red")]
    RedRoot,
    /// A red node has a red child.
    #[error("a red node has a red child")]
    RedRedEdge,
    /// Two paths from the same node down to an absent child pass through different numbers of
    /// black nodes.
    #[error("black heights differ: {left} on the left, {right} on the right")]
    BlackHeightMismatch {
        /// Black height of the left subtree.
        left: usize,
        /// Black height of the right subtree.
        right: usize,
    },
    /// A value is out of order relative to one of its ancestors, or appears twice.
    #[error("values are not strictly ascending in order")]
    OrderViolation,
    /// A child's parent pointer doesn't point back at the node owning it.
    #[error("a parent pointer doesn't match the owning node")]
    BrokenParentLink,
    /// The number of reachable nodes doesn't match the tree's recorded length.
    #[error("recorded length is {recorded} but {counted} nodes are reachable")]
    LenMismatch {
        /// What [`Tree::len`] reports.
        recorded: usize,
        /// How many nodes a full walk found.
        counted: usize,
    },
}

/// An ordered set backed by a red-black tree. Inserting, removing, and searching all take
/// `O(lg N)` time.
pub struct Tree<T> {
    root: Link<T>,
    len: usize,
    _marker: PhantomData<Box<Node<T>>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.map(|root| root.clone_subtree(None)),
            len: self.len,
            _marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len)
            .field("root", &self.snapshot())
            .finish()
    }
}

impl<T: Ord> FromIterator<T> for Tree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for Tree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Tree<T> {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// The number of values stored in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree stores no values at all.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every value from the tree.
    pub fn clear(&mut self) {
        // Freed with an explicit stack so a pathological depth can't overflow the call stack.
        let mut stack: Vec<NodeRef<T>> = self.root.take().into_iter().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.left());
            stack.extend(node.right());
            // SAFETY: `node` was detached from the tree above (either the root was taken or its
            // parent was already freed) and its children were pushed first, so nothing reads it
            // after this.
            unsafe { node.free() };
        }
        self.len = 0;
    }

    /// The smallest value in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree::red_black::Tree;
    ///
    /// let tree: Tree<_> = [5, 1, 9].into_iter().collect();
    /// assert_eq!(tree.min(), Some(&1));
    /// assert_eq!(Tree::<i32>::new().min(), None);
    /// ```
    pub fn min(&self) -> Option<&T> {
        // SAFETY: The node is owned by `self` which outlives the returned reference.
        self.root
            .map(|root| unsafe { root.extreme(Side::Left).value() })
    }

    /// The largest value in the tree.
    pub fn max(&self) -> Option<&T> {
        // SAFETY: The node is owned by `self` which outlives the returned reference.
        self.root
            .map(|root| unsafe { root.extreme(Side::Right).value() })
    }

    /// Iterates over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            walk: InOrder::new(self),
        }
    }

    /// Iterates over the values in ascending order along with the color of the node holding each
    /// one. Every call starts a fresh walk from the smallest value.
    pub fn colored(&self) -> Colored<'_, T> {
        Colored {
            walk: InOrder::new(self),
        }
    }

    /// Collects [`Tree::colored`] into a `Vec`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree::red_black::{Color, Tree};
    ///
    /// let tree: Tree<_> = [10, 20, 30].into_iter().collect();
    /// assert_eq!(
    ///     tree.enumerate_sorted(),
    ///     vec![(&10, Color::Red), (&20, Color::Black), (&30, Color::Red)],
    /// );
    /// ```
    pub fn enumerate_sorted(&self) -> Vec<(&T, Color)> {
        self.colored().collect()
    }

    /// A read-only copy of the tree's shape: every node's value and color, and the same for its
    /// children down to the absent ones. `None` for an empty tree.
    pub fn snapshot(&self) -> Option<Snapshot<'_, T>> {
        self.root.map(Snapshot::of)
    }

    /// Rotates `node` toward `dir`: its child on the other side (the pivot) takes its place and
    /// `node` becomes the pivot's child on the `dir` side. Does nothing without a pivot.
    ///
    /// ```text
    ///      node                 pivot
    ///     /    \     left      /     \
    ///    a    pivot  ---->   node     c
    ///         /   \          /  \
    ///        b     c        a    b
    /// ```
    fn rotate(&mut self, node: NodeRef<T>, dir: Side) {
        let Some(pivot) = node.child(dir.opposite()) else {
            return;
        };
        trace!("rotating {:?} around a node", dir);

        let inner = pivot.child(dir);
        node.set_child(dir.opposite(), inner);
        if let Some(inner) = inner {
            inner.set_parent(Some(node));
        }

        self.transplant(node, Some(pivot));

        pivot.set_child(dir, Some(node));
        node.set_parent(Some(pivot));
    }

    /// Puts `new` in the slot `old` occupies in its parent (or at the root). `old` keeps its own
    /// children and stale parent pointer; the caller relinks or frees it.
    fn transplant(&mut self, old: NodeRef<T>, new: Link<T>) {
        let parent = old.parent();
        match parent {
            None => self.root = new,
            Some(parent) => parent.set_child(parent.side_of(old), new),
        }
        if let Some(new) = new {
            new.set_parent(parent);
        }
    }

    /// Restores the red-black properties after `node` was linked in as a red leaf.
    fn insert_fixup(&mut self, mut node: NodeRef<T>) {
        while let Some(mut parent) = node.parent().filter(|p| p.color() == Color::Red) {
            let grandparent = parent
                .parent()
                .expect("a red parent is never the root so it has a parent");
            let side = grandparent.side_of(parent);

            match grandparent.child(side.opposite()) {
                Some(uncle) if uncle.color() == Color::Red => {
                    trace!("insert fixup: red uncle, recoloring and moving up");
                    parent.set_color(Color::Black);
                    uncle.set_color(Color::Black);
                    grandparent.set_color(Color::Red);
                    node = grandparent;
                }
                _ => {
                    if parent.child(side.opposite()) == Some(node) {
                        trace!("insert fixup: black uncle, triangle");
                        self.rotate(parent, side);
                        node = parent;
                        parent = node.parent().expect("rotation put a parent above the node");
                    }
                    trace!("insert fixup: black uncle, line");
                    parent.set_color(Color::Black);
                    grandparent.set_color(Color::Red);
                    self.rotate(grandparent, side.opposite());
                    break;
                }
            }
        }

        if let Some(root) = self.root {
            root.set_color(Color::Black);
        }

        if cfg!(debug_assertions) {
            if let Some(parent) = node.parent() {
                assert!(!(parent.color() == Color::Red && node.color() == Color::Red));
            }
        }
    }

    /// Resolves a missing black node at the position `node` in `parent`. `node` may be absent, in
    /// which case `parent` is what locates the gap.
    fn remove_fixup(&mut self, mut node: Link<T>, mut parent: Link<T>) {
        while node != self.root && color_of(node) == Color::Black {
            let Some(p) = parent else {
                break;
            };
            // A double-black gap always has a real sibling, so an absent `node` can't be confused
            // with an absent sibling here.
            let side = if p.left() == node {
                Side::Left
            } else {
                Side::Right
            };
            let far = side.opposite();
            let mut sibling = p
                .child(far)
                .expect("a black-deficient position always has a sibling");

            if sibling.color() == Color::Red {
                trace!("remove fixup: red sibling");
                sibling.set_color(Color::Black);
                p.set_color(Color::Red);
                self.rotate(p, side);
                sibling = p.child(far).expect("rotation gave the parent a new sibling");
            }

            if color_of(sibling.child(side)) == Color::Black
                && color_of(sibling.child(far)) == Color::Black
            {
                trace!("remove fixup: black sibling with black children, moving up");
                sibling.set_color(Color::Red);
                node = Some(p);
                parent = p.parent();
            } else {
                if color_of(sibling.child(far)) == Color::Black {
                    trace!("remove fixup: red near child");
                    if let Some(near) = sibling.child(side) {
                        near.set_color(Color::Black);
                    }
                    sibling.set_color(Color::Red);
                    self.rotate(sibling, far);
                    sibling = p.child(far).expect("rotation gave the parent a new sibling");
                }
                trace!("remove fixup: red far child");
                sibling.set_color(p.color());
                p.set_color(Color::Black);
                if let Some(far_child) = sibling.child(far) {
                    far_child.set_color(Color::Black);
                }
                self.rotate(p, side);
                node = self.root;
                parent = None;
            }
        }

        if let Some(node) = node {
            node.set_color(Color::Black);
        }

        if cfg!(debug_assertions) {
            assert!(color_of(self.root) == Color::Black);
        }
    }
}

impl<T: Ord> Tree<T> {
    /// Inserts `value` into the tree. Returns `false` and leaves the tree untouched when an equal
    /// value is already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree::red_black::Tree;
    ///
    /// let mut tree = Tree::new();
    ///
    /// assert!(tree.insert(1));
    /// assert!(!tree.insert(1));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let mut parent = None;
        let mut side = Side::Left;
        let mut cursor = self.root;
        while let Some(node) = cursor {
            // SAFETY: `node` is reachable from the root and we hold `&mut self`.
            side = match value.cmp(unsafe { node.value() }) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    debug!("ignoring insert of a value already in the tree");
                    return false;
                }
            };
            parent = Some(node);
            cursor = node.child(side);
        }

        let new_node = NodeRef::alloc(value, parent);
        match parent {
            None => {
                new_node.set_color(Color::Black);
                self.root = Some(new_node);
            }
            Some(parent) => {
                parent.set_child(side, Some(new_node));

                if cfg!(debug_assertions) {
                    // SAFETY: Both nodes are live and only read here.
                    unsafe {
                        match side {
                            Side::Left => assert!(new_node.value() < parent.value()),
                            Side::Right => assert!(new_node.value() > parent.value()),
                        }
                    }
                }

                self.insert_fixup(new_node);
            }
        }
        self.len += 1;
        true
    }

    /// Removes `value` from the tree. Returns `false` when the tree didn't contain it.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree::red_black::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1);
    ///
    /// assert!(tree.remove(&1));
    /// assert!(!tree.remove(&1));
    /// assert!(tree.is_empty());
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        let Some(target) = self.find_node(value) else {
            debug!("nothing to remove, value is not in the tree");
            return false;
        };

        // `gap` is where a black node may have gone missing and `gap_parent` locates it when
        // `gap` is absent.
        let removed_color;
        let gap;
        let gap_parent;
        match (target.left(), target.right()) {
            (None, right) => {
                removed_color = target.color();
                gap = right;
                gap_parent = target.parent();
                self.transplant(target, right);
            }
            (left, None) => {
                removed_color = target.color();
                gap = left;
                gap_parent = target.parent();
                self.transplant(target, left);
            }
            (Some(left), Some(right)) => {
                let successor = right.extreme(Side::Left);
                removed_color = successor.color();
                gap = successor.right();

                if successor == right {
                    gap_parent = Some(successor);
                } else {
                    gap_parent = successor.parent();
                    self.transplant(successor, gap);
                    successor.set_child(Side::Right, Some(right));
                    right.set_parent(Some(successor));
                }

                self.transplant(target, Some(successor));
                successor.set_child(Side::Left, Some(left));
                left.set_parent(Some(successor));
                successor.set_color(target.color());
            }
        }

        // SAFETY: `target` was transplanted out above and no node points at it anymore. Its own
        // child pointers are stale but `free` doesn't follow them.
        unsafe { target.free() };
        self.len -= 1;

        if removed_color == Color::Black {
            self.remove_fixup(gap, gap_parent);
        }
        true
    }

    /// Whether the tree contains `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.find_node(value).is_some()
    }

    /// Finds the stored value equal to `value`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree::red_black::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1);
    ///
    /// assert_eq!(tree.get(&1), Some(&1));
    /// assert_eq!(tree.get(&42), None);
    /// ```
    pub fn get(&self, value: &T) -> Option<&T> {
        // SAFETY: The node is owned by `self` which outlives the returned reference.
        self.find_node(value).map(|node| unsafe { node.value() })
    }

    /// Checks every red-black and search tree property along with the parent pointers and the
    /// recorded length. On success returns the number of black nodes on every path from the root
    /// down to an absent child, root included (zero for an empty tree).
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        let mut counted = 0;
        let black_height = match self.root {
            None => 0,
            Some(root) => {
                if root.color() == Color::Red {
                    return Err(InvariantViolation::RedRoot);
                }
                if root.parent().is_some() {
                    return Err(InvariantViolation::BrokenParentLink);
                }
                validate_subtree(root, None, None, &mut counted)?
            }
        };

        if counted != self.len {
            return Err(InvariantViolation::LenMismatch {
                recorded: self.len,
                counted,
            });
        }
        Ok(black_height)
    }

    fn find_node(&self, value: &T) -> Link<T> {
        let mut cursor = self.root;
        while let Some(node) = cursor {
            // SAFETY: `node` is reachable from the root and we hold `&self`.
            cursor = match value.cmp(unsafe { node.value() }) {
                Ordering::Less => node.left(),
                Ordering::Equal => return Some(node),
                Ordering::Greater => node.right(),
            };
        }
        None
    }
}

/// Returns the black height of the subtree at `node`, counting `node` itself. `lower` and
/// `upper` are the exclusive bounds its values must fall between.
fn validate_subtree<T: Ord>(
    node: NodeRef<T>,
    lower: Option<&T>,
    upper: Option<&T>,
    counted: &mut usize,
) -> Result<usize, InvariantViolation> {
    *counted += 1;
    // SAFETY: `node` is reachable from the root of a tree the caller borrows.
    let value = unsafe { node.value() };
    if lower.map_or(false, |lower| value <= lower) || upper.map_or(false, |upper| value >= upper) {
        return Err(InvariantViolation::OrderViolation);
    }

    let mut heights = [0; 2];
    for (side, height) in [Side::Left, Side::Right].into_iter().zip(heights.iter_mut()) {
        let Some(child) = node.child(side) else {
            continue;
        };
        if child.parent() != Some(node) {
            return Err(InvariantViolation::BrokenParentLink);
        }
        if node.color() == Color::Red && child.color() == Color::Red {
            return Err(InvariantViolation::RedRedEdge);
        }
        *height = match side {
            Side::Left => validate_subtree(child, lower, Some(value), counted)?,
            Side::Right => validate_subtree(child, Some(value), upper, counted)?,
        };
    }

    let [left, right] = heights;
    if left != right {
        return Err(InvariantViolation::BlackHeightMismatch { left, right });
    }
    Ok(left + usize::from(node.color() == Color::Black))
}

/// A tree-shaped, read-only view of a [`Tree`]: the value and color of a node and the same for
/// each of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<'a, T> {
    /// The value stored in this node.
    pub value: &'a T,
    /// This node's color.
    pub color: Color,
    /// The left subtree, if there is one.
    pub left: Option<Box<Snapshot<'a, T>>>,
    /// The right subtree, if there is one.
    pub right: Option<Box<Snapshot<'a, T>>>,
}

impl<'a, T> Snapshot<'a, T> {
    // Recursion depth is bounded by the tree's height, which the red-black properties keep at
    // `O(lg N)`.
    fn of(node: NodeRef<T>) -> Self {
        Self {
            // SAFETY: The caller borrows the tree owning `node` for `'a`.
            value: unsafe { node.value() },
            color: node.color(),
            left: node.left().map(|left| Box::new(Self::of(left))),
            right: node.right().map(|right| Box::new(Self::of(right))),
        }
    }
}

/// An in-order walk shared by [`Iter`] and [`Colored`]. The stack holds the nodes whose left
/// subtree is being visited.
struct InOrder<'a, T> {
    stack: Vec<NodeRef<T>>,
    remaining: usize,
    _tree: PhantomData<&'a Tree<T>>,
}

impl<'a, T> InOrder<'a, T> {
    fn new(tree: &'a Tree<T>) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
            remaining: tree.len,
            _tree: PhantomData,
        };
        walk.push_left_spine(tree.root);
        walk
    }

    fn push_left_spine(&mut self, mut link: Link<T>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left();
        }
    }

    fn next(&mut self) -> Option<NodeRef<T>> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some(node)
    }
}

/// Iterator over a [`Tree`]'s values in ascending order. Created by [`Tree::iter`].
pub struct Iter<'a, T> {
    walk: InOrder<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: The walk borrows the tree for `'a`.
        self.walk.next().map(|node| unsafe { node.value() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Iterator over a [`Tree`]'s values and node colors in ascending order. Created by
/// [`Tree::colored`].
pub struct Colored<'a, T> {
    walk: InOrder<'a, T>,
}

impl<'a, T> Iterator for Colored<'a, T> {
    type Item = (&'a T, Color);

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: The walk borrows the tree for `'a`.
        self.walk
            .next()
            .map(|node| (unsafe { node.value() }, node.color()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl<T> ExactSizeIterator for Colored<'_, T> {}

/// Which child of a node. The fixups are written once for a `side` and its `opposite` instead of
/// twice with left and right swapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

struct Node<T> {
    value: T,
    color: Color,
    left: Link<T>,
    right: Link<T>,
    // Never owns what it points to.
    parent: Link<T>,
}

type Link<T> = Option<NodeRef<T>>;

/// A pointer to a heap allocated [`Node`].
///
/// Every `NodeRef` reachable from a [`Tree`] points at a live node allocated by
/// [`NodeRef::alloc`], and the only way to free one is [`NodeRef::free`], which callers only use
/// after unlinking the node. The accessors rely on that and on the tree being single threaded:
/// each one reads or writes a single field through the raw pointer without keeping a reference
/// around, so they never alias a reference handed out elsewhere.
struct NodeRef<T>(NonNull<Node<T>>);

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for NodeRef<T> {}

impl<T> PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for NodeRef<T> {}

impl<T> NodeRef<T> {
    /// Allocates a red node with no children.
    fn alloc(value: T, parent: Link<T>) -> Self {
        Self(NonNull::from(Box::leak(Box::new(Node {
            value,
            color: Color::Red,
            left: None,
            right: None,
            parent,
        }))))
    }

    /// Frees the node and drops its value. Its children are left alone.
    ///
    /// # Safety
    ///
    /// The node must not be reachable from the tree anymore and must never be used again.
    unsafe fn free(self) {
        drop(Box::from_raw(self.0.as_ptr()));
    }

    /// # Safety
    ///
    /// The caller picks `'a` and must ensure the node outlives it and isn't mutated through
    /// `value` during it. Tree methods tie `'a` to their borrow of the tree.
    unsafe fn value<'a>(self) -> &'a T {
        &(*self.0.as_ptr()).value
    }

    fn color(self) -> Color {
        // SAFETY: See the type level docs.
        unsafe { (*self.0.as_ptr()).color }
    }

    fn set_color(self, color: Color) {
        // SAFETY: See the type level docs.
        unsafe { (*self.0.as_ptr()).color = color }
    }

    fn parent(self) -> Link<T> {
        // SAFETY: See the type level docs.
        unsafe { (*self.0.as_ptr()).parent }
    }

    fn set_parent(self, parent: Link<T>) {
        // SAFETY: See the type level docs.
        unsafe { (*self.0.as_ptr()).parent = parent }
    }

    fn left(self) -> Link<T> {
        self.child(Side::Left)
    }

    fn right(self) -> Link<T> {
        self.child(Side::Right)
    }

    fn child(self, side: Side) -> Link<T> {
        let node = self.0.as_ptr();
        // SAFETY: See the type level docs.
        unsafe {
            match side {
                Side::Left => (*node).left,
                Side::Right => (*node).right,
            }
        }
    }

    fn set_child(self, side: Side, child: Link<T>) {
        let node = self.0.as_ptr();
        // SAFETY: See the type level docs.
        unsafe {
            match side {
                Side::Left => (*node).left = child,
                Side::Right => (*node).right = child,
            }
        }
    }

    /// Which side of `self` the given child hangs on.
    fn side_of(self, child: NodeRef<T>) -> Side {
        if self.left() == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// The node furthest toward `side` in the subtree rooted here, e.g. the minimum for
    /// [`Side::Left`].
    fn extreme(self, side: Side) -> Self {
        let mut node = self;
        while let Some(child) = node.child(side) {
            node = child;
        }
        node
    }

    // Recursion depth is bounded by the tree's height.
    fn clone_subtree(self, parent: Link<T>) -> Self
    where
        T: Clone,
    {
        // SAFETY: `self` belongs to a tree the caller borrows.
        let copy = Self::alloc(unsafe { self.value() }.clone(), parent);
        copy.set_color(self.color());
        copy.set_child(
            Side::Left,
            self.left().map(|left| left.clone_subtree(Some(copy))),
        );
        copy.set_child(
            Side::Right,
            self.right().map(|right| right.clone_subtree(Some(copy))),
        );
        copy
    }
}

/// The color of a possibly absent node. Absent nodes are black.
fn color_of<T>(link: Link<T>) -> Color {
    link.map_or(Color::Black, NodeRef::color)
}
