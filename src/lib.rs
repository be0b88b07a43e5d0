//! This crate exposes an ordered set built on a red-black tree.
//!
//! ## Red-Black Tree
//!
//! A red-black tree is a Binary Search Tree (BST) that keeps itself balanced. Like any BST it
//! stores `Node`s such that:
//!
//! 1. For every `Node`, all the `Node`s in its left subtree have a value less than its own value.
//! 2. For every `Node`, all the `Node`s in its right subtree have a value greater than its own
//!    value.
//!
//! On top of that each `Node` is labelled red or black and the tree maintains:
//!
//! 3. The root is black.
//! 4. A red `Node` never has a red child.
//! 5. Every path from a `Node` down to an absent child passes through the same number of black
//!    `Node`s (its "black height"). Absent children count as black.
//!
//! Together these keep the longest root-to-leaf path at most twice as long as the shortest, so
//! the height is `O(lg N)` where `N` is the number of nodes in the tree. Inserts and removals
//! restore the properties with a bounded number of recolorings and rotations on the way back up
//! from where the tree changed.
//!
//! > Inserting a value that's already present is a no-op; the tree is a set, not a multiset.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod red_black;

#[cfg(test)]
mod test;
