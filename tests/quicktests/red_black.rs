use rbtree::red_black::{Color, Tree};

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use std::collections::HashSet;

use crate::Op;

/// Applies a set of operations to a tree and a hashset.
/// This way we can ensure that after a random smattering of inserts
/// and removes we have the same set of values in both.
fn do_ops<T>(ops: &[Op<T>], tree: &mut Tree<T>, set: &mut HashSet<T>)
where
    T: std::hash::Hash + Eq + Clone + Ord,
{
    for op in ops {
        match op {
            Op::Insert(x) => {
                tree.insert(x.clone());
                set.insert(x.clone());
            }
            Op::Remove(x) => {
                tree.remove(x);
                set.remove(x);
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::new();
    let mut set = HashSet::new();

    do_ops(&ops, &mut tree, &mut set);
    tree.validate().is_ok()
        && tree.len() == set.len()
        && (i8::MIN..=i8::MAX).all(|x| tree.contains(&x) == set.contains(&x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| !tree.contains(x))
}

#[quickcheck]
fn with_removals(xs: Vec<i8>, removes: Vec<i8>) -> bool {
    let mut tree: Tree<_> = xs.iter().copied().collect();
    for remove in &removes {
        tree.remove(remove);
    }

    let still_present: HashSet<_> = xs.iter().filter(|x| !removes.contains(x)).collect();

    tree.validate().is_ok()
        && removes.iter().all(|x| !tree.contains(x))
        && still_present.iter().all(|x| tree.contains(x))
        && tree.len() == still_present.len()
}

#[quickcheck]
fn duplicate_inserts_change_nothing(xs: Vec<i16>) -> bool {
    let once: Tree<_> = xs.iter().copied().collect();
    let mut twice = once.clone();
    let reinserted = xs.iter().filter(|x| twice.insert(**x)).count();

    reinserted == 0
        && twice.len() == once.len()
        && twice.enumerate_sorted() == once.enumerate_sorted()
}

#[quickcheck]
fn remove_everything_in_any_order(xs: HashSet<i32>, seed: u64) -> TestResult {
    if xs.is_empty() {
        return TestResult::discard();
    }
    let mut tree: Tree<_> = xs.iter().copied().collect();

    // A cheap deterministic shuffle keyed on `seed` so the removal order differs from
    // the insertion order.
    let mut order: Vec<_> = xs.into_iter().collect();
    order.sort_by_key(|x| (*x as u64).wrapping_mul(seed | 1).rotate_left(17));

    for x in &order {
        if !tree.remove(x) || tree.validate().is_err() {
            return TestResult::failed();
        }
    }
    TestResult::from_bool(tree.is_empty() && tree.snapshot().is_none())
}

#[quickcheck]
fn root_is_black(xs: Vec<u8>) -> bool {
    let tree: Tree<_> = xs.into_iter().collect();

    tree.snapshot().map_or(true, |root| root.color == Color::Black)
}
