//! Eager traces for structural mutation.
//!
//! These run the operation against the live model immediately and return a
//! [`Recording`] of what happened. The mutation is committed at that point;
//! cancelling playback of the recording does not undo it.

use algoviz_model::{Bst, Descent, Heap, Sift, SkipList, SkipReport, TreeOutcome};
use tracing::debug;

use crate::recording::{Recorder, Recording};
use crate::step::{Outcome, Step};

fn descend(recorder: &mut Recorder, descent: &Descent) {
    for (depth, &key) in descent.path.iter().enumerate() {
        recorder.record(|frame| Step::Visit {
            key,
            depth,
            target: descent.key,
            frame,
        });
    }
}

fn tree_recording(descent: Descent) -> Recording {
    let mut recorder = Recorder::new();
    descend(&mut recorder, &descent);
    if let TreeOutcome::Deleted(removal) = descent.outcome {
        recorder.record(|frame| Step::Splice {
            key: descent.key,
            removal,
            frame,
        });
    }
    debug!(
        key = descent.key,
        outcome = ?descent.outcome,
        hops = descent.path.len(),
        "tree trace recorded"
    );
    recorder.finish(Outcome::Tree {
        key: descent.key,
        outcome: descent.outcome,
    })
}

/// Insert `key`, one step per node on the way down.
///
/// The new node is the last step on success. A duplicate ends at the equal
/// node and leaves the tree unchanged.
pub fn tree_insert(tree: &mut Bst, key: i64) -> Recording {
    tree_recording(tree.insert(key))
}

pub fn tree_search(tree: &Bst, key: i64) -> Recording {
    tree_recording(tree.search(key))
}

/// Delete `key`. A found key adds a final [`Step::Splice`] naming how the
/// node was removed.
pub fn tree_delete(tree: &mut Bst, key: i64) -> Recording {
    tree_recording(tree.delete(key))
}

fn sift(recorder: &mut Recorder, sift: &Sift) {
    if let Some(&value) = sift.initial.get(sift.placed) {
        recorder.record(|frame| Step::Place {
            index: sift.placed,
            value,
            heap: sift.initial.clone(),
            frame,
        });
    }
    for swap in &sift.swaps {
        recorder.record(|frame| Step::Swap {
            from: swap.from,
            to: swap.to,
            heap: swap.snapshot.clone(),
            frame,
        });
    }
}

/// Append `value` and sift it up: a placement step, then one step per swap.
pub fn heap_insert(heap: &mut Heap, value: i64) -> Recording {
    let result = heap.insert(value);
    let mut recorder = Recorder::new();
    sift(&mut recorder, &result);
    debug!(value, swaps = result.swaps.len(), "heap insert recorded");
    recorder.finish(Outcome::HeapInserted {
        value,
        index: result.settled(),
    })
}

/// Remove the root: the last value is placed at the root, then sifted down.
///
/// An empty heap yields no steps and [`Outcome::HeapEmpty`]. Removing the
/// only value yields no steps either, since nothing moves.
pub fn heap_remove_root(heap: &mut Heap) -> Recording {
    let mut recorder = Recorder::new();
    match heap.remove_root() {
        Some(removed) => {
            sift(&mut recorder, &removed.sift);
            debug!(root = removed.root, swaps = removed.sift.swaps.len(), "heap removal recorded");
            recorder.finish(Outcome::RootRemoved {
                value: removed.root,
            })
        }
        None => recorder.finish(Outcome::HeapEmpty),
    }
}

/// Convert a skip-list report into a trace of descent steps.
pub fn skip_list_trace(report: &SkipReport) -> Recording {
    let mut recorder = Recorder::new();
    for &hop in &report.path {
        recorder.record(|frame| Step::advance(hop, report.value, frame));
    }
    recorder.finish(Outcome::SkipList {
        value: report.value,
        outcome: report.outcome,
    })
}

pub fn skip_insert(list: &mut SkipList, value: i64) -> Recording {
    skip_list_trace(&list.insert(value))
}

pub fn skip_search(list: &SkipList, value: i64) -> Recording {
    skip_list_trace(&list.search(value))
}

pub fn skip_delete(list: &mut SkipList, value: i64) -> Recording {
    skip_list_trace(&list.delete(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Status, StepKind};
    use algoviz_model::{HeapType, Key, Removal, SkipOutcome, SEED_KEYS, SEED_VALUES};
    use proptest::prelude::*;

    #[test]
    fn tree_insert_visits_path_then_new_node() {
        let mut tree = Bst::from_keys([5, 3, 7]);
        let recording = tree_insert(&mut tree, 4);
        let keys: Vec<i64> = recording
            .steps()
            .iter()
            .map(|s| match s {
                Step::Visit { key, .. } => *key,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(keys, vec![5, 3, 4]);
        assert_eq!(recording.outcome().status(), Status::Found);
        assert!(tree.contains(4));
    }

    #[test]
    fn deleting_leaf_ends_with_splice() {
        let mut tree = Bst::from_keys([5, 3, 7]);
        let recording = tree_delete(&mut tree, 3);
        assert_eq!(
            recording.steps().last(),
            Some(&Step::Splice {
                key: 3,
                removal: Removal::Leaf,
                frame: 2,
            })
        );
        assert_eq!(tree_search(&tree, 3).outcome().status(), Status::NotFound);
        assert!(tree.root().and_then(|r| r.left()).is_none());
    }

    #[test]
    fn deleting_two_child_node_names_successor() {
        let mut tree = Bst::from_keys(SEED_KEYS);
        let recording = tree_delete(&mut tree, 50);
        match recording.steps().last() {
            Some(Step::Splice { key, removal, .. }) => {
                assert_eq!(*key, 50);
                assert_eq!(*removal, Removal::Replaced { successor: 60 });
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(tree.root().map(|r| r.key()), Some(60));
    }

    #[test]
    fn missing_delete_has_no_splice() {
        let mut tree = Bst::from_keys([5, 3, 7]);
        let recording = tree_delete(&mut tree, 6);
        assert!(recording.steps().iter().all(|s| s.kind() == StepKind::Visit));
        assert_eq!(recording.outcome().status(), Status::NotFound);
    }

    #[test]
    fn heap_insert_places_then_swaps() {
        let mut heap = Heap::from_values(HeapType::Max, [50, 30, 20]);
        let recording = heap_insert(&mut heap, 60);
        let kinds: Vec<StepKind> = recording.steps().iter().map(Step::kind).collect();
        assert_eq!(kinds, vec![StepKind::Place, StepKind::Swap, StepKind::Swap]);
        assert_eq!(recording.steps()[0].heap(), Some(&[50, 30, 20, 60][..]));
        assert_eq!(
            recording.outcome(),
            &Outcome::HeapInserted { value: 60, index: 0 }
        );
    }

    #[test]
    fn seed_heap_removal_reports_300() {
        let mut heap = Heap::from_values(HeapType::Max, SEED_VALUES);
        let recording = heap_remove_root(&mut heap);
        assert_eq!(recording.outcome().value(), Some(300));
        assert_eq!(recording.steps()[0].kind(), StepKind::Place);
        let last = recording.steps().last().and_then(Step::heap).unwrap();
        assert_eq!(last, heap.as_slice());
    }

    #[test]
    fn empty_heap_removal_is_not_found() {
        let mut heap = Heap::new(HeapType::Min);
        let recording = heap_remove_root(&mut heap);
        assert!(recording.is_empty());
        assert_eq!(recording.outcome(), &Outcome::HeapEmpty);
    }

    #[test]
    fn single_value_removal_empties_heap() {
        let mut heap = Heap::from_values(HeapType::Max, [9]);
        let recording = heap_remove_root(&mut heap);
        assert!(recording.is_empty());
        assert_eq!(recording.outcome().value(), Some(9));
        assert!(heap.is_empty());
    }

    #[test]
    fn skip_list_trace_follows_hops() {
        let mut list = SkipList::with_seed(4, 2, 3).unwrap();
        for v in [10, 20, 30] {
            skip_insert(&mut list, v);
        }
        let recording = skip_search(&list, 20);
        assert_eq!(recording.outcome().status(), Status::Found);
        assert!(!recording.is_empty());
        match recording.steps()[0] {
            Step::Advance { key, target, .. } => {
                assert_eq!(key, Key::NegInf);
                assert_eq!(target, 20);
            }
            ref other => panic!("unexpected {other:?}"),
        }

        let duplicate = skip_insert(&mut list, 20);
        assert_eq!(
            duplicate.outcome(),
            &Outcome::SkipList {
                value: 20,
                outcome: SkipOutcome::Duplicate
            }
        );
        skip_delete(&mut list, 20);
        assert_eq!(skip_search(&list, 20).outcome().status(), Status::NotFound);
    }

    proptest! {
        #[test]
        fn bst_trace_agrees_with_tree(
            keys in proptest::collection::vec(-50i64..50, 0..40),
            removed in proptest::collection::vec(-50i64..50, 0..20),
        ) {
            let mut tree = Bst::new();
            for &k in &keys {
                tree_insert(&mut tree, k);
            }
            for &k in &removed {
                tree_delete(&mut tree, k);
            }
            for k in -50i64..50 {
                let expected = keys.contains(&k) && !removed.contains(&k);
                let found = tree_search(&tree, k).outcome().status() == Status::Found;
                prop_assert_eq!(found, expected);
            }
        }
    }
}
