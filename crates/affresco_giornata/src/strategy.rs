//! Children diffing strategies.
//!
//! A strategy is a pure planner: given the previous and next child arrays it
//! produces an ordered op list, and an executor elsewhere applies the ops
//! with the mount/patch/unmount primitives. Keeping the planner free of host
//! access makes every strategy testable as plain data in, plain data out.

use affresco_cartone::VNode;
use compact_str::CompactString;
use rustc_hash::FxHashMap;

/// One planned child operation.
///
/// Indices point into the previous (`prev`) or next (`next`) child array.
/// An `anchor` is the next-array index of the sibling to insert before;
/// `None` appends. Ops are emitted in application order, and every anchor
/// refers to a next-array node whose host is realized by the time the op
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOp {
    /// Recursively patch `prev` into `next` (same identity).
    Patch { prev: usize, next: usize },
    /// Mount `next` fresh before `anchor`.
    Mount { next: usize, anchor: Option<usize> },
    /// Unmount `prev` entirely.
    Unmount { prev: usize },
    /// Re-insert the already-patched `next` before `anchor` (host move,
    /// no remount).
    Move { next: usize, anchor: Option<usize> },
}

/// An ordered list of child operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildPlan {
    pub ops: Vec<ChildOp>,
}

/// Plans how one child array becomes another.
pub trait DiffStrategy {
    fn plan(&self, prev: &[VNode], next: &[VNode]) -> ChildPlan;
}

/// The naive baseline: unmount every previous child, mount every next child.
///
/// O(n) removals plus O(n) fresh mounts on every array update, no reuse, no
/// identity matching. Kept as the reference behavior and as the regression
/// baseline for [`KeyedDiff`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FullReplace;

impl DiffStrategy for FullReplace {
    fn plan(&self, prev: &[VNode], next: &[VNode]) -> ChildPlan {
        let mut ops = Vec::with_capacity(prev.len() + next.len());
        for index in 0..prev.len() {
            ops.push(ChildOp::Unmount { prev: index });
        }
        for index in 0..next.len() {
            ops.push(ChildOp::Mount {
                next: index,
                anchor: None,
            });
        }
        ChildPlan { ops }
    }
}

/// Identity-matching reconciliation with move minimization.
///
/// Children matching by identity (key plus kind, or position plus kind when
/// unkeyed) are patched in place; the unmatched old are unmounted, the
/// unmatched new mounted at their position. Host moves are minimized by
/// keeping the longest increasing subsequence of matched old indices
/// stationary and moving only the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedDiff;

impl DiffStrategy for KeyedDiff {
    fn plan(&self, prev: &[VNode], next: &[VNode]) -> ChildPlan {
        let mut ops = Vec::new();
        let mut start = 0usize;
        let mut prev_end = prev.len();
        let mut next_end = next.len();

        // Sync from the start while identities line up.
        while start < prev_end && start < next_end && prev[start].same_ident(&next[start]) {
            ops.push(ChildOp::Patch {
                prev: start,
                next: start,
            });
            start += 1;
        }
        // Sync from the end likewise.
        while prev_end > start && next_end > start && prev[prev_end - 1].same_ident(&next[next_end - 1])
        {
            prev_end -= 1;
            next_end -= 1;
            ops.push(ChildOp::Patch {
                prev: prev_end,
                next: next_end,
            });
        }

        if start == prev_end {
            // Only additions remain.
            let anchor = if next_end < next.len() {
                Some(next_end)
            } else {
                None
            };
            for index in start..next_end {
                ops.push(ChildOp::Mount {
                    next: index,
                    anchor,
                });
            }
        } else if start == next_end {
            // Only removals remain.
            for index in start..prev_end {
                ops.push(ChildOp::Unmount { prev: index });
            }
        } else {
            self.plan_middle(prev, next, start, prev_end, next_end, &mut ops);
        }

        ChildPlan { ops }
    }
}

impl KeyedDiff {
    /// The unordered middle: match by key (or by kind and position for
    /// unkeyed nodes), patch matches, unmount leftovers, then walk the new
    /// middle backwards mounting the unmatched and moving whatever fell off
    /// the longest increasing subsequence of matched old indices.
    fn plan_middle(
        &self,
        prev: &[VNode],
        next: &[VNode],
        start: usize,
        prev_end: usize,
        next_end: usize,
        ops: &mut Vec<ChildOp>,
    ) {
        let count = next_end - start;
        let mut key_to_next: FxHashMap<&CompactString, usize> = FxHashMap::default();
        for index in start..next_end {
            if let Some(key) = &next[index].key {
                key_to_next.insert(key, index);
            }
        }

        // next-middle offset -> matched prev index
        let mut next_to_prev: Vec<Option<usize>> = vec![None; count];
        let mut max_next_so_far = 0usize;
        let mut moved = false;

        for prev_index in start..prev_end {
            let node = &prev[prev_index];
            let matched = match &node.key {
                Some(key) => key_to_next
                    .get(key)
                    .copied()
                    .filter(|next_index| node.same_ident(&next[*next_index])),
                None => (start..next_end).find(|next_index| {
                    next_to_prev[next_index - start].is_none()
                        && next[*next_index].key.is_none()
                        && node.same_ident(&next[*next_index])
                }),
            };
            match matched {
                None => ops.push(ChildOp::Unmount { prev: prev_index }),
                Some(next_index) => {
                    next_to_prev[next_index - start] = Some(prev_index);
                    if next_index >= max_next_so_far {
                        max_next_so_far = next_index;
                    } else {
                        moved = true;
                    }
                    ops.push(ChildOp::Patch {
                        prev: prev_index,
                        next: next_index,
                    });
                }
            }
        }

        let stable = if moved {
            longest_increasing_subsequence(&next_to_prev)
        } else {
            Vec::new()
        };
        let mut stable_tail = stable.len();

        for offset in (0..count).rev() {
            let next_index = start + offset;
            let anchor = if next_index + 1 < next.len() {
                Some(next_index + 1)
            } else {
                None
            };
            match next_to_prev[offset] {
                None => ops.push(ChildOp::Mount {
                    next: next_index,
                    anchor,
                }),
                Some(_) if moved => {
                    if stable_tail > 0 && stable[stable_tail - 1] == offset {
                        stable_tail -= 1;
                    } else {
                        ops.push(ChildOp::Move {
                            next: next_index,
                            anchor,
                        });
                    }
                }
                Some(_) => {}
            }
        }
    }
}

/// Positions of the longest strictly increasing run of `Some` values.
fn longest_increasing_subsequence(sequence: &[Option<usize>]) -> Vec<usize> {
    let entries: Vec<(usize, usize)> = sequence
        .iter()
        .enumerate()
        .filter_map(|(position, value)| value.map(|v| (position, v)))
        .collect();

    // tails[k] = entry index holding the smallest tail value of any
    // increasing subsequence of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessor: Vec<Option<usize>> = vec![None; entries.len()];

    for (entry_index, &(_, value)) in entries.iter().enumerate() {
        let mut low = 0;
        let mut high = tails.len();
        while low < high {
            let mid = (low + high) / 2;
            if entries[tails[mid]].1 < value {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        if low > 0 {
            predecessor[entry_index] = Some(tails[low - 1]);
        }
        if low == tails.len() {
            tails.push(entry_index);
        } else {
            tails[low] = entry_index;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut current = tails.last().copied();
    while let Some(entry_index) = current {
        result.push(entries[entry_index].0);
        current = predecessor[entry_index];
    }
    result.reverse();
    result
}
