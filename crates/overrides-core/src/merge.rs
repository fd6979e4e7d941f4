//! Three-way merge seam and a line-based implementation
//!
//! The upgrade engine only depends on [`ThreeWayMerge`]. [`LineMerge`] is a
//! diff3-style merger over lines, built on the Myers diff from `similar`.

use std::ops::Range;

use similar::{Algorithm, DiffTag, capture_diff_slices};

/// Result of merging two descendants of a common base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub content: Vec<u8>,
    pub has_conflicts: bool,
}

impl MergeOutcome {
    pub fn clean(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            has_conflicts: false,
        }
    }
}

/// Merges the local change (`ours`, derived from `old_base`) with the
/// upstream change (`old_base` to `new_base`)
pub trait ThreeWayMerge: Send + Sync {
    fn merge(&self, old_base: &[u8], new_base: &[u8], ours: &[u8]) -> MergeOutcome;
}

/// Line-oriented merge with conflict markers
///
/// Changes from both sides that overlap or touch the same base lines
/// conflict unless they are identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineMerge;

impl LineMerge {
    pub fn new() -> Self {
        Self
    }
}

const OURS_MARKER: &str = "<<<<<<< override";
const SEPARATOR: &str = "=======";
const THEIRS_MARKER: &str = ">>>>>>> upstream";

/// A changed region: `base` lines replaced by `side` lines
#[derive(Debug, Clone)]
struct Hunk {
    base: Range<usize>,
    side: Range<usize>,
}

fn lines(content: &[u8]) -> Vec<&[u8]> {
    content.split_inclusive(|b| *b == b'\n').collect()
}

fn hunks(base: &[&[u8]], side: &[&[u8]]) -> Vec<Hunk> {
    let mut out: Vec<Hunk> = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, base, side) {
        let (tag, old, new) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.base.end == old.start && last.side.end == new.start => {
                last.base.end = old.end;
                last.side.end = new.end;
            }
            _ => out.push(Hunk {
                base: old,
                side: new,
            }),
        }
    }
    out
}

/// Lines of one side covering base lines `start..end`
///
/// Base lines outside the cluster's hunks are unchanged on that side.
fn side_text<'a>(
    cluster: &[Hunk],
    base: &[&'a [u8]],
    side: &[&'a [u8]],
    start: usize,
    end: usize,
) -> Vec<&'a [u8]> {
    let mut text = Vec::new();
    let mut cursor = start;
    for hunk in cluster {
        text.extend_from_slice(&base[cursor..hunk.base.start]);
        text.extend_from_slice(&side[hunk.side.clone()]);
        cursor = hunk.base.end;
    }
    text.extend_from_slice(&base[cursor..end]);
    text
}

fn push_lines(out: &mut Vec<u8>, lines: &[&[u8]]) {
    for line in lines {
        out.extend_from_slice(line);
    }
}

fn push_marker(out: &mut Vec<u8>, marker: &str) {
    if out.last().is_some_and(|b| *b != b'\n') {
        out.push(b'\n');
    }
    out.extend_from_slice(marker.as_bytes());
    out.push(b'\n');
}

impl ThreeWayMerge for LineMerge {
    fn merge(&self, old_base: &[u8], new_base: &[u8], ours: &[u8]) -> MergeOutcome {
        if ours == old_base {
            return MergeOutcome::clean(new_base);
        }
        if new_base == old_base || new_base == ours {
            return MergeOutcome::clean(ours);
        }

        let base = lines(old_base);
        let local = lines(ours);
        let remote = lines(new_base);
        let local_hunks = hunks(&base, &local);
        let remote_hunks = hunks(&base, &remote);

        let mut out = Vec::with_capacity(ours.len().max(new_base.len()));
        let mut has_conflicts = false;
        let (mut i, mut j, mut pos) = (0, 0, 0);

        loop {
            let start = match (local_hunks.get(i), remote_hunks.get(j)) {
                (None, None) => break,
                (Some(a), None) => a.base.start,
                (None, Some(b)) => b.base.start,
                (Some(a), Some(b)) => a.base.start.min(b.base.start),
            };
            push_lines(&mut out, &base[pos..start]);

            // Grow the cluster until no hunk from either side touches it
            let (first_local, first_remote) = (i, j);
            let mut end = start;
            loop {
                let mut grew = false;
                if let Some(h) = local_hunks.get(i)
                    && h.base.start <= end
                {
                    end = end.max(h.base.end);
                    i += 1;
                    grew = true;
                }
                if let Some(h) = remote_hunks.get(j)
                    && h.base.start <= end
                {
                    end = end.max(h.base.end);
                    j += 1;
                    grew = true;
                }
                if !grew {
                    break;
                }
            }

            let local_cluster = &local_hunks[first_local..i];
            let remote_cluster = &remote_hunks[first_remote..j];
            let local_text = side_text(local_cluster, &base, &local, start, end);
            let remote_text = side_text(remote_cluster, &base, &remote, start, end);

            if remote_cluster.is_empty() || local_text == remote_text {
                push_lines(&mut out, &local_text);
            } else if local_cluster.is_empty() {
                push_lines(&mut out, &remote_text);
            } else {
                has_conflicts = true;
                push_marker(&mut out, OURS_MARKER);
                push_lines(&mut out, &local_text);
                push_marker(&mut out, SEPARATOR);
                push_lines(&mut out, &remote_text);
                push_marker(&mut out, THEIRS_MARKER);
            }
            pos = end;
        }
        push_lines(&mut out, &base[pos..]);

        MergeOutcome {
            content: out,
            has_conflicts,
        }
    }
}
