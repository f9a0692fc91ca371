//! Single-line slide/merge resolution.
//!
//! # Invariants
//! - Every tile participates in at most one merge per call.
//! - The output has the same length as the input.
//! - Score is accumulated per merge, after multiplier scaling.

/// Result of resolving one row or column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineResolution {
    pub cells: Vec<u32>,
    pub score_delta: u64,
    pub changed: bool,
}

/// Slides `line` toward index 0 (or toward the end when `reverse` is set),
/// merging equal neighbours pairwise.
pub fn resolve_line(line: &[u32], reverse: bool, multiplier: f64) -> LineResolution {
    let mut oriented: Vec<u32> = line.to_vec();
    if reverse {
        oriented.reverse();
    }

    let compacted: Vec<u32> = oriented.into_iter().filter(|value| *value != 0).collect();
    let mut merged = Vec::with_capacity(line.len());
    let mut score_delta = 0u64;
    let mut index = 0;
    while index < compacted.len() {
        let current = compacted[index];
        if compacted.get(index + 1) == Some(&current) {
            let sum = current.saturating_mul(2);
            merged.push(sum);
            score_delta = score_delta.saturating_add(scaled_points(sum, multiplier));
            index += 2;
        } else {
            merged.push(current);
            index += 1;
        }
    }
    merged.resize(line.len(), 0);
    if reverse {
        merged.reverse();
    }

    let changed = merged.as_slice() != line;
    LineResolution {
        cells: merged,
        score_delta,
        changed,
    }
}

/// Points credited for one merge: `sum * multiplier`, rounded half away
/// from zero.
pub fn scaled_points(sum: u32, multiplier: f64) -> u64 {
    let scaled = (f64::from(sum) * multiplier).round();
    if scaled.is_finite() && scaled > 0.0 {
        // `as` saturates at u64::MAX for out-of-range floats.
        scaled as u64
    } else {
        0
    }
}
