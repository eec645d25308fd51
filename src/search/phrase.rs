//! Positional phrase matching with slop.
//!
//! For a choice of one position per phrase term, the match length is
//! `max(pos_i - offset_i) - min(pos_i - offset_i)`, where `offset_i` is the
//! term's position within the phrase. An exact phrase has length 0; each
//! term out of place adds its displacement. For every position of the first
//! term the minimum length over all choices is computed; anchors whose
//! minimum is within the slop contribute `1 / (1 + length)` to the phrase
//! frequency. Repeated terms must take distinct positions.

/// Positions of one phrase term in one document.
#[derive(Debug, Clone, Copy)]
pub struct PhraseTerm<'a> {
    /// Relative position in the phrase.
    pub offset: u32,
    /// Ascending positions in the document.
    pub positions: &'a [u32],
    /// Terms sharing a group id are the same term.
    pub group: usize,
}

/// Sloppy phrase frequency; 0 when the phrase does not occur.
pub fn phrase_freq(terms: &[PhraseTerm<'_>], slop: u32) -> f32 {
    let Some(first) = terms.first() else {
        return 0.0;
    };

    let mut freq = 0.0;
    let mut chosen = Vec::with_capacity(terms.len());
    for &anchor in first.positions {
        let shifted = anchor as i64 - first.offset as i64;
        chosen.clear();
        chosen.push(anchor);
        let mut best = None;
        search(terms, 1, shifted, shifted, slop as i64, &mut chosen, &mut best);
        if let Some(length) = best {
            freq += 1.0 / (1.0 + length as f32);
        }
    }
    freq
}

/// Shortest match length over all anchors; used by explanations.
pub fn min_length(terms: &[PhraseTerm<'_>], slop: u32) -> Option<u32> {
    let first = terms.first()?;
    let mut chosen = Vec::with_capacity(terms.len());
    let mut overall: Option<i64> = None;
    for &anchor in first.positions {
        let shifted = anchor as i64 - first.offset as i64;
        chosen.clear();
        chosen.push(anchor);
        let mut best = None;
        search(terms, 1, shifted, shifted, slop as i64, &mut chosen, &mut best);
        if let Some(length) = best {
            overall = Some(overall.map_or(length, |o: i64| o.min(length)));
        }
    }
    overall.map(|length| length as u32)
}

fn search(
    terms: &[PhraseTerm<'_>],
    idx: usize,
    low: i64,
    high: i64,
    slop: i64,
    chosen: &mut Vec<u32>,
    best: &mut Option<i64>,
) {
    let limit = best.map_or(slop, |b| b.min(slop));
    if high - low > limit || (best.is_some() && high - low >= limit) {
        return;
    }
    if idx == terms.len() {
        *best = Some(high - low);
        return;
    }

    let term = terms[idx];
    let offset = term.offset as i64;
    // Shifted position d must keep max(high, d) - min(low, d) within the limit.
    let min_position = (high - limit + offset).max(0);
    let max_position = low + limit + offset;
    let start = term.positions.partition_point(|&p| (p as i64) < min_position);

    for &position in &term.positions[start..] {
        if position as i64 > max_position {
            break;
        }
        let reused = terms[..idx]
            .iter()
            .zip(chosen.iter())
            .any(|(other, &taken)| other.group == term.group && taken == position);
        if reused {
            continue;
        }

        let shifted = position as i64 - offset;
        chosen.push(position);
        search(terms, idx + 1, low.min(shifted), high.max(shifted), slop, chosen, best);
        chosen.pop();
        if *best == Some(0) {
            return;
        }
    }
}
