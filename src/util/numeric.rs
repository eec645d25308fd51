//! Trie encoding of 64-bit integers for numeric range queries.
//!
//! Each value is indexed once per precision level: the value is made sortable
//! as unsigned by flipping its sign bit, shifted right by `shift` bits, and
//! rendered as a shift marker followed by sixteen hex digits. Terms at the
//! same shift therefore sort in numeric order, and a range can be covered by
//! a handful of contiguous dictionary slices instead of one term per value.

/// Precision step used when none is configured.
pub const DEFAULT_PRECISION_STEP: u32 = 4;

const SHIFT_MARKER_BASE: u32 = 0x20;

/// Map a signed value onto an unsigned value with the same ordering.
#[inline]
pub fn to_sortable(value: i64) -> u64 {
    (value as u64) ^ (1u64 << 63)
}

/// Encode an already-sortable value at the given shift.
pub fn encode_sortable(sortable: u64, shift: u32) -> String {
    let marker = char::from_u32(SHIFT_MARKER_BASE + shift).unwrap_or(' ');
    let shifted = if shift >= 64 { 0 } else { sortable >> shift };
    format!("{marker}{shifted:016x}")
}

/// Encode a value at the given shift.
pub fn encode_i64(value: i64, shift: u32) -> String {
    encode_sortable(to_sortable(value), shift)
}

/// All terms indexed for one value.
pub fn trie_terms(value: i64, precision_step: u32) -> Vec<String> {
    let step = precision_step.clamp(1, 64);
    (0..64)
        .step_by(step as usize)
        .map(|shift| encode_i64(value, shift))
        .collect()
}

/// Split the inclusive range `[lower, upper]` into per-shift term ranges.
///
/// Each returned pair is an inclusive `(lower_term, upper_term)` slice of the
/// dictionary. Returns an empty list when `lower > upper`.
pub fn split_range(lower: i64, upper: i64, precision_step: u32) -> Vec<(String, String)> {
    let mut ranges = Vec::new();
    if lower > upper {
        return ranges;
    }

    let step = precision_step.clamp(1, 64);
    let mut min = to_sortable(lower);
    let mut max = to_sortable(upper);
    let mut shift = 0u32;

    loop {
        if shift + step >= 64 {
            ranges.push((encode_sortable(min, shift), encode_sortable(max, shift)));
            break;
        }

        let diff = 1u64 << (shift + step);
        let mask = ((1u64 << step) - 1) << shift;
        let has_lower = min & mask != 0;
        let has_upper = max & mask != mask;
        let next_min = (if has_lower { min.wrapping_add(diff) } else { min }) & !mask;
        let next_max = (if has_upper { max.wrapping_sub(diff) } else { max }) & !mask;
        let lower_wrapped = next_min < min;
        let upper_wrapped = next_max > max;

        if next_min > next_max || lower_wrapped || upper_wrapped {
            // The rest of the range fits at this precision.
            ranges.push((encode_sortable(min, shift), encode_sortable(max, shift)));
            break;
        }

        if has_lower {
            ranges.push((encode_sortable(min, shift), encode_sortable(min | mask, shift)));
        }
        if has_upper {
            ranges.push((encode_sortable(max & !mask, shift), encode_sortable(max, shift)));
        }

        min = next_min;
        max = next_max;
        shift += step;
    }

    ranges
}
