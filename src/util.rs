//! Shared utility modules used across Strata components.

pub mod levenshtein;
pub mod numeric;
pub mod varint;
