//! TF-IDF scoring.
//!
//! `score = boost * sqrt(freq) * idf * norm`, with
//! `idf = 1 + ln(max_doc / (doc_freq + 1))` and `norm = 1 / sqrt(field_length)`.

/// Inverse document frequency.
pub fn idf(doc_freq: u32, max_doc: u32) -> f32 {
    1.0 + (max_doc as f32 / (doc_freq as f32 + 1.0)).ln()
}

/// Term-frequency factor.
pub fn tf(freq: f32) -> f32 {
    freq.sqrt()
}

/// Length normalization; an empty field counts as length one.
pub fn norm(field_length: u32) -> f32 {
    1.0 / (field_length.max(1) as f32).sqrt()
}

/// Combined score of one term (or phrase) in one document.
pub fn score(boost: f32, freq: f32, idf: f32, norm: f32) -> f32 {
    boost * tf(freq) * idf * norm
}
