//! Query evaluation.
//!
//! A [`Query`] is first prepared against a whole [`IndexReader`] into a
//! [`Weight`]: index-wide statistics are computed and fuzzy terms expanded
//! once, so every segment scores with the same numbers. A weight then
//! produces, per segment, the matching live documents with their scores in
//! ascending document order, or explains one document's score.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use regex::Regex;

use crate::error::{Result, StrataError};
use crate::index::posting::PostingList;
use crate::index::reader::{IndexReader, SegmentView};
use crate::search::explanation::Explanation;
use crate::search::phrase::{PhraseTerm, min_length, phrase_freq};
use crate::search::query::{Occur, Query};
use crate::search::similarity;
use crate::util::levenshtein::fuzzy_similarity;
use crate::util::numeric::split_range;

/// Matching documents of one segment: `(local doc, score)`, ascending by doc.
pub type SegmentHits = Vec<(u32, f32)>;

/// Which dictionary terms a constant-score query matches.
#[derive(Debug, Clone)]
pub enum TermFilter {
    Prefix(String),
    Wildcard { prefix: String, regex: Regex },
    Range { lower: Bound<String>, upper: Bound<String> },
    /// Inclusive term slices, one per trie level.
    Slices(Vec<(String, String)>),
}

/// One expanded term of a fuzzy query.
#[derive(Debug, Clone)]
pub struct FuzzyTerm {
    pub text: String,
    pub similarity: f32,
    /// Multiplier derived from the similarity.
    pub factor: f32,
    pub idf: f32,
}

/// A query prepared for scoring against one reader.
#[derive(Debug, Clone)]
pub enum Weight {
    Term {
        field: String,
        text: String,
        idf: f32,
        boost: f32,
    },
    Phrase {
        field: String,
        terms: Vec<(u32, String)>,
        slop: u32,
        idf: f32,
        boost: f32,
    },
    Fuzzy {
        field: String,
        terms: Vec<FuzzyTerm>,
        boost: f32,
    },
    ConstantScore {
        field: String,
        filter: TermFilter,
        description: String,
        boost: f32,
    },
    Boolean {
        clauses: Vec<(Occur, Weight)>,
        minimum_should_match: usize,
        boost: f32,
    },
    MatchAll {
        boost: f32,
    },
    Nothing,
}

impl Weight {
    /// Prepare `query` against `reader`.
    pub fn new(query: &Query, reader: &IndexReader) -> Result<Weight> {
        let max_doc = reader.max_doc();
        let weight = match query {
            Query::Term(q) => Weight::Term {
                field: q.term.field.clone(),
                text: q.term.text.clone(),
                idf: similarity::idf(reader.doc_freq(&q.term.field, &q.term.text), max_doc),
                boost: q.boost,
            },
            Query::Phrase(q) => {
                if q.terms.is_empty() {
                    return Ok(Weight::Nothing);
                }
                let idf = q
                    .terms
                    .iter()
                    .map(|(_, term)| similarity::idf(reader.doc_freq(&q.field, term), max_doc))
                    .sum();
                let mut terms = q.terms.clone();
                terms.sort_by_key(|(position, _)| *position);
                Weight::Phrase {
                    field: q.field.clone(),
                    terms,
                    slop: q.slop,
                    idf,
                    boost: q.boost,
                }
            }
            Query::Prefix(q) => Weight::ConstantScore {
                field: q.term.field.clone(),
                filter: TermFilter::Prefix(q.term.text.clone()),
                description: query.to_string(),
                boost: q.boost,
            },
            Query::Wildcard(q) => {
                let regex = Regex::new(&q.to_regex()).map_err(|e| {
                    StrataError::query(format!("invalid wildcard pattern '{}': {e}", q.term.text))
                })?;
                Weight::ConstantScore {
                    field: q.term.field.clone(),
                    filter: TermFilter::Wildcard {
                        prefix: q.literal_prefix(),
                        regex,
                    },
                    description: query.to_string(),
                    boost: q.boost,
                }
            }
            Query::Fuzzy(q) => {
                let min = q.min_similarity;
                if !(0.0..1.0).contains(&min) {
                    return Err(StrataError::query(format!(
                        "fuzzy min_similarity must be in [0, 1), got {min}"
                    )));
                }
                let terms = expand_fuzzy(reader, &q.term.field, &q.term.text, q.prefix_length, min)
                    .into_iter()
                    .take(q.max_expansions)
                    .map(|(text, sim)| FuzzyTerm {
                        idf: similarity::idf(reader.doc_freq(&q.term.field, &text), max_doc),
                        factor: (sim - min) / (1.0 - min),
                        similarity: sim,
                        text,
                    })
                    .collect();
                Weight::Fuzzy {
                    field: q.term.field.clone(),
                    terms,
                    boost: q.boost,
                }
            }
            Query::TermRange(q) => {
                let bound = |value: &Option<String>, inclusive: bool| match value {
                    None => Bound::Unbounded,
                    Some(v) if inclusive => Bound::Included(v.clone()),
                    Some(v) => Bound::Excluded(v.clone()),
                };
                Weight::ConstantScore {
                    field: q.field.clone(),
                    filter: TermFilter::Range {
                        lower: bound(&q.lower, q.include_lower),
                        upper: bound(&q.upper, q.include_upper),
                    },
                    description: query.to_string(),
                    boost: q.boost,
                }
            }
            Query::NumericRange(q) => match q.inclusive_bounds() {
                None => Weight::Nothing,
                Some((lower, upper)) => Weight::ConstantScore {
                    field: q.field.clone(),
                    filter: TermFilter::Slices(split_range(lower, upper, q.precision_step)),
                    description: query.to_string(),
                    boost: q.boost,
                },
            },
            Query::Boolean(q) => {
                if q.clauses.is_empty() {
                    return Ok(Weight::Nothing);
                }
                let clauses = q
                    .clauses
                    .iter()
                    .map(|clause| Ok((clause.occur, Weight::new(&clause.query, reader)?)))
                    .collect::<Result<Vec<_>>>()?;
                Weight::Boolean {
                    clauses,
                    minimum_should_match: q.minimum_should_match,
                    boost: q.boost,
                }
            }
            Query::MatchAll(q) => Weight::MatchAll { boost: q.boost },
        };
        Ok(weight)
    }

    /// Matching live documents of `segment` with their scores.
    pub fn scores(&self, segment: &SegmentView) -> Result<SegmentHits> {
        match self {
            Weight::Term {
                field,
                text,
                idf,
                boost,
            } => {
                let Some(postings) = segment.reader().term_postings(field, text)? else {
                    return Ok(Vec::new());
                };
                Ok(postings
                    .iter()
                    .filter(|p| !segment.is_deleted(p.doc_id))
                    .map(|p| {
                        let norm = similarity::norm(segment.reader().field_length(field, p.doc_id));
                        (p.doc_id, similarity::score(*boost, p.frequency() as f32, *idf, norm))
                    })
                    .collect())
            }
            Weight::Phrase {
                field,
                terms,
                slop,
                idf,
                boost,
            } => {
                let Some(lists) = phrase_postings(segment, field, terms)? else {
                    return Ok(Vec::new());
                };
                let mut hits = Vec::new();
                for doc in intersect(&lists) {
                    if segment.is_deleted(doc) {
                        continue;
                    }
                    let phrase_terms = phrase_terms(terms, &lists, doc);
                    let freq = phrase_freq(&phrase_terms, *slop);
                    if freq > 0.0 {
                        let norm = similarity::norm(segment.reader().field_length(field, doc));
                        hits.push((doc, similarity::score(*boost, freq, *idf, norm)));
                    }
                }
                Ok(hits)
            }
            Weight::Fuzzy {
                field,
                terms,
                boost,
            } => {
                let mut scores: BTreeMap<u32, f32> = BTreeMap::new();
                for term in terms {
                    let Some(postings) = segment.reader().term_postings(field, &term.text)? else {
                        continue;
                    };
                    for p in postings.iter().filter(|p| !segment.is_deleted(p.doc_id)) {
                        let norm = similarity::norm(segment.reader().field_length(field, p.doc_id));
                        let score = similarity::score(
                            *boost * term.factor,
                            p.frequency() as f32,
                            term.idf,
                            norm,
                        );
                        *scores.entry(p.doc_id).or_insert(0.0) += score;
                    }
                }
                Ok(scores.into_iter().collect())
            }
            Weight::ConstantScore {
                field,
                filter,
                boost,
                ..
            } => Ok(matching_docs(segment, field, filter)?
                .into_iter()
                .map(|doc| (doc, *boost))
                .collect()),
            Weight::Boolean {
                clauses,
                minimum_should_match,
                boost,
            } => boolean_scores(segment, clauses, *minimum_should_match, *boost),
            Weight::MatchAll { boost } => Ok((0..segment.max_doc())
                .filter(|&doc| !segment.is_deleted(doc))
                .map(|doc| (doc, *boost))
                .collect()),
            Weight::Nothing => Ok(Vec::new()),
        }
    }

    /// Explain the score of a segment-local document.
    pub fn explain(&self, segment: &SegmentView, doc: u32) -> Result<Explanation> {
        if segment.is_deleted(doc) {
            return Ok(Explanation::no_match("document is deleted"));
        }

        match self {
            Weight::Term {
                field,
                text,
                idf,
                boost,
            } => {
                let freq = segment
                    .reader()
                    .term_postings(field, text)?
                    .and_then(|list| list.find(doc).map(|p| p.frequency()))
                    .unwrap_or(0);
                if freq == 0 {
                    return Ok(Explanation::no_match(format!("no matching term {field}:{text}")));
                }
                Ok(term_explanation(
                    format!("weight({field}:{text})"),
                    *boost,
                    freq as f32,
                    *idf,
                    segment.reader().field_length(field, doc),
                ))
            }
            Weight::Phrase {
                field,
                terms,
                slop,
                idf,
                boost,
            } => {
                let description = phrase_description(field, terms, *slop);
                let Some(lists) = phrase_postings(segment, field, terms)? else {
                    return Ok(Explanation::no_match(format!("no matching phrase {description}")));
                };
                if lists.iter().any(|list| list.find(doc).is_none()) {
                    return Ok(Explanation::no_match(format!("no matching phrase {description}")));
                }
                let phrase_terms = phrase_terms(terms, &lists, doc);
                let freq = phrase_freq(&phrase_terms, *slop);
                if freq == 0.0 {
                    return Ok(Explanation::no_match(format!(
                        "phrase {description} not within slop"
                    )));
                }
                let explanation = term_explanation(
                    format!("weight({description})"),
                    *boost,
                    freq,
                    *idf,
                    segment.reader().field_length(field, doc),
                );
                let length = min_length(&phrase_terms, *slop).unwrap_or(0);
                Ok(explanation.with_detail(Explanation::new(length as f32, "closest match length")))
            }
            Weight::Fuzzy {
                field,
                terms,
                boost,
            } => {
                let mut details = Vec::new();
                let mut sum = 0.0;
                for term in terms {
                    let freq = segment
                        .reader()
                        .term_postings(field, &term.text)?
                        .and_then(|list| list.find(doc).map(|p| p.frequency()))
                        .unwrap_or(0);
                    if freq == 0 {
                        continue;
                    }
                    let detail = term_explanation(
                        format!("weight({field}:{}), similarity {}", term.text, term.similarity),
                        *boost * term.factor,
                        freq as f32,
                        term.idf,
                        segment.reader().field_length(field, doc),
                    );
                    sum += detail.value;
                    details.push(detail);
                }
                if details.is_empty() {
                    return Ok(Explanation::no_match("no matching fuzzy term"));
                }
                Ok(Explanation::new(sum, "sum of fuzzy term scores:").with_details(details))
            }
            Weight::ConstantScore {
                field,
                filter,
                description,
                boost,
            } => {
                if matching_docs(segment, field, filter)?.binary_search(&doc).is_ok() {
                    Ok(Explanation::new(*boost, format!("{description}, constant score"))
                        .with_detail(Explanation::new(*boost, "boost")))
                } else {
                    Ok(Explanation::no_match(format!("no matching term for {description}")))
                }
            }
            Weight::Boolean {
                clauses,
                minimum_should_match,
                boost,
            } => boolean_explain(segment, doc, clauses, *minimum_should_match, *boost),
            Weight::MatchAll { boost } => Ok(Explanation::new(*boost, "*:*, constant score")),
            Weight::Nothing => Ok(Explanation::no_match("query matches nothing")),
        }
    }
}

fn term_explanation(description: String, boost: f32, freq: f32, idf: f32, length: u32) -> Explanation {
    let norm = similarity::norm(length);
    Explanation::new(similarity::score(boost, freq, idf, norm), format!("{description}, product of:"))
        .with_detail(Explanation::new(boost, "boost"))
        .with_detail(Explanation::new(similarity::tf(freq), format!("tf(freq={freq})")))
        .with_detail(Explanation::new(idf, "idf"))
        .with_detail(Explanation::new(norm, format!("fieldNorm(length={length})")))
}

fn phrase_description(field: &str, terms: &[(u32, String)], slop: u32) -> String {
    let words: Vec<&str> = terms.iter().map(|(_, t)| t.as_str()).collect();
    format!("{field}:\"{}\"~{slop}", words.join(" "))
}

/// Postings of every phrase term, or `None` when one is missing.
fn phrase_postings(
    segment: &SegmentView,
    field: &str,
    terms: &[(u32, String)],
) -> Result<Option<Vec<PostingList>>> {
    let mut lists = Vec::with_capacity(terms.len());
    for (_, term) in terms {
        match segment.reader().term_postings(field, term)? {
            Some(list) => lists.push(list),
            None => return Ok(None),
        }
    }
    Ok(Some(lists))
}

fn phrase_terms<'a>(terms: &[(u32, String)], lists: &'a [PostingList], doc: u32) -> Vec<PhraseTerm<'a>> {
    terms
        .iter()
        .zip(lists)
        .enumerate()
        .map(|(i, ((offset, term), list))| PhraseTerm {
            offset: *offset,
            positions: list.find(doc).map_or(&[][..], |p| p.positions.as_slice()),
            group: terms.iter().position(|(_, t)| t == term).unwrap_or(i),
        })
        .collect()
}

/// Documents present in every list, ascending.
fn intersect(lists: &[PostingList]) -> Vec<u32> {
    let Some(shortest) = lists.iter().min_by_key(|list| list.len()) else {
        return Vec::new();
    };
    shortest
        .iter()
        .map(|p| p.doc_id)
        .filter(|&doc| lists.iter().all(|list| list.find(doc).is_some()))
        .collect()
}

/// Live documents containing any term the filter accepts, ascending.
fn matching_docs(segment: &SegmentView, field: &str, filter: &TermFilter) -> Result<Vec<u32>> {
    let Some(dictionary) = segment.reader().field(field) else {
        return Ok(Vec::new());
    };

    let mut infos = Vec::new();
    match filter {
        TermFilter::Prefix(prefix) => infos.extend(dictionary.prefix(prefix).map(|(_, info)| *info)),
        TermFilter::Wildcard { prefix, regex } => infos.extend(
            dictionary
                .prefix(prefix)
                .filter(|(term, _)| regex.is_match(term))
                .map(|(_, info)| *info),
        ),
        TermFilter::Range { lower, upper } => infos.extend(
            dictionary
                .range(bound_ref(lower), bound_ref(upper))
                .map(|(_, info)| *info),
        ),
        TermFilter::Slices(slices) => {
            for (lower, upper) in slices {
                infos.extend(
                    dictionary
                        .range(Bound::Included(lower.as_str()), Bound::Included(upper.as_str()))
                        .map(|(_, info)| *info),
                );
            }
        }
    }

    let mut docs = BTreeSet::new();
    for info in &infos {
        for posting in segment.reader().postings(info)?.iter() {
            if !segment.is_deleted(posting.doc_id) {
                docs.insert(posting.doc_id);
            }
        }
    }
    Ok(docs.into_iter().collect())
}

fn bound_ref(bound: &Bound<String>) -> Bound<&str> {
    match bound {
        Bound::Included(value) => Bound::Included(value.as_str()),
        Bound::Excluded(value) => Bound::Excluded(value.as_str()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// Terms of `field` similar to `text`, most similar first.
fn expand_fuzzy(
    reader: &IndexReader,
    field: &str,
    text: &str,
    prefix_length: usize,
    min_similarity: f32,
) -> Vec<(String, f32)> {
    let prefix: String = text.chars().take(prefix_length).collect();
    let mut candidates: BTreeMap<String, f32> = BTreeMap::new();

    for segment in reader.segments() {
        let Some(dictionary) = segment.reader().field(field) else {
            continue;
        };
        for (term, _) in dictionary.prefix(&prefix) {
            if candidates.contains_key(term) {
                continue;
            }
            let similarity = fuzzy_similarity(text, term, prefix_length);
            if similarity > min_similarity {
                candidates.insert(term.to_string(), similarity);
            }
        }
    }

    let mut expanded: Vec<(String, f32)> = candidates.into_iter().collect();
    expanded.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    expanded
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    must: usize,
    should: usize,
    score: f32,
}

fn boolean_scores(
    segment: &SegmentView,
    clauses: &[(Occur, Weight)],
    minimum_should_match: usize,
    boost: f32,
) -> Result<SegmentHits> {
    let must_count = clauses.iter().filter(|(o, _)| *o == Occur::Must).count();
    let should_count = clauses.iter().filter(|(o, _)| *o == Occur::Should).count();
    let required_should = required_should(must_count, should_count, minimum_should_match);

    let mut excluded = BTreeSet::new();
    let mut docs: BTreeMap<u32, Accumulator> = BTreeMap::new();

    if must_count == 0 && should_count == 0 {
        for doc in (0..segment.max_doc()).filter(|&doc| !segment.is_deleted(doc)) {
            docs.insert(doc, Accumulator::default());
        }
    }

    for (occur, weight) in clauses {
        let hits = weight.scores(segment)?;
        match occur {
            Occur::MustNot => excluded.extend(hits.into_iter().map(|(doc, _)| doc)),
            Occur::Must => {
                for (doc, score) in hits {
                    let acc = docs.entry(doc).or_default();
                    acc.must += 1;
                    acc.score += score;
                }
            }
            Occur::Should => {
                for (doc, score) in hits {
                    let acc = docs.entry(doc).or_default();
                    acc.should += 1;
                    acc.score += score;
                }
            }
        }
    }

    let only_prohibited = must_count == 0 && should_count == 0;
    Ok(docs
        .into_iter()
        .filter(|(doc, acc)| {
            !excluded.contains(doc) && acc.must == must_count && acc.should >= required_should
        })
        .map(|(doc, acc)| {
            let score = if only_prohibited { boost } else { acc.score * boost };
            (doc, score)
        })
        .collect())
}

fn required_should(must_count: usize, should_count: usize, minimum_should_match: usize) -> usize {
    if must_count == 0 && should_count > 0 {
        minimum_should_match.max(1)
    } else {
        minimum_should_match
    }
}

fn boolean_explain(
    segment: &SegmentView,
    doc: u32,
    clauses: &[(Occur, Weight)],
    minimum_should_match: usize,
    boost: f32,
) -> Result<Explanation> {
    let must_count = clauses.iter().filter(|(o, _)| *o == Occur::Must).count();
    let should_count = clauses.iter().filter(|(o, _)| *o == Occur::Should).count();
    let required_should = required_should(must_count, should_count, minimum_should_match);

    let mut details = Vec::new();
    let mut sum = 0.0;
    let mut should_matched = 0;

    for (occur, weight) in clauses {
        let explanation = weight.explain(segment, doc)?;
        match occur {
            Occur::MustNot if explanation.is_match() => {
                return Ok(Explanation::no_match("match on prohibited clause")
                    .with_detail(explanation));
            }
            Occur::MustNot => {}
            Occur::Must if !explanation.is_match() => {
                return Ok(Explanation::no_match("no match on required clause")
                    .with_detail(explanation));
            }
            Occur::Must => {
                sum += explanation.value;
                details.push(explanation);
            }
            Occur::Should => {
                if explanation.is_match() {
                    should_matched += 1;
                    sum += explanation.value;
                    details.push(explanation);
                }
            }
        }
    }

    if should_matched < required_should {
        return Ok(Explanation::no_match(format!(
            "{should_matched} optional clauses matched, {required_should} required"
        ))
        .with_details(details));
    }

    if must_count == 0 && should_count == 0 {
        return Ok(Explanation::new(boost, "only prohibited clauses, constant score"));
    }

    let value = sum * boost;
    let explanation = Explanation::new(value, "sum of:").with_details(details);
    if boost != 1.0 {
        Ok(Explanation::new(value, "product of:")
            .with_detail(Explanation::new(sum, "sum of matching clauses"))
            .with_detail(Explanation::new(boost, "boost"))
            .with_detail(explanation))
    } else {
        Ok(explanation)
    }
}
