//! The query model.
//!
//! [`Query`] is a closed enum; evaluation matches on the variant. Each variant
//! wraps a small struct with a builder-style API and a boost.

use std::fmt;

use crate::index::Term;
use crate::util::numeric::DEFAULT_PRECISION_STEP;

/// Default minimum similarity of [`FuzzyQuery`].
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.5;
/// Default number of terms a [`FuzzyQuery`] expands to.
pub const DEFAULT_MAX_EXPANSIONS: usize = 50;

/// A search query.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Term(TermQuery),
    Phrase(PhraseQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Fuzzy(FuzzyQuery),
    TermRange(TermRangeQuery),
    NumericRange(NumericRangeQuery),
    Boolean(BooleanQuery),
    MatchAll(MatchAllQuery),
}

impl Query {
    pub fn term<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        Query::Term(TermQuery::new(field, text))
    }

    pub fn boost(&self) -> f32 {
        match self {
            Query::Term(q) => q.boost,
            Query::Phrase(q) => q.boost,
            Query::Prefix(q) => q.boost,
            Query::Wildcard(q) => q.boost,
            Query::Fuzzy(q) => q.boost,
            Query::TermRange(q) => q.boost,
            Query::NumericRange(q) => q.boost,
            Query::Boolean(q) => q.boost,
            Query::MatchAll(q) => q.boost,
        }
    }

    /// Multiply the query's boost.
    pub fn with_boost(mut self, boost: f32) -> Self {
        let target = match &mut self {
            Query::Term(q) => &mut q.boost,
            Query::Phrase(q) => &mut q.boost,
            Query::Prefix(q) => &mut q.boost,
            Query::Wildcard(q) => &mut q.boost,
            Query::Fuzzy(q) => &mut q.boost,
            Query::TermRange(q) => &mut q.boost,
            Query::NumericRange(q) => &mut q.boost,
            Query::Boolean(q) => &mut q.boost,
            Query::MatchAll(q) => &mut q.boost,
        };
        *target *= boost;
        self
    }
}

/// Matches documents containing a term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub term: Term,
    pub boost: f32,
}

impl TermQuery {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        TermQuery {
            term: Term::new(field, text),
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Matches documents containing terms in order, within `slop` moves.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseQuery {
    pub field: String,
    /// `(relative position, term)` pairs.
    pub terms: Vec<(u32, String)>,
    pub slop: u32,
    pub boost: f32,
}

impl PhraseQuery {
    pub fn new<F: Into<String>>(field: F) -> Self {
        PhraseQuery {
            field: field.into(),
            terms: Vec::new(),
            slop: 0,
            boost: 1.0,
        }
    }

    /// A phrase of consecutive terms.
    pub fn from_terms<F: Into<String>, T: AsRef<str>>(field: F, terms: &[T]) -> Self {
        terms
            .iter()
            .fold(PhraseQuery::new(field), |query, term| query.add(term.as_ref()))
    }

    /// Append a term after the last one.
    pub fn add<T: Into<String>>(self, term: T) -> Self {
        let position = self.terms.last().map_or(0, |(position, _)| position + 1);
        self.add_at(term, position)
    }

    /// Add a term at an explicit relative position.
    pub fn add_at<T: Into<String>>(mut self, term: T, position: u32) -> Self {
        self.terms.push((position, term.into()));
        self
    }

    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Matches documents containing a term starting with a prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixQuery {
    pub term: Term,
    pub boost: f32,
}

impl PrefixQuery {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, prefix: T) -> Self {
        PrefixQuery {
            term: Term::new(field, prefix),
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Matches terms against a pattern where `?` is one character and `*` any
/// run of characters; `\` escapes either.
#[derive(Debug, Clone, PartialEq)]
pub struct WildcardQuery {
    pub term: Term,
    pub boost: f32,
}

impl WildcardQuery {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, pattern: T) -> Self {
        WildcardQuery {
            term: Term::new(field, pattern),
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// The literal text before the first wildcard, escapes resolved.
    pub fn literal_prefix(&self) -> String {
        let mut prefix = String::new();
        let mut chars = self.term.text.chars();
        while let Some(c) = chars.next() {
            match c {
                '*' | '?' => break,
                '\\' => match chars.next() {
                    Some(escaped) => prefix.push(escaped),
                    None => prefix.push('\\'),
                },
                c => prefix.push(c),
            }
        }
        prefix
    }

    /// The pattern as an anchored regular expression.
    pub fn to_regex(&self) -> String {
        let mut regex = String::from("(?s)^");
        let mut chars = self.term.text.chars();
        while let Some(c) = chars.next() {
            match c {
                '*' => regex.push_str(".*"),
                '?' => regex.push('.'),
                '\\' => {
                    let literal = chars.next().unwrap_or('\\');
                    regex.push_str(&regex::escape(&literal.to_string()));
                }
                c => regex.push_str(&regex::escape(&c.to_string())),
            }
        }
        regex.push('$');
        regex
    }
}

/// Matches terms within an edit-distance similarity of a term.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyQuery {
    pub term: Term,
    /// Terms must be strictly more similar than this (0.0 to 1.0).
    pub min_similarity: f32,
    /// Leading characters that must match exactly.
    pub prefix_length: usize,
    pub max_expansions: usize,
    pub boost: f32,
}

impl FuzzyQuery {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        FuzzyQuery {
            term: Term::new(field, text),
            min_similarity: DEFAULT_MIN_SIMILARITY,
            prefix_length: 0,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            boost: 1.0,
        }
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Matches terms between two bounds in term order. `None` is open.
#[derive(Debug, Clone, PartialEq)]
pub struct TermRangeQuery {
    pub field: String,
    pub lower: Option<String>,
    pub upper: Option<String>,
    pub include_lower: bool,
    pub include_upper: bool,
    pub boost: f32,
}

impl TermRangeQuery {
    pub fn new<F: Into<String>>(
        field: F,
        lower: Option<&str>,
        upper: Option<&str>,
        include_lower: bool,
        include_upper: bool,
    ) -> Self {
        TermRangeQuery {
            field: field.into(),
            lower: lower.map(str::to_string),
            upper: upper.map(str::to_string),
            include_lower,
            include_upper,
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Matches numeric fields between two bounds. `None` is open.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRangeQuery {
    pub field: String,
    pub lower: Option<i64>,
    pub upper: Option<i64>,
    pub include_lower: bool,
    pub include_upper: bool,
    /// Must equal the precision step the field was indexed with.
    pub precision_step: u32,
    pub boost: f32,
}

impl NumericRangeQuery {
    pub fn new<F: Into<String>>(
        field: F,
        lower: Option<i64>,
        upper: Option<i64>,
        include_lower: bool,
        include_upper: bool,
    ) -> Self {
        NumericRangeQuery {
            field: field.into(),
            lower,
            upper,
            include_lower,
            include_upper,
            precision_step: DEFAULT_PRECISION_STEP,
            boost: 1.0,
        }
    }

    pub fn with_precision_step(mut self, precision_step: u32) -> Self {
        self.precision_step = precision_step;
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// The equivalent inclusive bounds, or `None` when the range is empty.
    pub fn inclusive_bounds(&self) -> Option<(i64, i64)> {
        let lower = match self.lower {
            None => i64::MIN,
            Some(value) if self.include_lower => value,
            Some(value) => value.checked_add(1)?,
        };
        let upper = match self.upper {
            None => i64::MAX,
            Some(value) if self.include_upper => value,
            Some(value) => value.checked_sub(1)?,
        };
        (lower <= upper).then_some((lower, upper))
    }
}

/// How a clause takes part in a [`BooleanQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanClause {
    pub query: Query,
    pub occur: Occur,
}

/// Combines clauses with MUST / SHOULD / MUST_NOT semantics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BooleanQuery {
    pub clauses: Vec<BooleanClause>,
    /// SHOULD clauses that must match; at least one when there is no MUST.
    pub minimum_should_match: usize,
    pub boost: f32,
}

impl BooleanQuery {
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
            minimum_should_match: 0,
            boost: 1.0,
        }
    }

    pub fn add(mut self, query: Query, occur: Occur) -> Self {
        self.clauses.push(BooleanClause { query, occur });
        self
    }

    pub fn must(self, query: Query) -> Self {
        self.add(query, Occur::Must)
    }

    pub fn should(self, query: Query) -> Self {
        self.add(query, Occur::Should)
    }

    pub fn must_not(self, query: Query) -> Self {
        self.add(query, Occur::MustNot)
    }

    pub fn with_minimum_should_match(mut self, minimum_should_match: usize) -> Self {
        self.minimum_should_match = minimum_should_match;
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Matches every live document with a constant score.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchAllQuery {
    pub boost: f32,
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        MatchAllQuery { boost: 1.0 }
    }
}

macro_rules! impl_from_query {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Query {
                fn from(query: $ty) -> Self {
                    Query::$variant(query)
                }
            }
        )*
    };
}

impl_from_query! {
    Term => TermQuery,
    Phrase => PhraseQuery,
    Prefix => PrefixQuery,
    Wildcard => WildcardQuery,
    Fuzzy => FuzzyQuery,
    TermRange => TermRangeQuery,
    NumericRange => NumericRangeQuery,
    Boolean => BooleanQuery,
    MatchAll => MatchAllQuery,
}

fn write_boost(f: &mut fmt::Formatter<'_>, boost: f32) -> fmt::Result {
    if boost != 1.0 {
        write!(f, "^{boost}")?;
    }
    Ok(())
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Term(q) => write!(f, "{}", q.term)?,
            Query::Phrase(q) => {
                let terms: Vec<&str> = q.terms.iter().map(|(_, t)| t.as_str()).collect();
                write!(f, "{}:\"{}\"", q.field, terms.join(" "))?;
                if q.slop > 0 {
                    write!(f, "~{}", q.slop)?;
                }
            }
            Query::Prefix(q) => write!(f, "{}*", q.term)?,
            Query::Wildcard(q) => write!(f, "{}", q.term)?,
            Query::Fuzzy(q) => write!(f, "{}~{}", q.term, q.min_similarity)?,
            Query::TermRange(q) => write!(
                f,
                "{}:{}{} TO {}{}",
                q.field,
                if q.include_lower { '[' } else { '{' },
                q.lower.as_deref().unwrap_or("*"),
                q.upper.as_deref().unwrap_or("*"),
                if q.include_upper { ']' } else { '}' },
            )?,
            Query::NumericRange(q) => write!(
                f,
                "{}:{}{} TO {}{}",
                q.field,
                if q.include_lower { '[' } else { '{' },
                q.lower.map_or("*".to_string(), |v| v.to_string()),
                q.upper.map_or("*".to_string(), |v| v.to_string()),
                if q.include_upper { ']' } else { '}' },
            )?,
            Query::Boolean(q) => {
                let nested = q.boost != 1.0;
                if nested {
                    write!(f, "(")?;
                }
                for (i, clause) in q.clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match clause.occur {
                        Occur::Must => write!(f, "+")?,
                        Occur::MustNot => write!(f, "-")?,
                        Occur::Should => {}
                    }
                    match &clause.query {
                        Query::Boolean(inner) if inner.boost == 1.0 => write!(f, "({})", clause.query)?,
                        other => write!(f, "{other}")?,
                    }
                }
                if nested {
                    write!(f, ")")?;
                }
            }
            Query::MatchAll(_) => write!(f, "*:*")?,
        }
        write_boost(f, self.boost())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_translation() {
        let query = WildcardQuery::new("contents", "?ild*");
        assert_eq!(query.literal_prefix(), "");
        assert_eq!(query.to_regex(), "(?s)^.ild.*$");

        let query = WildcardQuery::new("contents", r"mi\*d?");
        assert_eq!(query.literal_prefix(), "mi*d");
        assert_eq!(query.to_regex(), r"(?s)^mi\*d.$");
    }

    #[test]
    fn test_wildcard_matches_newlines() {
        let regex = regex::Regex::new(&WildcardQuery::new("note", "a?b*").to_regex()).unwrap();
        assert!(regex.is_match("a\nb\nc"));
        assert!(!regex.is_match("xa\nb"));
    }

    #[test]
    fn test_numeric_bounds() {
        let query = NumericRangeQuery::new("pubmonth", Some(200605), Some(200609), true, true);
        assert_eq!(query.inclusive_bounds(), Some((200605, 200609)));

        let query = NumericRangeQuery::new("pubmonth", Some(5), Some(6), false, false);
        assert_eq!(query.inclusive_bounds(), None);

        let query = NumericRangeQuery::new("n", None, Some(i64::MIN), true, false);
        assert_eq!(query.inclusive_bounds(), None);
    }

    #[test]
    fn test_display() {
        let query: Query = BooleanQuery::new()
            .must(Query::term("contents", "junit"))
            .must(PhraseQuery::from_terms("contents", &["quick", "fox"]).with_slop(1).into())
            .must_not(PrefixQuery::new("subject", "moc").into())
            .should(TermRangeQuery::new("title2", Some("d"), Some("j"), true, false).into())
            .into();
        assert_eq!(
            query.to_string(),
            "+contents:junit +contents:\"quick fox\"~1 -subject:moc* title2:[d TO j}"
        );
        assert_eq!(Query::term("a", "b").with_boost(2.0).to_string(), "a:b^2");
    }
}
