//! Parsing textual queries.
//!
//! Supported syntax:
//! - Terms: `junit`, `title:junit`
//! - Phrases with optional slop: `"tests junit"~2`
//! - Required, prohibited and optional clauses: `+junit -mock ant`, `NOT mock`
//! - Conjunctions: `junit AND ant`, `junit OR ant`
//! - Grouping: `subject:(junit OR ant)`
//! - Prefix and wildcard terms: `jun*`, `j?nit`
//! - Fuzzy terms with optional minimum similarity: `wuzza~`, `wuzza~0.7`
//! - Ranges, inclusive or exclusive per side: `[d TO j]`, `{d TO *]`
//! - Boosts on any clause: `junit^2`, `"mock objects"^0.5`
//! - All documents: `*:*`
//!
//! Plain terms and phrases go through the field's analyzer. Prefix, wildcard,
//! fuzzy and range terms are not analyzed, only lowercased.

use std::sync::Arc;

use ahash::AHashSet;

use crate::analysis::Analyzer;
use crate::error::{Result, StrataError};
use crate::search::query::{
    BooleanClause, BooleanQuery, DEFAULT_MIN_SIMILARITY, FuzzyQuery, MatchAllQuery,
    NumericRangeQuery, Occur, PhraseQuery, PrefixQuery, Query, TermQuery, TermRangeQuery,
    WildcardQuery,
};
use crate::util::numeric::DEFAULT_PRECISION_STEP;

/// How clauses without an explicit operator combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Or,
    And,
}

/// Builds [`Query`] values from query strings.
#[derive(Debug, Clone)]
pub struct QueryParser {
    default_field: String,
    analyzer: Arc<dyn Analyzer>,
    default_operator: Operator,
    phrase_slop: u32,
    fuzzy_min_similarity: f32,
    fuzzy_prefix_length: usize,
    lowercase_expanded_terms: bool,
    numeric_fields: AHashSet<String>,
    precision_step: u32,
}

impl QueryParser {
    pub fn new<S: Into<String>>(default_field: S, analyzer: Arc<dyn Analyzer>) -> Self {
        QueryParser {
            default_field: default_field.into(),
            analyzer,
            default_operator: Operator::Or,
            phrase_slop: 0,
            fuzzy_min_similarity: DEFAULT_MIN_SIMILARITY,
            fuzzy_prefix_length: 0,
            lowercase_expanded_terms: true,
            numeric_fields: AHashSet::new(),
            precision_step: DEFAULT_PRECISION_STEP,
        }
    }

    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    /// Slop for phrases written without `~N`.
    pub fn with_phrase_slop(mut self, slop: u32) -> Self {
        self.phrase_slop = slop;
        self
    }

    pub fn with_fuzzy_min_similarity(mut self, min_similarity: f32) -> Self {
        self.fuzzy_min_similarity = min_similarity;
        self
    }

    pub fn with_fuzzy_prefix_length(mut self, prefix_length: usize) -> Self {
        self.fuzzy_prefix_length = prefix_length;
        self
    }

    pub fn with_lowercase_expanded_terms(mut self, lowercase: bool) -> Self {
        self.lowercase_expanded_terms = lowercase;
        self
    }

    /// Treat `field` as an integer field: its terms and ranges become
    /// numeric range queries.
    pub fn with_numeric_field<S: Into<String>>(mut self, field: S) -> Self {
        self.numeric_fields.insert(field.into());
        self
    }

    pub fn with_precision_step(mut self, precision_step: u32) -> Self {
        self.precision_step = precision_step;
        self
    }

    pub fn default_field(&self) -> &str {
        &self.default_field
    }

    pub fn default_operator(&self) -> Operator {
        self.default_operator
    }

    /// Parse `text` into a query.
    ///
    /// Input that analyzes to nothing yields an empty boolean query, which
    /// matches no documents.
    pub fn parse(&self, text: &str) -> Result<Query> {
        let lexemes = Lexer::new(text).tokenize()?;
        let mut parser = Parser {
            config: self,
            lexemes,
            pos: 0,
        };
        let query = parser.parse_query(0)?;
        if let Some(lexeme) = parser.peek() {
            return Err(StrataError::syntax(format!(
                "unexpected {} in '{text}'",
                lexeme.describe()
            )));
        }
        Ok(query)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Word { text: String, wildcard: bool },
    Quoted(String),
    LParen,
    RParen,
    Colon,
    Plus,
    Minus,
    Not,
    And,
    Or,
    Caret(String),
    Tilde(Option<String>),
    RangeStart { inclusive: bool },
    RangeEnd { inclusive: bool },
}

impl Lexeme {
    fn describe(&self) -> String {
        match self {
            Lexeme::Word { text, .. } => format!("'{text}'"),
            Lexeme::Quoted(text) => format!("\"{text}\""),
            Lexeme::LParen => "'('".to_string(),
            Lexeme::RParen => "')'".to_string(),
            Lexeme::Colon => "':'".to_string(),
            Lexeme::Plus => "'+'".to_string(),
            Lexeme::Minus => "'-'".to_string(),
            Lexeme::Not => "NOT".to_string(),
            Lexeme::And => "AND".to_string(),
            Lexeme::Or => "OR".to_string(),
            Lexeme::Caret(_) => "'^'".to_string(),
            Lexeme::Tilde(_) => "'~'".to_string(),
            Lexeme::RangeStart { .. } => "range start".to_string(),
            Lexeme::RangeEnd { .. } => "range end".to_string(),
        }
    }
}

fn is_special(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | ':' | '^' | '~' | '"' | '[' | ']' | '{' | '}' | '\\'
    )
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            chars: text.chars().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Lexeme>> {
        let mut lexemes = Vec::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }
            let lexeme = match c {
                '(' => self.single(Lexeme::LParen),
                ')' => self.single(Lexeme::RParen),
                ':' => self.single(Lexeme::Colon),
                '+' => self.single(Lexeme::Plus),
                '-' | '!' => self.single(Lexeme::Minus),
                '[' => self.single(Lexeme::RangeStart { inclusive: true }),
                '{' => self.single(Lexeme::RangeStart { inclusive: false }),
                ']' => self.single(Lexeme::RangeEnd { inclusive: true }),
                '}' => self.single(Lexeme::RangeEnd { inclusive: false }),
                '"' => self.quoted()?,
                '^' => {
                    self.chars.next();
                    let number = self.number();
                    if number.is_empty() {
                        return Err(StrataError::syntax("'^' must be followed by a number"));
                    }
                    Lexeme::Caret(number)
                }
                '~' => {
                    self.chars.next();
                    let number = self.number();
                    Lexeme::Tilde((!number.is_empty()).then_some(number))
                }
                '&' | '|' => self.double(c)?,
                _ => self.word()?,
            };
            lexemes.push(lexeme);
        }
        Ok(lexemes)
    }

    fn single(&mut self, lexeme: Lexeme) -> Lexeme {
        self.chars.next();
        lexeme
    }

    fn double(&mut self, c: char) -> Result<Lexeme> {
        self.chars.next();
        if self.chars.next_if_eq(&c).is_none() {
            return Err(StrataError::syntax(format!("expected '{c}{c}'")));
        }
        Ok(if c == '&' { Lexeme::And } else { Lexeme::Or })
    }

    fn number(&mut self) -> String {
        let mut number = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            number.push(c);
        }
        number
    }

    fn quoted(&mut self) -> Result<Lexeme> {
        self.chars.next();
        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some('"') => return Ok(Lexeme::Quoted(text)),
                Some('\\') => match self.chars.next() {
                    Some(escaped) => text.push(escaped),
                    None => return Err(StrataError::syntax("dangling escape in phrase")),
                },
                Some(c) => text.push(c),
                None => return Err(StrataError::syntax(format!("unterminated phrase \"{text}"))),
            }
        }
    }

    fn word(&mut self) -> Result<Lexeme> {
        let mut text = String::new();
        let mut wildcard = false;
        let mut escaped_any = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || (is_special(c) && c != '\\') {
                break;
            }
            self.chars.next();
            match c {
                '\\' => match self.chars.next() {
                    Some(escaped) => {
                        text.push(escaped);
                        escaped_any = true;
                    }
                    None => return Err(StrataError::syntax("dangling escape at end of query")),
                },
                '*' | '?' => {
                    wildcard = true;
                    text.push(c);
                }
                _ => text.push(c),
            }
        }

        if !escaped_any {
            match text.as_str() {
                "AND" => return Ok(Lexeme::And),
                "OR" => return Ok(Lexeme::Or),
                "NOT" => return Ok(Lexeme::Not),
                _ => {}
            }
        }
        Ok(Lexeme::Word { text, wildcard })
    }
}

struct Parser<'a> {
    config: &'a QueryParser,
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Lexeme> {
        self.lexemes.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.pos).cloned();
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn parse_query(&mut self, depth: usize) -> Result<Query> {
        let mut clauses: Vec<BooleanClause> = Vec::new();
        let mut first = true;

        loop {
            match self.peek() {
                None => break,
                Some(Lexeme::RParen) if depth > 0 => break,
                Some(Lexeme::RParen) => return Err(StrataError::syntax("unbalanced ')'")),
                _ => {}
            }

            let conjunction = match self.peek() {
                Some(Lexeme::And) | Some(Lexeme::Or) if first => {
                    return Err(StrataError::syntax("query cannot start with AND or OR"));
                }
                Some(Lexeme::And) => self.next(),
                Some(Lexeme::Or) => self.next(),
                _ => None,
            };
            let modifier = match self.peek() {
                Some(Lexeme::Plus) => self.next().map(|_| Occur::Must),
                Some(Lexeme::Minus) | Some(Lexeme::Not) => self.next().map(|_| Occur::MustNot),
                _ => None,
            };

            let query = self.parse_clause(depth)?;
            self.add_clause(&mut clauses, conjunction, modifier, query);
            first = false;
        }

        Ok(match clauses.len() {
            1 if clauses[0].occur != Occur::MustNot => clauses.remove(0).query,
            _ => Query::Boolean(BooleanQuery {
                clauses,
                minimum_should_match: 0,
                boost: 1.0,
            }),
        })
    }

    fn add_clause(
        &self,
        clauses: &mut Vec<BooleanClause>,
        conjunction: Option<Lexeme>,
        modifier: Option<Occur>,
        query: Option<Query>,
    ) {
        let and = conjunction == Some(Lexeme::And);
        let or = conjunction == Some(Lexeme::Or);

        // A conjunction also binds the clause before it.
        if let Some(previous) = clauses.last_mut() {
            if and && previous.occur == Occur::Should {
                previous.occur = Occur::Must;
            }
            if or && self.config.default_operator == Operator::And && previous.occur == Occur::Must {
                previous.occur = Occur::Should;
            }
        }

        let Some(query) = query else {
            return;
        };

        let prohibited = modifier == Some(Occur::MustNot);
        let required = match self.config.default_operator {
            Operator::Or => modifier == Some(Occur::Must) || (and && !prohibited),
            Operator::And => !prohibited && (!or || modifier == Some(Occur::Must)),
        };
        let occur = if required {
            Occur::Must
        } else if prohibited {
            Occur::MustNot
        } else {
            Occur::Should
        };
        clauses.push(BooleanClause { query, occur });
    }

    /// One clause; `None` when its text analyzes to nothing.
    fn parse_clause(&mut self, depth: usize) -> Result<Option<Query>> {
        let field = match (self.peek(), self.peek_at(1)) {
            (Some(Lexeme::Word { text, .. }), Some(Lexeme::Colon)) => {
                let field = text.clone();
                self.pos += 2;
                field
            }
            _ => self.config.default_field.clone(),
        };

        let query = match self.next() {
            Some(Lexeme::LParen) => {
                let inner = self.parse_group(&field, depth)?;
                if self.next() != Some(Lexeme::RParen) {
                    return Err(StrataError::syntax("missing closing parenthesis"));
                }
                Some(inner)
            }
            Some(Lexeme::Quoted(text)) => {
                let slop = match self.peek() {
                    Some(Lexeme::Tilde(number)) => {
                        let slop = parse_slop(number.as_deref())?;
                        self.pos += 1;
                        slop
                    }
                    _ => self.config.phrase_slop,
                };
                self.analyzed_query(&field, &text, slop)?
            }
            Some(Lexeme::RangeStart { inclusive }) => Some(self.parse_range(&field, inclusive)?),
            Some(Lexeme::Word { text, wildcard }) => self.term_query(&field, text, wildcard)?,
            Some(other) => {
                return Err(StrataError::syntax(format!(
                    "unexpected {} where a term was expected",
                    other.describe()
                )));
            }
            None => return Err(StrataError::syntax("unexpected end of query")),
        };

        let boost = match self.peek() {
            Some(Lexeme::Caret(number)) => {
                let boost = number
                    .parse::<f32>()
                    .map_err(|_| StrataError::syntax(format!("invalid boost '{number}'")))?;
                self.pos += 1;
                Some(boost)
            }
            _ => None,
        };

        Ok(match (query, boost) {
            (Some(query), Some(boost)) => Some(query.with_boost(boost)),
            (query, _) => query,
        })
    }

    /// A parenthesized group; an explicit field applies to every clause inside.
    fn parse_group(&mut self, field: &str, depth: usize) -> Result<Query> {
        if field == self.config.default_field {
            return self.parse_query(depth + 1);
        }
        let scoped = QueryParser {
            default_field: field.to_string(),
            ..self.config.clone()
        };
        let mut parser = Parser {
            config: &scoped,
            lexemes: std::mem::take(&mut self.lexemes),
            pos: self.pos,
        };
        let result = parser.parse_query(depth + 1);
        self.lexemes = parser.lexemes;
        self.pos = parser.pos;
        result
    }

    fn term_query(&mut self, field: &str, text: String, wildcard: bool) -> Result<Option<Query>> {
        if field == "*" && text == "*" {
            return Ok(Some(MatchAllQuery::default().into()));
        }

        if let Some(Lexeme::Tilde(number)) = self.peek() {
            let min_similarity = match number {
                Some(number) => number
                    .parse::<f32>()
                    .map_err(|_| StrataError::syntax(format!("invalid similarity '{number}'")))?,
                None => self.config.fuzzy_min_similarity,
            };
            if !(0.0..1.0).contains(&min_similarity) {
                return Err(StrataError::syntax(format!(
                    "fuzzy similarity must be in [0, 1), got {min_similarity}"
                )));
            }
            self.pos += 1;
            return Ok(Some(
                FuzzyQuery::new(field, self.expanded(&text))
                    .with_min_similarity(min_similarity)
                    .with_prefix_length(self.config.fuzzy_prefix_length)
                    .into(),
            ));
        }

        if wildcard {
            let pattern = self.expanded(&text);
            let trailing_star_only =
                pattern.ends_with('*') && !pattern[..pattern.len() - 1].contains(['*', '?']);
            return Ok(Some(if trailing_star_only {
                PrefixQuery::new(field, &pattern[..pattern.len() - 1]).into()
            } else {
                WildcardQuery::new(field, pattern).into()
            }));
        }

        if self.config.numeric_fields.contains(field) {
            let value = parse_int(field, &text)?;
            return Ok(Some(
                NumericRangeQuery::new(field, Some(value), Some(value), true, true)
                    .with_precision_step(self.config.precision_step)
                    .into(),
            ));
        }

        self.analyzed_query(field, &text, self.config.phrase_slop)
    }

    fn parse_range(&mut self, field: &str, include_lower: bool) -> Result<Query> {
        let lower = self.range_endpoint()?;
        match self.next() {
            Some(Lexeme::Word { text, .. }) if text == "TO" => {}
            _ => return Err(StrataError::syntax("expected TO in range")),
        }
        let upper = self.range_endpoint()?;
        let include_upper = match self.next() {
            Some(Lexeme::RangeEnd { inclusive }) => inclusive,
            _ => return Err(StrataError::syntax("expected ']' or '}' to close range")),
        };

        if self.config.numeric_fields.contains(field) {
            let lower = lower.map(|v| parse_int(field, &v)).transpose()?;
            let upper = upper.map(|v| parse_int(field, &v)).transpose()?;
            return Ok(NumericRangeQuery::new(field, lower, upper, include_lower, include_upper)
                .with_precision_step(self.config.precision_step)
                .into());
        }

        let lower = lower.map(|v| self.expanded(&v));
        let upper = upper.map(|v| self.expanded(&v));
        Ok(TermRangeQuery::new(
            field,
            lower.as_deref(),
            upper.as_deref(),
            include_lower,
            include_upper,
        )
        .into())
    }

    /// A range bound; `*` is open.
    fn range_endpoint(&mut self) -> Result<Option<String>> {
        match self.next() {
            Some(Lexeme::Word { text, .. }) if text == "*" => Ok(None),
            Some(Lexeme::Word { text, .. }) | Some(Lexeme::Quoted(text)) => Ok(Some(text)),
            Some(other) => Err(StrataError::syntax(format!(
                "unexpected {} in range",
                other.describe()
            ))),
            None => Err(StrataError::syntax("unterminated range")),
        }
    }

    fn expanded(&self, text: &str) -> String {
        if self.config.lowercase_expanded_terms {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }

    /// A term query, a phrase when the text analyzes to several tokens, or
    /// `None` when it analyzes to nothing.
    fn analyzed_query(&self, field: &str, text: &str, slop: u32) -> Result<Option<Query>> {
        let mut position: i64 = -1;
        let mut terms = Vec::new();
        for token in self.config.analyzer.analyze_field(field, text)? {
            position = (position + token.position_increment as i64).max(0);
            terms.push((position as u32, token.text));
        }

        Ok(match terms.len() {
            0 => None,
            1 => terms
                .pop()
                .map(|(_, text)| TermQuery::new(field, text).into()),
            _ => {
                let base = terms[0].0;
                let phrase = terms
                    .into_iter()
                    .fold(PhraseQuery::new(field), |phrase, (position, term)| {
                        phrase.add_at(term, position - base)
                    });
                Some(phrase.with_slop(slop).into())
            }
        })
    }
}

fn parse_slop(number: Option<&str>) -> Result<u32> {
    let Some(number) = number else {
        return Err(StrataError::syntax("'~' after a phrase must be followed by a slop"));
    };
    number
        .parse::<f32>()
        .ok()
        .filter(|slop| *slop >= 0.0)
        .map(|slop| slop as u32)
        .ok_or_else(|| StrataError::syntax(format!("invalid phrase slop '{number}'")))
}

fn parse_int(field: &str, text: &str) -> Result<i64> {
    text.parse()
        .map_err(|_| StrataError::syntax(format!("'{text}' is not an integer for field {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{StandardAnalyzer, WhitespaceAnalyzer};

    fn parser() -> QueryParser {
        QueryParser::new("contents", Arc::new(StandardAnalyzer::new()))
    }

    fn parse(text: &str) -> String {
        parser().parse(text).unwrap().to_string()
    }

    #[test]
    fn test_terms_are_analyzed() {
        assert_eq!(parse("JUnit"), "contents:junit");
        assert_eq!(parse("subject:Ant"), "subject:ant");
        assert_eq!(parse("\"Mock Objects\""), "contents:\"mock objects\"");
        assert_eq!(parse("\"mock objects\"~3"), "contents:\"mock objects\"~3");
    }

    #[test]
    fn test_modifiers_and_default_operator() {
        assert_eq!(parse("+junit +ant -mock"), "+contents:junit +contents:ant -contents:mock");
        assert_eq!(parse("junit ant"), "contents:junit contents:ant");
        assert_eq!(parse("junit AND ant"), "+contents:junit +contents:ant");
        assert_eq!(parse("junit && ant || mock"), "+contents:junit +contents:ant contents:mock");
        assert_eq!(parse("junit NOT ant"), "contents:junit -contents:ant");

        let and = parser().with_default_operator(Operator::And);
        assert_eq!(and.parse("junit ant").unwrap().to_string(), "+contents:junit +contents:ant");
        assert_eq!(and.parse("junit OR ant").unwrap().to_string(), "contents:junit contents:ant");
    }

    #[test]
    fn test_groups() {
        assert_eq!(
            parse("+(junit OR ant) -mock"),
            "+(contents:junit contents:ant) -contents:mock"
        );
        assert_eq!(parse("subject:(junit ant)"), "subject:junit subject:ant");
        assert_eq!(parse("(junit)"), "contents:junit");
    }

    #[test]
    fn test_expanded_terms() {
        assert!(matches!(parser().parse("Jun*").unwrap(), Query::Prefix(q) if q.term.text == "jun"));
        assert!(matches!(parser().parse("j?n*t").unwrap(), Query::Wildcard(q) if q.term.text == "j?n*t"));

        let Query::Fuzzy(fuzzy) = parser().parse("Wuzza~").unwrap() else {
            panic!("expected fuzzy query");
        };
        assert_eq!(fuzzy.term.text, "wuzza");
        assert_eq!(fuzzy.min_similarity, DEFAULT_MIN_SIMILARITY);

        let Query::Fuzzy(fuzzy) = parser().parse("wuzza~0.7").unwrap() else {
            panic!("expected fuzzy query");
        };
        assert!((fuzzy.min_similarity - 0.7).abs() < 1e-6);

        assert!(matches!(parser().parse("*:*").unwrap(), Query::MatchAll(_)));
    }

    #[test]
    fn test_ranges_and_boosts() {
        assert_eq!(parse("title2:[D TO J]"), "title2:[d TO j]");
        assert_eq!(parse("title2:{d TO *]"), "title2:{d TO *]");

        let numeric = parser().with_numeric_field("pubmonth");
        let Query::NumericRange(range) = numeric.parse("pubmonth:[200605 TO 200609]").unwrap() else {
            panic!("expected numeric range");
        };
        assert_eq!(range.inclusive_bounds(), Some((200605, 200609)));
        assert!(numeric.parse("pubmonth:[2006x TO 200609]").is_err());

        let query = parser().parse("junit^2 \"mock objects\"^0.5").unwrap();
        let Query::Boolean(boolean) = query else {
            panic!("expected boolean query");
        };
        assert_eq!(boolean.clauses[0].query.boost(), 2.0);
        assert_eq!(boolean.clauses[1].query.boost(), 0.5);
    }

    #[test]
    fn test_multi_token_term_becomes_phrase() {
        let Query::Phrase(phrase) = parser().parse("e-mail").unwrap() else {
            panic!("expected phrase");
        };
        assert_eq!(phrase.terms, vec![(0, "e".to_string()), (1, "mail".to_string())]);

        let ws = QueryParser::new("contents", Arc::new(WhitespaceAnalyzer::new()));
        assert_eq!(ws.parse("e-mail").unwrap().to_string(), "contents:e-mail");
    }

    #[test]
    fn test_empty_and_stopped_input() {
        let query = parser().parse("   ").unwrap();
        assert!(matches!(query, Query::Boolean(ref b) if b.is_empty()));
        assert!(matches!(parser().parse("...").unwrap(), Query::Boolean(ref b) if b.is_empty()));
    }

    #[test]
    fn test_syntax_errors() {
        for bad in [
            "\"unterminated",
            "(junit",
            "junit)",
            "AND junit",
            "junit AND",
            "title:[a TO",
            "title:[a b]",
            "junit^",
            "wuzza~1.5",
            "\"mock objects\"~",
            "trailing\\",
        ] {
            assert!(
                matches!(parser().parse(bad), Err(StrataError::QuerySyntax(_))),
                "expected syntax error for {bad}"
            );
        }
    }
}
