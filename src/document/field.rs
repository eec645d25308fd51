//! Field definitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};

/// Whether a field's original value is kept for retrieval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Store {
    Yes,
    No,
}

impl Store {
    pub fn is_stored(self) -> bool {
        matches!(self, Store::Yes)
    }
}

/// A value kept in the stored-fields file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredValue {
    Text(String),
    Int(i64),
}

impl StoredValue {
    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoredValue::Text(text) => Some(text),
            StoredValue::Int(_) => None,
        }
    }

    /// The value as an integer, if it is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StoredValue::Int(value) => Some(*value),
            StoredValue::Text(_) => None,
        }
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Text(value.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Text(value)
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Int(value)
    }
}

/// How a field is indexed and stored.
///
/// A field that is neither indexed nor stored cannot be expressed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Tokenized by the writer's analyzer; positions are recorded.
    Text { value: String, store: Store },
    /// Indexed as a single term holding the whole value.
    Keyword { value: String, store: Store },
    /// Indexed as trie-encoded terms for numeric range queries.
    Int { value: i64, store: Store },
    /// Stored for retrieval only; not searchable.
    Stored(StoredValue),
}

/// A named field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    kind: FieldKind,
}

impl Field {
    /// An analyzed text field.
    pub fn text<N: Into<String>, V: Into<String>>(name: N, value: V, store: Store) -> Self {
        Field {
            name: name.into(),
            kind: FieldKind::Text {
                value: value.into(),
                store,
            },
        }
    }

    /// A field indexed verbatim as a single term.
    pub fn keyword<N: Into<String>, V: Into<String>>(name: N, value: V, store: Store) -> Self {
        Field {
            name: name.into(),
            kind: FieldKind::Keyword {
                value: value.into(),
                store,
            },
        }
    }

    /// A numeric field.
    pub fn int<N: Into<String>>(name: N, value: i64, store: Store) -> Self {
        Field {
            name: name.into(),
            kind: FieldKind::Int { value, store },
        }
    }

    /// A stored-only field.
    pub fn stored<N: Into<String>, V: Into<StoredValue>>(name: N, value: V) -> Self {
        Field {
            name: name.into(),
            kind: FieldKind::Stored(value.into()),
        }
    }

    /// A numeric field parsed from text.
    pub fn int_from_str<N: Into<String>>(name: N, text: &str, store: Store) -> Result<Self> {
        let name = name.into();
        let value = text.trim().parse::<i64>().map_err(|e| {
            StrataError::invalid_field_value(&name, format!("'{text}' is not an integer: {e}"))
        })?;
        Ok(Field::int(name, value, store))
    }

    /// A numeric field holding days since 1970-01-01.
    pub fn date<N: Into<String>>(name: N, date: NaiveDate, store: Store) -> Self {
        Field::int(name, days_since_epoch(date), store)
    }

    /// A date field parsed from `yyyyMM`, `yyyyMMdd` or `yyyy-MM-dd`.
    ///
    /// Month-only input is taken as the first day of the month.
    pub fn date_from_str<N: Into<String>>(name: N, text: &str, store: Store) -> Result<Self> {
        let name = name.into();
        let date = parse_date(text)
            .ok_or_else(|| StrataError::invalid_field_value(&name, format!("'{text}' is not a date")))?;
        Ok(Field::date(name, date, store))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field contributes terms to the index.
    pub fn is_indexed(&self) -> bool {
        !matches!(self.kind, FieldKind::Stored(_))
    }

    /// The value to keep in the stored-fields file, if any.
    pub fn stored_value(&self) -> Option<StoredValue> {
        match &self.kind {
            FieldKind::Text { value, store } | FieldKind::Keyword { value, store } => {
                store.is_stored().then(|| StoredValue::Text(value.clone()))
            }
            FieldKind::Int { value, store } => store.is_stored().then_some(StoredValue::Int(*value)),
            FieldKind::Stored(value) => Some(value.clone()),
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.len() == 6 && text.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(&format!("{text}01"), "%Y%m%d").ok();
    }
    NaiveDate::parse_from_str(text, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

fn days_since_epoch(date: NaiveDate) -> i64 {
    (date - NaiveDate::default()).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_value_selection() {
        assert_eq!(Field::text("title", "Ant", Store::No).stored_value(), None);
        assert_eq!(
            Field::keyword("isbn", "123", Store::Yes).stored_value(),
            Some(StoredValue::Text("123".into()))
        );
        assert_eq!(
            Field::int("pubmonth", 200406, Store::Yes).stored_value(),
            Some(StoredValue::Int(200406))
        );
        let url = Field::stored("url", "http://example.com");
        assert!(!url.is_indexed());
        assert_eq!(url.stored_value().unwrap().as_text(), Some("http://example.com"));
    }

    #[test]
    fn test_int_from_str() {
        let field = Field::int_from_str("pubmonth", " 200605 ", Store::Yes).unwrap();
        assert_eq!(field.kind(), &FieldKind::Int { value: 200605, store: Store::Yes });

        let err = Field::int_from_str("pubmonth", "2006-05", Store::Yes).unwrap_err();
        assert!(matches!(err, StrataError::InvalidFieldValue { ref field, .. } if field == "pubmonth"));
    }

    #[test]
    fn test_date_from_str() {
        let epoch = Field::date_from_str("day", "19700101", Store::No).unwrap();
        assert_eq!(epoch.kind(), &FieldKind::Int { value: 0, store: Store::No });

        let month = Field::date_from_str("day", "197002", Store::No).unwrap();
        assert_eq!(month.kind(), &FieldKind::Int { value: 31, store: Store::No });

        let dashed = Field::date_from_str("day", "1970-01-03", Store::No).unwrap();
        assert_eq!(dashed.kind(), &FieldKind::Int { value: 2, store: Store::No });

        assert!(Field::date_from_str("day", "200613", Store::No).is_err());
        assert!(Field::date_from_str("day", "soon", Store::No).is_err());
    }
}
