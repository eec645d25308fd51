//! Document structures.

use serde::{Deserialize, Serialize};

use crate::document::field::{Field, Store, StoredValue};

/// An ordered collection of fields to be indexed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Document { fields: Vec::new() }
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Append a field.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The first field with this name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Every field with this name, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.name() == name)
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<Field> for Document {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Document {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        DocumentBuilder::default()
    }

    /// Add an analyzed text field.
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T, store: Store) -> Self {
        self.document.add_field(Field::text(name, value, store));
        self
    }

    /// Add a field indexed as one whole-value term.
    pub fn add_keyword<S: Into<String>, T: Into<String>>(mut self, name: S, value: T, store: Store) -> Self {
        self.document.add_field(Field::keyword(name, value, store));
        self
    }

    /// Add a numeric field.
    pub fn add_int<S: Into<String>>(mut self, name: S, value: i64, store: Store) -> Self {
        self.document.add_field(Field::int(name, value, store));
        self
    }

    /// Add a stored-only field.
    pub fn add_stored<S: Into<String>, V: Into<StoredValue>>(mut self, name: S, value: V) -> Self {
        self.document.add_field(Field::stored(name, value));
        self
    }

    /// Add a prebuilt field.
    pub fn add_field(mut self, field: Field) -> Self {
        self.document.add_field(field);
        self
    }

    /// Build the document.
    pub fn build(self) -> Document {
        self.document
    }
}

/// The stored fields of a document, as returned by an index reader.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    fields: Vec<(String, StoredValue)>,
}

impl StoredDocument {
    pub(crate) fn new(fields: Vec<(String, StoredValue)>) -> Self {
        StoredDocument { fields }
    }

    /// The first text value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values(name).find_map(StoredValue::as_text)
    }

    /// The first integer value stored under `name`.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.values(name).find_map(StoredValue::as_int)
    }

    /// Every value stored under `name`.
    pub fn values<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a StoredValue> + use<'a, 'n> {
        self.fields
            .iter()
            .filter(move |(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// All stored fields in indexing order.
    pub fn fields(&self) -> &[(String, StoredValue)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order_and_duplicates() {
        let doc = Document::builder()
            .add_text("author", "Otis", Store::Yes)
            .add_keyword("id", "1", Store::Yes)
            .add_text("author", "Erik", Store::Yes)
            .build();

        let names: Vec<_> = doc.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["author", "id", "author"]);
        assert_eq!(doc.get_all("author").count(), 2);
        assert_eq!(doc.get("id").map(|f| f.name()), Some("id"));
        assert!(doc.get("missing").is_none());
    }

    #[test]
    fn test_stored_document_accessors() {
        let stored = StoredDocument::new(vec![
            ("author".into(), StoredValue::Text("Otis".into())),
            ("author".into(), StoredValue::Text("Erik".into())),
            ("pubmonth".into(), StoredValue::Int(200406)),
        ]);
        assert_eq!(stored.get("author"), Some("Otis"));
        assert_eq!(stored.values("author").count(), 2);
        assert_eq!(stored.get_int("pubmonth"), Some(200406));
        assert_eq!(stored.get("pubmonth"), None);
    }
}
