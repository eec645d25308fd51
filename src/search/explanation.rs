//! Score explanations.

use std::fmt;

/// A node of a score explanation tree.
///
/// The value of a node is derived from its details by the operation named in
/// its description (a sum for boolean queries, a product for term scores).
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub value: f32,
    pub description: String,
    pub details: Vec<Explanation>,
}

impl Explanation {
    pub fn new<S: Into<String>>(value: f32, description: S) -> Self {
        Explanation {
            value,
            description: description.into(),
            details: Vec::new(),
        }
    }

    /// A non-matching explanation with value 0.
    pub fn no_match<S: Into<String>>(description: S) -> Self {
        Explanation::new(0.0, description)
    }

    pub fn with_detail(mut self, detail: Explanation) -> Self {
        self.details.push(detail);
        self
    }

    pub fn with_details(mut self, details: Vec<Explanation>) -> Self {
        self.details.extend(details);
        self
    }

    pub fn is_match(&self) -> bool {
        self.value > 0.0
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} = {}", "", self.value, self.description, indent = depth * 2)?;
        for detail in &self.details {
            detail.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
