//! Simple analyzer: letter runs, lowercased.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::error::Result;

/// Splits text at non-letters and lowercases every token.
#[derive(Clone, Debug)]
pub struct SimpleAnalyzer {
    inner: PipelineAnalyzer,
}

impl SimpleAnalyzer {
    /// Create a new simple analyzer.
    pub fn new() -> Result<Self> {
        let inner = PipelineAnalyzer::new(Arc::new(RegexTokenizer::letters()?))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("simple");
        Ok(SimpleAnalyzer { inner })
    }
}

impl Analyzer for SimpleAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &str {
        "simple"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_analyzer() {
        let analyzer = SimpleAnalyzer::new().unwrap();
        let tokens: Vec<_> = analyzer
            .analyze("+JUNIT +ANT -MOCK 2nd")
            .unwrap()
            .map(|t| t.text)
            .collect();
        assert_eq!(tokens, vec!["junit", "ant", "mock", "nd"]);
    }
}
