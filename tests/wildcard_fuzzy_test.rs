//! Multi-term queries: wildcard and fuzzy.

mod common;

use std::sync::Arc;

use strata::prelude::*;
use strata::search::{FuzzyQuery, WildcardQuery};

fn searcher(words: &[&str]) -> Result<IndexSearcher> {
    let directory = common::memory_directory();
    let writer = IndexWriter::open(
        &directory,
        IndexWriterConfig::new(Arc::new(StandardAnalyzer::new())),
    )?;
    for word in words {
        writer.add_document(
            Document::builder()
                .add_text("contents", *word, Store::Yes)
                .build(),
        )?;
    }
    writer.close()?;
    Ok(IndexSearcher::new(IndexReader::open(&directory)?))
}

fn words(searcher: &IndexSearcher, top: &TopDocs) -> Result<Vec<String>> {
    top.docs()
        .map(|doc| Ok(searcher.doc(doc)?.get("contents").unwrap_or_default().to_string()))
        .collect()
}

#[test]
fn test_wildcard() -> Result<()> {
    let searcher = searcher(&["wild", "child", "mild", "mildew"])?;

    let top = searcher.search(&WildcardQuery::new("contents", "?ild*").into(), 10)?;
    assert_eq!(top.total_hits, 3);
    assert_eq!(words(&searcher, &top)?, vec!["wild", "mild", "mildew"]);
    let first = top.score_docs[0].score;
    assert!(top.score_docs.iter().all(|hit| hit.score == first));

    assert_eq!(searcher.count(&WildcardQuery::new("contents", "m*w").into())?, 1);
    assert_eq!(searcher.count(&WildcardQuery::new("contents", "*").into())?, 4);
    assert_eq!(searcher.count(&WildcardQuery::new("contents", "?ild").into())?, 2);
    Ok(())
}

#[test]
fn test_wildcard_boost_is_the_score() -> Result<()> {
    let searcher = searcher(&["wild", "mild"])?;
    let query = Query::from(WildcardQuery::new("contents", "*ild")).with_boost(3.0);
    let top = searcher.search(&query, 10)?;
    assert!(top.score_docs.iter().all(|hit| hit.score == 3.0));
    Ok(())
}

#[test]
fn test_fuzzy() -> Result<()> {
    let searcher = searcher(&["fuzzy", "wuzzy"])?;

    let top = searcher.search(&FuzzyQuery::new("contents", "wuzza").into(), 10)?;
    assert_eq!(top.total_hits, 2);
    assert_eq!(words(&searcher, &top)?, vec!["wuzzy", "fuzzy"]);
    assert!(top.score_docs[0].score > top.score_docs[1].score);

    let strict = FuzzyQuery::new("contents", "wuzza").with_min_similarity(0.7);
    assert_eq!(searcher.count(&strict.into())?, 1);

    let prefixed = FuzzyQuery::new("contents", "wuzza").with_prefix_length(1);
    assert_eq!(searcher.count(&prefixed.into())?, 1);

    let narrow = FuzzyQuery::new("contents", "wuzza").with_max_expansions(1);
    let top = searcher.search(&narrow.into(), 10)?;
    assert_eq!(words(&searcher, &top)?, vec!["wuzzy"]);
    Ok(())
}

#[test]
fn test_fuzzy_expands_across_segments() -> Result<()> {
    let directory = common::memory_directory();
    let writer = IndexWriter::open(
        &directory,
        IndexWriterConfig::new(Arc::new(StandardAnalyzer::new())).with_max_buffered_docs(1),
    )?;
    for word in ["fuzzy", "wuzzy", "wuzzy"] {
        writer.add_document(Document::builder().add_text("contents", word, Store::No).build())?;
    }
    writer.close()?;

    let reader = IndexReader::open(&directory)?;
    assert_eq!(reader.segment_count(), 3);
    let searcher = IndexSearcher::new(reader);
    let top = searcher.search(&FuzzyQuery::new("contents", "wuzza").into(), 10)?;
    assert_eq!(top.total_hits, 3);
    assert_eq!(top.score_docs[0].score, top.score_docs[1].score);
    assert_eq!(top.score_docs[2].doc, 0);

    let query = FuzzyQuery::new("contents", "wuzza").into();
    for hit in &top.score_docs {
        assert!((searcher.explain(&query, hit.doc)?.value - hit.score).abs() < 1e-5);
    }
    Ok(())
}
