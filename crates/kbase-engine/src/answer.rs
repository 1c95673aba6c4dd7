//! Context assembly and the deterministic extractive answer.

use kbase_core::types::{ArticleSummary, RetrievalResult};

pub const NO_RESULTS_ANSWER: &str = "No relevant information found in the knowledge base.";
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";
pub const ANSWER_EXCERPT_CHARS: usize = 500;
pub const PREVIEW_CHARS: usize = 300;
pub const ELLIPSIS: &str = "...";

/// Joins every retrieved article into the block handed to the generator.
pub fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|r| format!("Article: {}\n{}", r.document.title(), r.document.text))
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

/// Title of the top hit followed by the start of its text.
pub fn extractive_answer(results: &[RetrievalResult]) -> String {
    match results.first() {
        Some(top) => format!(
            "{}\n\n{}{}",
            top.document.title(),
            prefix_chars(&top.document.text, ANSWER_EXCERPT_CHARS),
            ELLIPSIS
        ),
        None => NO_RESULTS_ANSWER.to_string(),
    }
}

pub fn content_preview(text: &str) -> String {
    format!("{}{}", prefix_chars(text, PREVIEW_CHARS), ELLIPSIS)
}

pub fn summarize(result: &RetrievalResult) -> ArticleSummary {
    let meta = &result.document.metadata;
    ArticleSummary {
        rank: result.rank,
        title: meta.title.clone(),
        category: meta.category.clone(),
        tags: meta.tags.clone(),
        similarity_score: result.similarity_score,
        content_preview: content_preview(&result.document.text),
    }
}

/// First `n` characters (not bytes) of `s`.
pub fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
