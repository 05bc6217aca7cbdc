//! Description highlighting for the returned page.
//!
//! Presentation-only: the first occurrence of each query or expansion term
//! in a document's description is wrapped in the request's tags, and the
//! description is cut down to a fragment window around the first match.
//! Matching is ASCII case-insensitive and the original casing is preserved
//! in the output.

/// Wraps matched terms in a text fragment.
#[derive(Clone, Debug)]
pub struct Highlighter {
    pre_tag: String,
    post_tag: String,
    fragment_size: usize,
}

impl Highlighter {
    /// Create a highlighter. A `fragment_size` of 0 disables truncation.
    pub fn new<S: Into<String>>(pre_tag: S, post_tag: S, fragment_size: usize) -> Self {
        Highlighter {
            pre_tag: pre_tag.into(),
            post_tag: post_tag.into(),
            fragment_size,
        }
    }

    /// Highlight `text` against `terms`.
    ///
    /// Returns `None` when no term occurs in the text. Each term's first
    /// occurrence is wrapped once; overlapping matches keep the longest one.
    pub fn highlight(&self, text: &str, terms: &[String]) -> Option<String> {
        if text.is_empty() || terms.is_empty() {
            return None;
        }

        let haystack = text.to_ascii_lowercase();
        let mut spans: Vec<(usize, usize)> = Vec::new();
        for term in terms {
            let needle = term.to_ascii_lowercase();
            if needle.is_empty() {
                continue;
            }
            if let Some(start) = haystack.find(&needle) {
                spans.push((start, start + needle.len()));
            }
        }
        if spans.is_empty() {
            return None;
        }
        // Start ascending; on equal starts the longer match first, so
        // "dresses" wins over "dress" and the shorter span is skipped.
        spans.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

        let (window_start, window_end) = self.window(text, spans[0].0);
        let mut out = String::with_capacity(
            (window_end - window_start)
                + spans.len() * (self.pre_tag.len() + self.post_tag.len()),
        );
        let mut cursor = window_start;
        for &(start, end) in &spans {
            if start < cursor || end > window_end {
                continue;
            }
            out.push_str(&text[cursor..start]);
            out.push_str(&self.pre_tag);
            out.push_str(&text[start..end]);
            out.push_str(&self.post_tag);
            cursor = end;
        }
        out.push_str(&text[cursor..window_end]);
        Some(out)
    }

    /// Fragment bounds around the first match, aligned to char boundaries.
    fn window(&self, text: &str, first_match: usize) -> (usize, usize) {
        if self.fragment_size == 0 || text.len() <= self.fragment_size {
            return (0, text.len());
        }
        let lead = self.fragment_size / 3;
        let start = first_match.saturating_sub(lead);
        let mut end = (start + self.fragment_size).min(text.len());
        let mut start = end.saturating_sub(self.fragment_size);
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }
        while end < text.len() && !text.is_char_boundary(end) {
            end += 1;
        }
        (start, end)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Highlighter::new("<em>", "</em>", 150)
    }
}
