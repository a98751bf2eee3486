use shared::protocol::Citation;

pub const EXCERPT_MAX_CHARS: usize = 100;
pub const TRUNCATION_MARKER: &str = "...";
pub const SOURCES_LABEL: &str = "Sumber:";

/// Renders one citation as `Page <page>: <excerpt>`, cutting the excerpt at
/// [`EXCERPT_MAX_CHARS`] characters.
pub fn render_citation(citation: &Citation) -> String {
    format!("Page {}: {}", citation.page, truncate_excerpt(&citation.excerpt))
}

pub fn render_citations(citations: &[Citation]) -> Vec<String> {
    citations.iter().map(render_citation).collect()
}

/// The labelled source list printed under an answer, or `None` when the answer
/// carries no citations.
pub fn render_sources_block(citations: &[Citation]) -> Option<String> {
    if citations.is_empty() {
        return None;
    }

    let mut block = String::from(SOURCES_LABEL);
    for line in render_citations(citations) {
        block.push_str("\n  - ");
        block.push_str(&line);
    }
    Some(block)
}

/// Cuts `excerpt` to [`EXCERPT_MAX_CHARS`] characters, marking the cut.
pub fn truncate_excerpt(excerpt: &str) -> String {
    match excerpt.char_indices().nth(EXCERPT_MAX_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &excerpt[..cut]),
        None => excerpt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_excerpt_renders_unmodified() {
        let citation = Citation::new(3, "Revenue for Q1 was Rp 10B...");
        assert_eq!(
            render_citation(&citation),
            "Page 3: Revenue for Q1 was Rp 10B..."
        );
    }

    #[test]
    fn excerpt_at_limit_is_not_marked() {
        let excerpt = "a".repeat(EXCERPT_MAX_CHARS);
        let rendered = render_citation(&Citation::new(1, excerpt.clone()));
        assert_eq!(rendered, format!("Page 1: {excerpt}"));
    }

    #[test]
    fn long_excerpt_is_cut_at_limit_and_marked() {
        let excerpt = format!("{}{}", "b".repeat(EXCERPT_MAX_CHARS), "tail");
        let citation = Citation::new("notes", excerpt.clone());

        let rendered = render_citation(&citation);
        assert_eq!(
            rendered,
            format!("Page notes: {}...", "b".repeat(EXCERPT_MAX_CHARS))
        );
        assert_eq!(citation.excerpt, excerpt);
        assert_eq!(render_citation(&citation), rendered);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let excerpt = "é".repeat(EXCERPT_MAX_CHARS + 5);
        let rendered = render_citation(&Citation::new(0, excerpt));
        let body = rendered.strip_prefix("Page 0: ").expect("prefix");
        assert_eq!(body.chars().count(), EXCERPT_MAX_CHARS + TRUNCATION_MARKER.len());
    }

    #[test]
    fn empty_list_renders_nothing() {
        assert!(render_citations(&[]).is_empty());
        assert!(render_sources_block(&[]).is_none());
    }

    #[test]
    fn sources_block_lists_each_citation() {
        let block = render_sources_block(&[Citation::new(3, "first"), Citation::new(7, "second")])
            .expect("block");
        assert_eq!(block, "Sumber:\n  - Page 3: first\n  - Page 7: second");
    }
}
