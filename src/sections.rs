//! Heuristic section detection for API documentation.
//!
//! A small set of named regex patterns marks where documentation
//! subsections begin (endpoint definitions, parameter lists,
//! authentication notes, error tables). The chunker uses these markers
//! to tag each chunk with the section it falls under; the pattern set
//! is a strategy that can be swapped without touching chunking logic.

use regex::Regex;

/// A detected section boundary in the concatenated document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMarker {
    /// Byte offset of the match start.
    pub offset: usize,
    /// Category label for the section.
    pub name: &'static str,
}

/// Named section patterns applied to the full document buffer.
pub struct SectionPatterns {
    patterns: Vec<(&'static str, Regex)>,
}

impl SectionPatterns {
    /// Pattern set for REST API documentation.
    ///
    /// All patterns are case-insensitive. Heading-based categories accept
    /// any number of leading `#` marks.
    pub fn api_documentation() -> Self {
        let patterns = vec![
            pattern("endpoints", r"(?i)(GET|POST|PUT|DELETE|PATCH)\s+(/\w+)+"),
            pattern("parameters", r"(?i)#+\s*parameters?"),
            pattern("authentication", r"(?i)#+\s*auth(?:entication)?"),
            pattern("errors", r"(?i)#+\s*errors?"),
        ];
        Self { patterns }
    }

    /// Scan `text` and return all section markers sorted by offset.
    ///
    /// The sort is stable, so markers matching at the same offset keep
    /// the category declaration order.
    pub fn markers(&self, text: &str) -> Vec<SectionMarker> {
        let mut markers = Vec::new();
        for (name, regex) in &self.patterns {
            for m in regex.find_iter(text) {
                markers.push(SectionMarker {
                    offset: m.start(),
                    name,
                });
            }
        }
        markers.sort_by_key(|m| m.offset);
        markers
    }
}

impl Default for SectionPatterns {
    fn default() -> Self {
        Self::api_documentation()
    }
}

fn pattern(name: &'static str, source: &str) -> (&'static str, Regex) {
    let regex = Regex::new(source).expect("section pattern must compile");
    (name, regex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_http_method_endpoints() {
        let patterns = SectionPatterns::default();
        let markers = patterns.markers("Use GET /users/list to fetch users.");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].name, "endpoints");
        assert_eq!(markers[0].offset, 4);
    }

    #[test]
    fn endpoint_match_is_case_insensitive() {
        let patterns = SectionPatterns::default();
        let markers = patterns.markers("post /orders creates an order");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].name, "endpoints");
    }

    #[test]
    fn heading_depth_does_not_matter() {
        let patterns = SectionPatterns::default();
        for heading in ["# Authentication", "## AUTH", "#### authentication"] {
            let markers = patterns.markers(heading);
            assert_eq!(markers.len(), 1, "no match for {heading:?}");
            assert_eq!(markers[0].name, "authentication");
        }
    }

    #[test]
    fn singular_and_plural_headings_match() {
        let patterns = SectionPatterns::default();
        assert_eq!(patterns.markers("## Parameter")[0].name, "parameters");
        assert_eq!(patterns.markers("## Parameters")[0].name, "parameters");
        assert_eq!(patterns.markers("## Error")[0].name, "errors");
        assert_eq!(patterns.markers("## Errors")[0].name, "errors");
    }

    #[test]
    fn markers_sorted_by_offset_across_categories() {
        let patterns = SectionPatterns::default();
        let text = "## Errors\nsee below\n## Authentication\nGET /token";
        let markers = patterns.markers(text);
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].name, "errors");
        assert_eq!(markers[1].name, "authentication");
        assert_eq!(markers[2].name, "endpoints");
        assert!(markers.windows(2).all(|w| w[0].offset <= w[1].offset));
    }

    #[test]
    fn text_without_sections_yields_no_markers() {
        let patterns = SectionPatterns::default();
        assert!(patterns.markers("just prose, nothing else").is_empty());
    }

    #[test]
    fn bare_method_without_path_is_not_an_endpoint() {
        let patterns = SectionPatterns::default();
        assert!(patterns.markers("GET requests are idempotent").is_empty());
    }
}
