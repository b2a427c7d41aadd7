//! Prompt templates for the generation collaborator.
//!
//! Each template takes the retrieved documentation (`{docs}`) and the
//! user's question (`{query}`). Rendering is plain substitution; the
//! rendered string is handed to an opaque text-generation service.

/// Answer displayed when retrieval produces nothing usable.
pub const NOT_FOUND_ANSWER: &str = "Not found in provided documentation";

pub const EXPLAIN_ENDPOINT: &str = "\
You are an API documentation assistant. Use ONLY the retrieved \
documentation below to answer.

Retrieved Documentation:
{docs}

Question: {query}

Instructions:
- Explain the API endpoint based solely on the retrieved documentation.
- If the information is not present, respond with: \"Not found in provided documentation\"
- End your answer with source references (page number and/or section name).
- Be concise and accurate.

Answer:
";

pub const GENERATE_PYTHON: &str = "\
You are a code generation assistant. Use ONLY the retrieved \
documentation below to write Python code using the requests library.

Retrieved Documentation:
{docs}

Task: {query}

Instructions:
- Generate Python code that calls the API as documented.
- Use the requests library.
- If the required information is not present, respond with: \"Not found in provided documentation\"
- Add comments citing the source (page number and/or section name).
- The code must be syntactically correct.

Generated Code:
";

pub const GENERATE_JAVASCRIPT: &str = "\
You are a code generation assistant. Use ONLY the retrieved \
documentation below to write JavaScript code using Axios.

Retrieved Documentation:
{docs}

Task: {query}

Instructions:
- Generate JavaScript code that calls the API as documented.
- Use the Axios library.
- If the required information is not present, respond with: \"Not found in provided documentation\"
- Add comments citing the source (page number and/or section name).
- The code must be syntactically correct.

Generated Code:
";

pub const GENERATE_CURL: &str = "\
You are a command generation assistant. Use ONLY the retrieved \
documentation below to write curl commands.

Retrieved Documentation:
{docs}

Task: {query}

Instructions:
- Generate curl commands matching the documented API.
- If the required information is not present, respond with: \"Not found in provided documentation\"
- Add comments citing the source (page number and/or section name).
- The commands must be correctly formatted.

Generated Commands:
";

/// Substitute `{docs}` and `{query}` into a template.
pub fn render(template: &str, docs: &str, query: &str) -> String {
    template.replace("{docs}", docs).replace("{query}", query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_both_placeholders() {
        let rendered = render(EXPLAIN_ENDPOINT, "DOC BODY", "my question");
        assert!(rendered.contains("DOC BODY"));
        assert!(rendered.contains("my question"));
        assert!(!rendered.contains("{docs}"));
        assert!(!rendered.contains("{query}"));
    }

    #[test]
    fn every_template_has_both_placeholders() {
        for template in [
            EXPLAIN_ENDPOINT,
            GENERATE_PYTHON,
            GENERATE_JAVASCRIPT,
            GENERATE_CURL,
        ] {
            assert!(template.contains("{docs}"));
            assert!(template.contains("{query}"));
        }
    }
}
