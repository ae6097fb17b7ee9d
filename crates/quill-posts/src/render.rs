//! Content filters turning raw post bodies into display-ready content.

use pulldown_cmark::{Options, Parser, html};

/// Transform from a raw post body to rendered content.
///
/// Any `Fn(&str) -> String` closure is a content filter.
pub trait ContentFilter: Send + Sync {
    /// Render a raw post body.
    fn render(&self, raw: &str) -> String;
}

impl<F> ContentFilter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn render(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Markdown to HTML content filter.
#[derive(Clone, Copy, Debug)]
pub struct MarkdownFilter {
    options: Options,
}

impl Default for MarkdownFilter {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl MarkdownFilter {
    /// Create a filter with custom parser options.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }
}

impl ContentFilter for MarkdownFilter {
    fn render(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(raw, self.options));
        out
    }
}
