//! Markdown rendering for blog posts.
//!
//! Posts are written by staff in the admin panel. Raw HTML and unsafe link
//! schemes are dropped from the output.

use comrak::{Options, markdown_to_html};

/// Render Markdown to HTML with the common GitHub extensions.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.render.r#unsafe = false;

    markdown_to_html(content, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_basic_markdown() {
        let html = render_markdown("## Cuidados\n\nLimpia tu **plata** con un paño suave.");
        assert!(html.contains("<h2>Cuidados</h2>"));
        assert!(html.contains("<strong>plata</strong>"));
    }

    #[test]
    fn test_raw_html_is_omitted() {
        let html = render_markdown("Hola <script>alert(1)</script> mundo");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_javascript_links_are_dropped() {
        let html = render_markdown("[clic](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_tables_are_enabled() {
        let html = render_markdown("| Quilates | Pureza |\n|---|---|\n| 14k | 58.3% |\n");
        assert!(html.contains("<table>"));
    }
}
