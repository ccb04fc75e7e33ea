//! Blog markdown rendering.

use comrak::{Options, markdown_to_html};

/// Average reading speed used for the "N dk okuma" label.
const WORDS_PER_MINUTE: usize = 200;

/// Render a blog body to HTML with GitHub Flavored Markdown extensions.
///
/// Raw HTML is escaped: post bodies are written in the back office and must
/// not be able to inject script into the storefront.
#[must_use]
pub fn render(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    markdown_to_html(content, &options)
}

/// Estimated reading time in whole minutes, at least one.
#[must_use]
pub fn reading_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_gfm() {
        let html = render("# Kreatin Rehberi\n\n| Doz | Süre |\n|---|---|\n| 5g | 8 hafta |\n");
        assert!(html.contains("<h1>"));
        assert!(html.contains("Kreatin Rehberi"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = render("Merhaba <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_reading_minutes() {
        assert_eq!(reading_minutes(""), 1);
        assert_eq!(reading_minutes(&"kelime ".repeat(200)), 1);
        assert_eq!(reading_minutes(&"kelime ".repeat(201)), 2);
        assert_eq!(reading_minutes(&"kelime ".repeat(1000)), 5);
    }
}
