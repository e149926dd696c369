//! Description normalization — turns job-posting HTML into Markdown-ish plain text.
//!
//! The steps run in a fixed order: structural tags are rewritten first, then
//! every remaining tag is stripped, then entities are decoded. Stripping before
//! the structural rewrites would lose paragraphs, bullets and headings.

use std::sync::LazyLock;

use regex::Regex;

static LINE_ENDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n?").expect("valid regex"));
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static PARAGRAPH_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>").expect("valid regex"));
static PARAGRAPH_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p\s*>").expect("valid regex"));
static LIST_ITEM_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<li(?:\s[^>]*)?>").expect("valid regex"));
static LIST_ITEM_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</li\s*>").expect("valid regex"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h[1-6](?:\s[^>]*)?>(.*?)</h[1-6]\s*>").expect("valid regex")
});
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:strong|b)(?:\s[^>]*)?>").expect("valid regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:em|i)(?:\s[^>]*)?>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static EXTRA_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[ \t]*\n){3,}").expect("valid regex"));

/// `&amp;` is last so `&amp;lt;` decodes to the literal text `&lt;`.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#x27;", "'"),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Normalizes a raw (HTML) job description into readable text.
///
/// - CRLF and lone CR line endings become `\n`
/// - `<br>` and `</p>` become newlines
/// - `<li>` items become `• ` lines
/// - headings become `**Heading**` lines
/// - `<strong>`/`<b>` become `**`, `<em>`/`<i>` become `*`
/// - remaining tags are stripped, common entities decoded
/// - runs of blank lines collapse to a single blank line
pub fn normalize_description(raw: &str) -> String {
    let text = LINE_ENDING.replace_all(raw, "\n");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = PARAGRAPH_OPEN.replace_all(&text, "");
    let text = PARAGRAPH_CLOSE.replace_all(&text, "\n");
    let text = LIST_ITEM_OPEN.replace_all(&text, "• ");
    let text = LIST_ITEM_CLOSE.replace_all(&text, "\n");
    let text = HEADING.replace_all(&text, "\n**$1**\n");
    let text = BOLD.replace_all(&text, "**");
    let text = ITALIC.replace_all(&text, "*");
    let text = ANY_TAG.replace_all(&text, "");

    let decoded = decode_entities(&text);
    let collapsed = EXTRA_BLANK_LINES.replace_all(&decoded, "\n\n");

    collapsed.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, plain)| acc.replace(entity, plain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_and_list_become_lines() {
        let html = "<p>Hello</p><ul><li>One</li><li>Two</li></ul>";
        assert_eq!(normalize_description(html), "Hello\n• One\n• Two");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(normalize_description("A &amp; B &lt;3&gt;"), "A & B <3>");
    }

    #[test]
    fn test_amp_is_decoded_last() {
        assert_eq!(normalize_description("&amp;lt;tag&amp;gt;"), "&lt;tag&gt;");
    }

    #[test]
    fn test_quotes_and_nbsp() {
        assert_eq!(
            normalize_description("&quot;fast&quot;&nbsp;&amp;&nbsp;it&#x27;s fun"),
            "\"fast\" & it's fun"
        );
    }

    #[test]
    fn test_headings_are_bolded() {
        let html = "<h2>About the role</h2><p>Build things.</p>";
        assert_eq!(
            normalize_description(html),
            "**About the role**\nBuild things."
        );
    }

    #[test]
    fn test_emphasis_markers() {
        let html = "<p><strong>Must</strong> know <em>Rust</em> and <b>SQL</b></p>";
        assert_eq!(normalize_description(html), "**Must** know *Rust* and **SQL**");
    }

    #[test]
    fn test_bold_pattern_does_not_eat_br_or_body() {
        let html = "<body>line one<br/>line two<br>three</body>";
        assert_eq!(normalize_description(html), "line one\nline two\nthree");
    }

    #[test]
    fn test_blank_line_runs_collapse_to_one() {
        let html = "Intro<br><br><br><br>   <br>Outro";
        assert_eq!(normalize_description(html), "Intro\n\nOutro");
    }

    #[test]
    fn test_crlf_blank_lines_collapse() {
        assert_eq!(normalize_description("A\r\n\r\n\r\n\r\nB"), "A\n\nB");
        assert_eq!(normalize_description("One\r\nTwo\rThree"), "One\nTwo\nThree");
    }

    #[test]
    fn test_attributes_on_structural_tags() {
        let html = r#"<p class="lead">Hi</p><li data-x="1">Item</li>"#;
        assert_eq!(normalize_description(html), "Hi\n• Item");
    }

    #[test]
    fn test_unknown_tags_are_stripped() {
        let html = r#"<div><span>Plain</span> <a href="/x">link</a></div>"#;
        assert_eq!(normalize_description(html), "Plain link");
    }

    #[test]
    fn test_plain_text_passes_through_trimmed() {
        assert_eq!(normalize_description("  Great engineering role \n"), "Great engineering role");
    }
}
