//! HTML Extractor (§4.4): a pure, total `bytes -> {title, text}` transform.
//!
//! Parses with `scraper` (`html5ever` underneath) — the direct Rust
//! analogue of the original's `BeautifulSoup(html, 'lxml')` — strips
//! `script`/`style` subtrees, then applies the exact line/double-space
//! splitting and rejoin the spec calls for.

use scraper::{Html, Selector};

/// The result of extracting title and body text from an HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedHtml {
    pub title: String,
    pub text: String,
}

/// Extract `{title, text}` from raw HTML bytes. Total: malformed or
/// non-UTF-8 input yields empty fields rather than an error (§8 property 7).
pub fn extract(html: &[u8]) -> ExtractedHtml {
    let html = String::from_utf8_lossy(html);
    let document = Html::parse_document(&html);

    let title = extract_title(&document);
    let text = extract_text(&document);

    ExtractedHtml { title, text }
}

fn extract_title(document: &Html) -> String {
    let selector = Selector::parse("title").expect("static selector");
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_text(document: &Html) -> String {
    // Scope the walk to `<body>` so `<head>`/`<title>` text (already
    // captured separately by `extract_title`) doesn't bleed into the body
    // text — html5ever's tree construction always synthesizes a `<body>`,
    // even for a near-empty or fragment document.
    let body = Selector::parse("body").expect("static selector");
    let Some(body) = document.select(&body).next() else {
        return String::new();
    };

    let noise = Selector::parse("script, style").expect("static selector");
    let noise_nodes: std::collections::HashSet<_> = body
        .select(&noise)
        .flat_map(|el| el.descendants().map(|n| n.id()))
        .collect();

    let raw: String = body
        .descendants()
        .filter_map(|node| {
            if noise_nodes.contains(&node.id()) {
                return None;
            }
            node.value().as_text().map(|t| t.to_string())
        })
        .collect();

    // Break into lines, strip each; also split each line on the two-space
    // boundary BeautifulSoup's `get_text()` leaves between block elements,
    // strip each piece, drop empties, rejoin with a single newline.
    raw.lines()
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_collapses_whitespace() {
        let html = b"<!doctype html><html><title>Hi</title><body>Hello  world</body></html>";
        let result = extract(html);
        assert_eq!(result.title, "Hi");
        assert_eq!(result.text, "Hello\nworld");
    }

    #[test]
    fn strips_script_and_style_content() {
        let html = br#"<html><head><style>.a{color:red}</style>
            <script>alert(1)</script></head>
            <body><p>Visible text</p></body></html>"#;
        let result = extract(html);
        assert_eq!(result.text, "Visible text");
    }

    #[test]
    fn missing_title_yields_empty_string() {
        let html = b"<html><body>No title here</body></html>";
        let result = extract(html);
        assert_eq!(result.title, "");
        assert_eq!(result.text, "No title here");
    }

    #[test]
    fn totality_on_malformed_input() {
        let html = b"<html><body><p>unterminated";
        let result = extract(html);
        assert_eq!(result.text, "unterminated");

        let empty = extract(b"");
        assert_eq!(empty.title, "");
        assert_eq!(empty.text, "");

        let binary = extract(&[0xff, 0xfe, 0x00, 0x01]);
        assert_eq!(binary.title, "");
    }

    #[test]
    fn idempotent_on_already_cleaned_text() {
        let html = b"<html><body>Hello\nworld</body></html>";
        let first = extract(html);
        let reparsed = extract(format!("<html><body>{}</body></html>", first.text).as_bytes());
        assert_eq!(first.text, reparsed.text);
    }
}
