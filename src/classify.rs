//! Magic-bytes MIME classifier, replacing Python's `magic.from_buffer`.
//!
//! `infer` covers the binary formats (images, video, archives, fonts, ...)
//! the same way libmagic's compiled signature table does. libmagic also
//! recognizes HTML/plain text by content rather than by a magic number; we
//! approximate that with a small textual fallback, since `infer` is
//! deliberately scoped to binary formats only.
pub fn classify(head: &[u8]) -> String {
    if let Some(kind) = infer::get(head) {
        return kind.mime_type().to_string();
    }

    match std::str::from_utf8(head) {
        Ok(text) => {
            let probe = text.trim_start().to_ascii_lowercase();
            if probe.starts_with("<!doctype html") || probe.starts_with("<html") {
                "text/html".to_string()
            } else if looks_like_html_fragment(&probe) {
                "text/html".to_string()
            } else {
                "text/plain".to_string()
            }
        }
        Err(_) => "application/octet-stream".to_string(),
    }
}

/// A 128-byte prefix can land mid-document, missing a leading `<!doctype>`
/// or `<html>` — catch the common case of a page that opens straight into
/// `<head>`/`<body>` (e.g. fragments served without a doctype).
fn looks_like_html_fragment(probe: &str) -> bool {
    probe.starts_with("<head") || probe.starts_with("<body") || probe.starts_with("<!--")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_html_with_doctype() {
        let head = b"<!doctype html><html><title>Hi</title><body>Hello</body></html>";
        assert_eq!(classify(head), "text/html");
    }

    #[test]
    fn classifies_png_by_magic_bytes() {
        let mut head = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        head.extend(std::iter::repeat(0u8).take(120));
        assert_eq!(classify(&head), "image/png");
    }

    #[test]
    fn classifies_plain_text() {
        assert_eq!(classify(b"just some words, no markup here"), "text/plain");
    }

    #[test]
    fn classifies_binary_garbage_as_octet_stream() {
        let head: Vec<u8> = vec![0xff, 0xfe, 0x00, 0x01, 0x02, 0xC0, 0xC1];
        assert_eq!(classify(&head), "application/octet-stream");
    }
}
