//! Footer removal.
//!
//! A body handed to the rebuilder may still carry a previous (usually
//! broken) cross-reference section. Everything from that section to the
//! end of input is discarded before objects are scanned.

use crate::config::FooterStrategy;
use lazy_static::lazy_static;

lazy_static! {
    /// First `xref` token, with the newlines directly in front of it
    static ref RE_FIRST_XREF: regex::bytes::Regex = regex::bytes::Regex::new(r"(?i-u)\n*xref").unwrap();

    /// `xref` or `trailer` keyword at the start of a line
    static ref RE_FOOTER_KEYWORD: regex::bytes::Regex =
        regex::bytes::Regex::new(r"(?-u)(?:^|[\r\n])(xref|trailer)\b").unwrap();
}

/// Strip the trailing footer section according to `strategy`.
///
/// Returns the cleaned body, a prefix of `data`.
pub fn strip_footer(data: &[u8], strategy: FooterStrategy) -> &[u8] {
    let cleaned = match strategy {
        FooterStrategy::FirstXrefToken => strip_from_first_xref(data),
        FooterStrategy::LastStartxref => strip_from_last_startxref(data),
        FooterStrategy::None => data,
    };

    if cleaned.len() != data.len() {
        log::debug!(
            "Stripped {} footer bytes ({:?}), body is {} bytes",
            data.len() - cleaned.len(),
            strategy,
            cleaned.len()
        );
    }
    cleaned
}

/// Cut at the first case-insensitive `xref`, including any `\n` run before it.
///
/// This also fires on `startxref`, `/XRefStm`, or `xref` inside stream data.
fn strip_from_first_xref(data: &[u8]) -> &[u8] {
    match RE_FIRST_XREF.find(data) {
        Some(m) => &data[..m.start()],
        None => data,
    }
}

/// Cut at the footer that ends with the last `startxref`.
///
/// The boundary is the first line-leading `xref` or `trailer` keyword
/// between the last `endobj` and that `startxref`; without one, the cut
/// is at `startxref` itself. Line breaks in front of the boundary go too.
fn strip_from_last_startxref(data: &[u8]) -> &[u8] {
    let Some(startxref) = rfind(data, b"startxref") else {
        return data;
    };

    let search_from = rfind(&data[..startxref], b"endobj")
        .map(|pos| pos + b"endobj".len())
        .unwrap_or(0);

    let mut boundary = RE_FOOTER_KEYWORD
        .captures(&data[search_from..startxref])
        .and_then(|caps| caps.get(1))
        .map(|keyword| search_from + keyword.start())
        .unwrap_or(startxref);

    while boundary > search_from && matches!(data[boundary - 1], b'\r' | b'\n') {
        boundary -= 1;
    }

    &data[..boundary]
}

/// Position of the last occurrence of `needle` in `haystack`.
fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";

    fn with_footer(body: &[u8]) -> Vec<u8> {
        let mut data = body.to_vec();
        data.extend_from_slice(
            b"\nxref\n0 2\n0000000000 65535 f \n0000000009 00000 n \n\ntrailer\n<< /Size 2 >>\nstartxref\n46\n%%EOF\n",
        );
        data
    }

    #[test]
    fn test_first_xref_strips_footer_and_newlines() {
        let data = with_footer(BODY);
        let cleaned = strip_footer(&data, FooterStrategy::FirstXrefToken);
        // The body's own trailing newline directly precedes `xref` and goes too
        assert_eq!(cleaned, &BODY[..BODY.len() - 1]);
    }

    #[test]
    fn test_first_xref_is_case_insensitive() {
        let data = b"1 0 obj\nnull\nendobj\n\n\nXREF\ngarbage";
        let cleaned = strip_footer(data, FooterStrategy::FirstXrefToken);
        assert_eq!(cleaned, b"1 0 obj\nnull\nendobj");
    }

    #[test]
    fn test_first_xref_without_footer_is_identity() {
        let cleaned = strip_footer(BODY, FooterStrategy::FirstXrefToken);
        assert_eq!(cleaned, BODY);
    }

    #[test]
    fn test_first_xref_fires_on_startxref() {
        let data = b"1 0 obj\nnull\nendobj\nstartxref\n0\n%%EOF";
        let cleaned = strip_footer(data, FooterStrategy::FirstXrefToken);
        assert_eq!(cleaned, b"1 0 obj\nnull\nendobj\nstart");
    }

    #[test]
    fn test_first_xref_fires_on_incidental_content() {
        let data = b"1 0 obj\n(see xref below)\nendobj\n";
        let cleaned = strip_footer(data, FooterStrategy::FirstXrefToken);
        assert_eq!(cleaned, b"1 0 obj\n(see ");
    }

    #[test]
    fn test_last_startxref_strips_full_footer() {
        let data = with_footer(BODY);
        let cleaned = strip_footer(&data, FooterStrategy::LastStartxref);
        assert_eq!(cleaned, b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj");
    }

    #[test]
    fn test_last_startxref_keeps_incidental_xref() {
        let mut body = b"1 0 obj\n(see xref below)\nendobj\n".to_vec();
        body.extend_from_slice(b"trailer\n<< /Size 2 >>\r\nstartxref\r\n0\r\n%%EOF\r\n");
        let cleaned = strip_footer(&body, FooterStrategy::LastStartxref);
        assert_eq!(cleaned, b"1 0 obj\n(see xref below)\nendobj");
    }

    #[test]
    fn test_last_startxref_without_keyword_cuts_at_startxref() {
        let data = b"1 0 obj\nnull\nendobj\r\nstartxref\n0\n%%EOF";
        let cleaned = strip_footer(data, FooterStrategy::LastStartxref);
        assert_eq!(cleaned, b"1 0 obj\nnull\nendobj");
    }

    #[test]
    fn test_last_startxref_without_startxref_is_identity() {
        let data = b"1 0 obj\nnull\nendobj\nxref\n";
        let cleaned = strip_footer(data, FooterStrategy::LastStartxref);
        assert_eq!(cleaned, data);
    }

    #[test]
    fn test_none_strategy_is_identity() {
        let data = with_footer(BODY);
        assert_eq!(strip_footer(&data, FooterStrategy::None), &data[..]);
    }

    #[test]
    fn test_rfind() {
        assert_eq!(rfind(b"abcabc", b"abc"), Some(3));
        assert_eq!(rfind(b"abc", b"abcd"), None);
        assert_eq!(rfind(b"abc", b""), None);
    }
}
