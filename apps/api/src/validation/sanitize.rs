//! Shared sanitization primitives for untrusted text and filenames.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Longest filename we will store, in bytes.
const MAX_FILENAME_BYTES: usize = 255;

/// Markup/script constructs stripped from free text. Matched case-insensitively,
/// with `.` crossing newlines so multi-line blocks are caught.
static DANGEROUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)javascript:",
        r"(?i)vbscript:",
        r"(?i)data:",
        r"(?i)on\w+\s*=",
        r"(?is)<script[^>]*>.*?</script>",
        r"(?is)<iframe[^>]*>.*?</iframe>",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("sanitizer pattern compiles"))
    .collect()
});

/// Sanitizes free text before it is measured, stored, or echoed back.
///
/// Steps, in order:
/// 1. escape `&`, `<`, `>` (not quotes); `&` that already starts an entity is
///    left alone so a second pass over the output is a no-op,
/// 2. strip dangerous patterns until none remain,
/// 3. collapse whitespace runs to single spaces and trim,
/// 4. truncate to `max_length` characters if given.
pub fn sanitize_text_input(text: &str, max_length: Option<usize>) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut sanitized = escape_html(text);

    // Removal can splice a banned pattern back together, so repeat to a
    // fixpoint. Each replacement strictly shrinks the string.
    loop {
        let mut changed = false;
        for pattern in DANGEROUS_PATTERNS.iter() {
            if let Cow::Owned(replaced) = pattern.replace_all(&sanitized, "") {
                sanitized = replaced;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut sanitized = sanitized.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(max) = max_length {
        if let Some((end, _)) = sanitized.char_indices().nth(max) {
            sanitized.truncate(end);
            sanitized.truncate(sanitized.trim_end().len());
        }
    }

    sanitized
}

/// Sanitizes an uploaded filename: keeps only the final path segment, removes
/// characters that are unsafe in names, and caps the length at 255 bytes while
/// preserving the extension.
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename.rsplit('/').next().unwrap_or("");
    let name = name.rsplit('\\').next().unwrap_or("");

    let cleaned: String = name
        .chars()
        .filter(|&c| !matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*') && !is_control(c))
        .collect();

    let cleaned = cleaned.trim_matches(|c| c == '.' || c == ' ');
    if cleaned.is_empty() {
        return "unnamed_file".to_string();
    }
    if cleaned.len() <= MAX_FILENAME_BYTES {
        return cleaned.to_string();
    }

    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if ext.len() + 1 < MAX_FILENAME_BYTES => {
            let max_stem_bytes = MAX_FILENAME_BYTES - ext.len() - 1;
            format!("{}.{ext}", truncate_on_char_boundary(stem, max_stem_bytes))
        }
        _ => truncate_on_char_boundary(cleaned, MAX_FILENAME_BYTES).to_string(),
    }
}

/// Escapes `<`, `>` and bare `&`. Existing `&amp;`/`&lt;`/`&gt;` and numeric
/// entities pass through unchanged, which keeps the escape idempotent.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if !starts_entity(&text[idx + 1..]) => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Whether `rest` (the text following a `&`) begins a recognized entity.
fn starts_entity(rest: &str) -> bool {
    for known in ["amp;", "lt;", "gt;"] {
        if rest.starts_with(known) {
            return true;
        }
    }
    if let Some(num) = rest.strip_prefix('#') {
        let (body, hex) = match num.strip_prefix(['x', 'X']) {
            Some(b) => (b, true),
            None => (num, false),
        };
        if let Some(end) = body.find(';') {
            return end > 0
                && body[..end].chars().all(|c| {
                    if hex {
                        c.is_ascii_hexdigit()
                    } else {
                        c.is_ascii_digit()
                    }
                });
        }
    }
    false
}

fn is_control(c: char) -> bool {
    let code = c as u32;
    code < 0x20 || (0x7f..=0x9f).contains(&code)
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_block_is_neutralized() {
        let out = sanitize_text_input("<script>alert(1)</script>Hello", None);
        assert!(out.contains("Hello"));
        assert!(!out.contains("<script"));
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
    }

    #[test]
    fn test_javascript_scheme_stripped_any_case() {
        let out = sanitize_text_input("click JaVaScRiPt:alert(1) here", None);
        assert!(!out.to_lowercase().contains("javascript:"));
        assert!(out.contains("click"));
        assert!(out.contains("here"));
    }

    #[test]
    fn test_event_handler_attribute_stripped() {
        let out = sanitize_text_input("a onclick = doEvil() b onmouseover=x c", None);
        assert!(!out.contains("onclick"));
        assert!(!out.contains("onmouseover"));
    }

    #[test]
    fn test_data_and_vbscript_schemes_stripped() {
        let out = sanitize_text_input("data:text/html vbscript:msgbox", None);
        assert!(!out.contains("data:"));
        assert!(!out.contains("vbscript:"));
    }

    #[test]
    fn test_nested_scheme_does_not_survive_one_pass() {
        // Stripping the inner occurrence reassembles the outer one.
        let out = sanitize_text_input("jajavascript:vascript:alert(1)", None);
        assert!(!out.to_lowercase().contains("javascript:"));
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(sanitize_text_input("  a\t\tb\n\nc  ", None), "a b c");
    }

    #[test]
    fn test_ampersand_escaped_once() {
        assert_eq!(sanitize_text_input("Tom & Jerry", None), "Tom &amp; Jerry");
    }

    #[test]
    fn test_existing_entities_not_double_escaped() {
        assert_eq!(sanitize_text_input("5 &lt; 10 &amp; 2", None), "5 &lt; 10 &amp; 2");
        assert_eq!(sanitize_text_input("&#169; 2024", None), "&#169; 2024");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "<script>alert(1)</script>Hello",
            "Tom & Jerry <b>bold</b> javascript:x",
            "plain text with  spaces",
            "&amp; already escaped &lt;tag&gt;",
        ];
        for input in inputs {
            let once = sanitize_text_input(input, None);
            let twice = sanitize_text_input(&once, None);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_truncates_to_max_length() {
        let out = sanitize_text_input("one two three four", Some(8));
        assert_eq!(out, "one two");
        assert!(sanitize_text_input("short", Some(100)).len() <= 100);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_text_input("", None), "");
        assert_eq!(sanitize_text_input("   ", None), "");
    }

    #[test]
    fn test_filename_path_traversal_stripped() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"..\..\windows\system32"), "system32");
        assert_eq!(sanitize_filename(r"mixed/slash\name.pdf"), "name.pdf");
    }

    #[test]
    fn test_filename_dangerous_characters_removed() {
        assert_eq!(sanitize_filename("re<su>me?.pdf"), "resume.pdf");
        assert_eq!(sanitize_filename("a:b|c\"d*.docx"), "abcd.docx");
    }

    #[test]
    fn test_filename_control_characters_removed() {
        assert_eq!(sanitize_filename("cv\u{0}\u{1f}\u{7f}.pdf"), "cv.pdf");
    }

    #[test]
    fn test_filename_dots_and_spaces_trimmed() {
        assert_eq!(sanitize_filename("  .resume.pdf. "), "resume.pdf");
    }

    #[test]
    fn test_filename_empty_fallback() {
        assert_eq!(sanitize_filename(""), "unnamed_file");
        assert_eq!(sanitize_filename("..."), "unnamed_file");
        assert_eq!(sanitize_filename("dir/"), "unnamed_file");
    }

    #[test]
    fn test_filename_length_capped_preserving_extension() {
        let long = format!("{}.pdf", "a".repeat(300));
        let out = sanitize_filename(&long);
        assert!(out.len() <= 255);
        assert!(out.ends_with(".pdf"));
    }

    #[test]
    fn test_windows_reserved_names_pass_through() {
        // Reserved-device handling is intentionally not applied; the name is
        // only ever stored, never used as a path.
        assert_eq!(sanitize_filename("CON.pdf"), "CON.pdf");
    }
}
