use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Calculates the display width of a string in terminal columns.
///
/// Unicode-aware: CJK characters and emoji count as 2 columns, combining
/// marks as 0, plain ASCII as 1.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within a maximum display width, appending "..."
/// when text was cut off.
///
/// Returns `Cow::Borrowed` when the string already fits (no allocation).
/// For widths of 3 columns or less there is no room for a character plus the
/// ellipsis, so as many characters as fit are returned without one.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    if max_width <= ELLIPSIS_WIDTH {
        let mut width = 0;
        let mut end = 0;
        for (idx, c) in s.char_indices() {
            let w = UnicodeWidthChar::width(c).unwrap_or(0);
            if width + w > max_width {
                break;
            }
            width += w;
            end = idx + c.len_utf8();
        }
        return Cow::Owned(s[..end].to_string());
    }

    let target = max_width - ELLIPSIS_WIDTH;
    let mut width = 0;
    let mut cut = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > target {
            cut = idx;
            break;
        }
        width += w;
        cut = idx + c.len_utf8();
    }
    Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
}

/// Sanitize a clipboard payload before inserting it into the notes buffer.
///
/// The paste path takes the clipboard's plain-text payload verbatim — no
/// markup interpretation — but the terminal must never render control bytes,
/// so this strips:
///
/// - ASCII control chars other than tab and newline
/// - ANSI CSI sequences (`\x1b[` ... final byte) and bare ESC bytes
///
/// Carriage returns are folded into newlines (`\r\n` and lone `\r` both
/// become `\n`). Printable text, including characters like `<` and `>`,
/// passes through untouched.
pub fn sanitize_paste(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push('\n');
                }
                // \r\n: the \n that follows is pushed on its own
            }
            '\x1b' => {
                // CSI sequence: skip parameter bytes until the final byte
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                // Bare ESC (or ESC + other introducer): dropped
            }
            '\t' | '\n' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width_ascii() {
        assert_eq!(display_width("Hello"), 5);
    }

    #[test]
    fn test_display_width_cjk() {
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_to_width("Short", 10), "Short");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
    }

    #[test]
    fn test_sanitize_preserves_markup_like_text() {
        // Pasted text is literal — no HTML interpretation
        assert_eq!(sanitize_paste("a<b>"), "a<b>");
    }

    #[test]
    fn test_sanitize_folds_crlf() {
        assert_eq!(sanitize_paste("one\r\ntwo\rthree"), "one\ntwo\nthree");
    }

    #[test]
    fn test_sanitize_strips_ansi() {
        assert_eq!(sanitize_paste("red\x1b[31mtext\x1b[0m"), "redtext");
    }

    #[test]
    fn test_sanitize_keeps_tabs_and_newlines() {
        assert_eq!(sanitize_paste("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn test_sanitize_strips_control_bytes() {
        assert_eq!(sanitize_paste("a\x00b\x07c"), "abc");
    }
}
