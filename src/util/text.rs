use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis appended to truncated labels.
const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns (CJK and emoji count double).
///
/// ```
/// use sitenav::util::display_width;
///
/// assert_eq!(display_width("GitHub"), 6);
/// assert_eq!(display_width("百度"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string so it occupies at most `max_width` columns.
///
/// Appends "..." when text is cut, unless the width is too narrow to fit a
/// character plus the ellipsis, in which case as many characters as fit are
/// returned. Borrows when no truncation is needed.
///
/// ```
/// use sitenav::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Tencent Video", 10), "Tencent...");
/// assert_eq!(truncate_to_width("Baidu", 10), "Baidu");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut width = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

/// Make catalog text safe to draw on a single terminal line.
///
/// Catalog files are user-editable and may be fetched over HTTP, so titles
/// can carry ANSI sequences or control characters. CSI sequences
/// (`ESC [ ... final`) are dropped whole, other control characters are
/// dropped, and tabs/newlines become spaces.
pub fn sanitize_label(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for next in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&next) {
                            break;
                        }
                    }
                }
            }
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
