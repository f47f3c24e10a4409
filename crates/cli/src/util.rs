use unicode_width::UnicodeWidthStr;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
/// Uses Unicode display width so CJK/emoji alignment stays correct.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if width < 3 {
        // Just return the first char if it fits, else empty
        for ch in s.chars() {
            let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if cw <= width {
                return ch.to_string();
            }
        }
        return String::new();
    }

    let str_width = UnicodeWidthStr::width(s);
    if str_width <= width {
        return s.to_string();
    }

    // Walk chars, accumulating display width, stop at width - 2 to leave room for ".."
    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }

    format!("{}..", &s[..end_byte])
}

/// Pad or truncate a string to exactly `width` display columns.
/// If shorter, right-pads with spaces. If longer, truncates with "..".
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Center a string within `width` display columns (truncating if too wide).
pub(crate) fn center(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    if sw >= width {
        return pad_right(s, width);
    }
    let left = (width - sw) / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(width - sw - left))
}

/// Wrap `s` to `width` columns and keep at most `max_lines` lines.
/// When lines were dropped, the last kept line ends in "..".
pub(crate) fn clamp_lines(s: &str, width: usize, max_lines: usize) -> Vec<String> {
    let wrapped = duudl_grid::measure::wrap_text(s, width);
    if max_lines == 0 {
        return Vec::new();
    }
    if wrapped.len() <= max_lines {
        return wrapped;
    }
    let mut kept: Vec<String> = wrapped[..max_lines].to_vec();
    if let Some(last) = kept.last_mut() {
        let room = width.saturating_sub(2);
        *last = format!("{}..", truncate_display(last, room.max(1)).trim_end_matches(".."));
    }
    kept
}
