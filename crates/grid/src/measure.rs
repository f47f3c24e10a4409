//! Truncation detection for clipped cell text.
//!
//! A cell's text is clipped either by single-line overflow or by a
//! multi-line clamp. Scroll extents catch the first case cheaply but are
//! unreliable under clamping, so an inconclusive fast check on a clamped
//! cell falls back to measuring the same text, same font, same width, in an
//! unclamped probe. Without a clamp the scroll extents are trusted.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Default slack, in layout units, before a difference counts as clipping.
pub const TRUNCATION_TOLERANCE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Advance of a single-width character.
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self { char_width: 8.0, line_height: 16.0 }
    }
}

/// Layout readout of one rendered cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementMetrics {
    pub scroll_width: f32,
    pub client_width: f32,
    pub scroll_height: f32,
    pub client_height: f32,
    /// Width available to the text, padding excluded.
    pub content_width: f32,
    /// Height the text actually occupies on screen after clamping.
    pub clamped_height: f32,
    /// Visible line limit; `None` (or 0) when the cell is not line-clamped.
    pub line_clamp: Option<u16>,
    pub font: FontMetrics,
}

/// The text of a cell together with how it was laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureTarget<'a> {
    pub text: &'a str,
    pub metrics: ElementMetrics,
}

/// Off-screen layout without a clamp.
pub trait MeasureProbe {
    /// Height `text` needs when wrapped at `width` with `font`.
    fn natural_height(&mut self, text: &str, font: &FontMetrics, width: f32) -> f32;
}

/// Fast path: scroll extents exceed visible extents on either axis.
pub fn overflows(metrics: &ElementMetrics, tolerance: f32) -> bool {
    metrics.scroll_width - metrics.client_width > tolerance
        || metrics.scroll_height - metrics.client_height > tolerance
}

pub fn is_text_truncated<P: MeasureProbe + ?Sized>(
    target: &MeasureTarget<'_>,
    probe: &mut P,
    tolerance: f32,
) -> bool {
    let text = target.text.trim();
    if text.is_empty() {
        return false;
    }
    let m = &target.metrics;
    if overflows(m, tolerance) {
        return true;
    }
    if !m.line_clamp.is_some_and(|lines| lines > 0) {
        return false;
    }
    let natural = probe.natural_height(text, &m.font, m.content_width);
    natural - m.clamped_height > tolerance
}

/// Probe for fixed-advance fonts: greedy word wrap, one line height per line.
#[derive(Debug, Default)]
pub struct MonospaceProbe {
    measurements: usize,
}

impl MonospaceProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many texts this probe has laid out.
    pub fn measurements(&self) -> usize {
        self.measurements
    }
}

impl MeasureProbe for MonospaceProbe {
    fn natural_height(&mut self, text: &str, font: &FontMetrics, width: f32) -> f32 {
        self.measurements += 1;
        let columns = if font.char_width > 0.0 {
            (width / font.char_width).floor().max(1.0) as usize
        } else {
            usize::MAX
        };
        wrap_text(text, columns).len() as f32 * font.line_height
    }
}

/// Greedy word wrap by display width.
///
/// Explicit newlines start a new line; words wider than `columns` are broken
/// at character boundaries. Always returns at least one (possibly empty) line.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut used = 0usize;

        for word in paragraph.split_whitespace() {
            let w = word.width();
            if used > 0 && used + 1 + w <= columns {
                current.push(' ');
                current.push_str(word);
                used += 1 + w;
                continue;
            }
            if used > 0 {
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            if w <= columns {
                current.push_str(word);
                used = w;
                continue;
            }
            for ch in word.chars() {
                let cw = ch.width().unwrap_or(0);
                if used > 0 && used + cw > columns {
                    lines.push(std::mem::take(&mut current));
                    used = 0;
                }
                current.push(ch);
                used += cw;
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FONT: FontMetrics = FontMetrics { char_width: 8.0, line_height: 16.0 };

    /// Metrics of a cell whose scroll extents report no overflow.
    fn clamped(width_cols: usize, lines: u16) -> ElementMetrics {
        let w = width_cols as f32 * FONT.char_width;
        let h = lines as f32 * FONT.line_height;
        ElementMetrics {
            scroll_width: w,
            client_width: w,
            scroll_height: h,
            client_height: h,
            content_width: w,
            clamped_height: h,
            line_clamp: Some(lines),
            font: FONT,
        }
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("kommer etter jobb", 10), vec!["kommer", "etter jobb"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap_text("abcdefghijkl", 5), vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_wrap_counts_wide_chars() {
        // each CJK char is two columns wide
        assert_eq!(wrap_text("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn test_fast_path_single_line_overflow() {
        let mut m = clamped(10, 1);
        m.scroll_width = m.client_width + 40.0;
        let mut probe = MonospaceProbe::new();
        let target = MeasureTarget { text: "a very long comment", metrics: m };
        assert!(is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
        assert_eq!(probe.measurements(), 0);
    }

    #[test]
    fn test_fast_path_within_tolerance_is_inconclusive() {
        let mut m = clamped(10, 1);
        m.scroll_width = m.client_width + 2.0;
        let mut probe = MonospaceProbe::new();
        let target = MeasureTarget { text: "short", metrics: m };
        assert!(!is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
        assert_eq!(probe.measurements(), 1);
    }

    #[test]
    fn test_clamped_multiline_detected_by_probe() {
        // 3 lines of text in a 2-line clamp, scroll metrics report nothing
        let target = MeasureTarget {
            text: "kan komme sent men kommer uansett",
            metrics: clamped(12, 2),
        };
        let mut probe = MonospaceProbe::new();
        assert!(is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
        assert_eq!(probe.measurements(), 1);
    }

    #[test]
    fn test_unclamped_cell_trusts_scroll_extents() {
        let mut m = clamped(12, 2);
        m.line_clamp = None;
        let target = MeasureTarget { text: "kan komme sent men kommer uansett", metrics: m };
        let mut probe = MonospaceProbe::new();
        assert!(!is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
        assert_eq!(probe.measurements(), 0);

        let target = MeasureTarget { metrics: ElementMetrics { line_clamp: Some(0), ..m }, ..target };
        assert!(!is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
        assert_eq!(probe.measurements(), 0);
    }

    #[test]
    fn test_text_exactly_filling_clamp_is_not_truncated() {
        let target = MeasureTarget { text: "kommer etter jobb", metrics: clamped(10, 2) };
        let mut probe = MonospaceProbe::new();
        assert!(!is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
    }

    #[test]
    fn test_blank_text_never_truncated() {
        let mut m = clamped(1, 1);
        m.scroll_width = 500.0;
        let mut probe = MonospaceProbe::new();
        assert!(!is_text_truncated(&MeasureTarget { text: "   ", metrics: m }, &mut probe, 2.0));
    }

    proptest! {
        #[test]
        fn prop_text_narrower_than_container_is_never_truncated(
            text in "[a-z]{1,12}",
            extra in 0usize..20,
            lines in 1u16..4,
        ) {
            let cols = text.len() + extra;
            let target = MeasureTarget { text: &text, metrics: clamped(cols, lines) };
            let mut probe = MonospaceProbe::new();
            prop_assert!(!is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
        }

        #[test]
        fn prop_natural_height_beyond_clamp_is_always_truncated(
            words in proptest::collection::vec("[a-z]{3,8}", 4..12),
            cols in 8usize..16,
            clamp in 1u16..3,
        ) {
            let text = words.join(" ");
            let metrics = clamped(cols, clamp);
            let mut probe = MonospaceProbe::new();
            let natural = probe.natural_height(&text, &FONT, metrics.content_width);
            let target = MeasureTarget { text: &text, metrics };
            if natural - metrics.clamped_height > TRUNCATION_TOLERANCE {
                prop_assert!(is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
            } else {
                prop_assert!(!is_text_truncated(&target, &mut probe, TRUNCATION_TOLERANCE));
            }
        }
    }
}
