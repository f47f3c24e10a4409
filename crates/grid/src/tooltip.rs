//! Floating tooltip for clipped cell text.
//!
//! Knows nothing about the grid: callers hand it a pointer position, the
//! viewport, and the hovered cell's text and layout. It shows the full text
//! only when the cell is actually clipped.

use crate::geometry::{Point, Rect, Size};
use crate::measure::{is_text_truncated, MeasureProbe, MeasureTarget, MonospaceProbe, TRUNCATION_TOLERANCE};

/// Gap between the anchor and a pinned tooltip.
const PINNED_GAP: f32 = 8.0;
/// Viewport padding for pinned tooltips.
const PINNED_PADDING: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipConfig {
    pub offset_x: f32,
    pub offset_y: f32,
    pub viewport_padding: f32,
    /// Width kept free at the right edge so the tooltip never gets squeezed.
    pub min_width: f32,
    pub tolerance: f32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_x: 12.0,
            offset_y: 12.0,
            viewport_padding: 12.0,
            min_width: 260.0,
            tolerance: TRUNCATION_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub position: Point,
}

/// Preferred side for a pinned tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Below,
    Above,
}

pub struct TooltipEngine<P: MeasureProbe + Default = MonospaceProbe> {
    config: TooltipConfig,
    probe: Option<P>,
    hover: Option<Tooltip>,
    pinned: Option<Tooltip>,
}

impl<P: MeasureProbe + Default> TooltipEngine<P> {
    pub fn new(config: TooltipConfig) -> Self {
        Self { config, probe: None, hover: None, pinned: None }
    }

    pub fn config(&self) -> &TooltipConfig {
        &self.config
    }

    /// Hover tooltip currently shown, if any.
    pub fn hover(&self) -> Option<&Tooltip> {
        self.hover.as_ref()
    }

    pub fn pinned(&self) -> Option<&Tooltip> {
        self.pinned.as_ref()
    }

    /// Whether the off-screen probe has been created yet.
    pub fn has_probe(&self) -> bool {
        self.probe.is_some()
    }

    pub fn probe(&self) -> Option<&P> {
        self.probe.as_ref()
    }

    pub fn is_truncated(&mut self, target: &MeasureTarget<'_>) -> bool {
        let tolerance = self.config.tolerance;
        // Empty text needs no probe.
        if target.text.trim().is_empty() {
            return false;
        }
        let probe = self.probe.get_or_insert_with(P::default);
        is_text_truncated(target, probe, tolerance)
    }

    /// Track the pointer over the container.
    ///
    /// `target` is the qualifying cell under the pointer, or `None` when the
    /// pointer is over anything else.
    pub fn on_pointer_move(
        &mut self,
        pos: Point,
        viewport: Size,
        target: Option<&MeasureTarget<'_>>,
    ) -> Option<&Tooltip> {
        let Some(target) = target else {
            self.hover = None;
            return None;
        };
        let text = target.text.trim();
        if text.is_empty() || !self.is_truncated(target) {
            self.hover = None;
            return None;
        }

        let position = self.follow_position(pos, viewport);
        self.hover = Some(Tooltip { text: text.to_string(), position });
        self.hover.as_ref()
    }

    /// Pointer left the container.
    pub fn on_pointer_leave(&mut self) {
        self.hover = None;
    }

    /// Top-left corner for a tooltip following the pointer, clamped to the viewport.
    pub fn follow_position(&self, pos: Point, viewport: Size) -> Point {
        let c = &self.config;
        let pad = c.viewport_padding;
        let reserve = c.min_width.min(viewport.width - 2.0 * pad);
        let max_x = viewport.width - pad - reserve;
        let max_y = viewport.height - pad;

        Point {
            x: (pos.x + c.offset_x).clamp(pad, pad.max(max_x)),
            y: (pos.y + c.offset_y).clamp(pad, pad.max(max_y)),
        }
    }

    /// Pin a tooltip next to `anchor`, flipping sides when the preferred one
    /// runs off-screen. Blank text hides the pinned tooltip instead.
    pub fn show_near(
        &mut self,
        anchor: Rect,
        tip: Size,
        text: &str,
        prefer: Placement,
        viewport: Size,
    ) -> Option<&Tooltip> {
        let text = text.trim();
        if text.is_empty() {
            self.pinned = None;
            return None;
        }
        let position = pinned_position(anchor, tip, prefer, viewport, self.config.min_width);
        Some(self.pinned.insert(Tooltip { text: text.to_string(), position }))
    }

    pub fn hide_pinned(&mut self) {
        self.pinned = None;
    }

    pub fn hide(&mut self) {
        self.hover = None;
        self.pinned = None;
    }
}

fn pinned_position(anchor: Rect, tip: Size, prefer: Placement, viewport: Size, min_width: f32) -> Point {
    let pad = PINNED_PADDING;
    let below = anchor.bottom() + PINNED_GAP;
    let above = anchor.y - tip.height - PINNED_GAP;
    let fits_below = below + tip.height <= viewport.height - pad;
    let fits_above = above >= pad;

    let y = match prefer {
        Placement::Below if !fits_below && fits_above => above,
        Placement::Below => below,
        Placement::Above if !fits_above && fits_below => below,
        Placement::Above => above,
    };

    // Same right-edge reservation as the hover tooltip, whatever the tip's width.
    let reserve = min_width.min(viewport.width - 2.0 * pad);
    let max_x = viewport.width - pad - reserve;
    let max_y = viewport.height - pad - tip.height;

    Point {
        x: (anchor.x + PINNED_GAP).clamp(pad, pad.max(max_x)),
        y: y.clamp(pad, pad.max(max_y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{ElementMetrics, FontMetrics};

    fn metrics(cols: f32, lines: f32) -> ElementMetrics {
        let font = FontMetrics::default();
        let w = cols * font.char_width;
        let h = lines * font.line_height;
        ElementMetrics {
            scroll_width: w,
            client_width: w,
            scroll_height: h,
            client_height: h,
            content_width: w,
            clamped_height: h,
            line_clamp: Some(lines as u16),
            font,
        }
    }

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    #[test]
    fn test_shows_for_clipped_text_at_offset() {
        let mut engine: TooltipEngine = TooltipEngine::new(TooltipConfig::default());
        let target = MeasureTarget { text: "  kan komme sent men kommer uansett ", metrics: metrics(12.0, 2.0) };
        let tip = engine.on_pointer_move(Point::new(100.0, 100.0), VIEWPORT, Some(&target)).cloned();
        assert_eq!(
            tip,
            Some(Tooltip { text: "kan komme sent men kommer uansett".into(), position: Point::new(112.0, 112.0) })
        );
    }

    #[test]
    fn test_hides_when_not_clipped_or_empty() {
        let mut engine: TooltipEngine = TooltipEngine::new(TooltipConfig::default());
        let long = MeasureTarget { text: "kan komme sent men kommer uansett", metrics: metrics(12.0, 2.0) };
        engine.on_pointer_move(Point::new(10.0, 10.0), VIEWPORT, Some(&long));
        assert!(engine.hover().is_some());

        let short = MeasureTarget { text: "ok", metrics: metrics(12.0, 2.0) };
        assert!(engine.on_pointer_move(Point::new(10.0, 10.0), VIEWPORT, Some(&short)).is_none());

        engine.on_pointer_move(Point::new(10.0, 10.0), VIEWPORT, Some(&long));
        let empty = MeasureTarget { text: "", metrics: metrics(12.0, 2.0) };
        assert!(engine.on_pointer_move(Point::new(10.0, 10.0), VIEWPORT, Some(&empty)).is_none());

        engine.on_pointer_move(Point::new(10.0, 10.0), VIEWPORT, Some(&long));
        engine.on_pointer_leave();
        assert!(engine.hover().is_none());
    }

    #[test]
    fn test_probe_created_lazily_and_reused() {
        let mut engine: TooltipEngine = TooltipEngine::new(TooltipConfig::default());
        assert!(!engine.has_probe());
        let target = MeasureTarget { text: "kan komme sent men kommer uansett", metrics: metrics(12.0, 2.0) };
        engine.is_truncated(&target);
        engine.is_truncated(&target);
        assert_eq!(engine.probe().map(|p| p.measurements()), Some(2));
    }

    #[test]
    fn test_follow_position_reserves_min_width_at_right_edge() {
        let engine: TooltipEngine = TooltipEngine::new(TooltipConfig::default());
        // 800 - 12 - 260 = 528
        let p = engine.follow_position(Point::new(790.0, 595.0), VIEWPORT);
        assert_eq!(p, Point::new(528.0, 588.0));
        let p = engine.follow_position(Point::new(-50.0, -50.0), VIEWPORT);
        assert_eq!(p, Point::new(12.0, 12.0));
    }

    #[test]
    fn test_follow_position_narrow_viewport_pins_to_padding() {
        let engine: TooltipEngine = TooltipEngine::new(TooltipConfig::default());
        let p = engine.follow_position(Point::new(100.0, 50.0), Size::new(200.0, 400.0));
        assert_eq!(p.x, 12.0);
    }

    #[test]
    fn test_show_near_flips_when_off_screen() {
        let mut engine: TooltipEngine = TooltipEngine::new(TooltipConfig::default());
        let tip = Size::new(300.0, 48.0);
        let mut pin = |anchor: Rect, prefer| engine.show_near(anchor, tip, "x", prefer, VIEWPORT).map(|t| t.position);

        assert_eq!(pin(Rect::new(40.0, 100.0, 96.0, 32.0), Placement::Below), Some(Point::new(48.0, 140.0)));
        assert_eq!(pin(Rect::new(40.0, 560.0, 96.0, 32.0), Placement::Below), Some(Point::new(48.0, 504.0)));
        assert_eq!(pin(Rect::new(40.0, 20.0, 96.0, 32.0), Placement::Above), Some(Point::new(48.0, 60.0)));
    }

    #[test]
    fn test_show_near_clamps_horizontally() {
        let mut engine: TooltipEngine = TooltipEngine::new(TooltipConfig::default());
        let anchor = Rect::new(700.0, 100.0, 96.0, 32.0);
        // 800 - 10 - 260, for narrow and wide tips alike
        for width in [200.0, 400.0] {
            let pos = engine.show_near(anchor, Size::new(width, 48.0), "x", Placement::Below, VIEWPORT).map(|t| t.position);
            assert_eq!(pos.map(|p| p.x), Some(530.0));
        }
        // narrow viewport: the reserve shrinks to fit between the paddings
        let pos = engine
            .show_near(Rect::new(100.0, 10.0, 50.0, 16.0), Size::new(150.0, 48.0), "x", Placement::Below, Size::new(200.0, 400.0))
            .map(|t| t.position);
        assert_eq!(pos.map(|p| p.x), Some(10.0));
        engine.hide();
        assert!(engine.pinned().is_none());
    }

    #[test]
    fn test_show_near_blank_text_hides() {
        let mut engine: TooltipEngine = TooltipEngine::new(TooltipConfig::default());
        let anchor = Rect::new(40.0, 100.0, 96.0, 32.0);
        let tip = Size::new(100.0, 48.0);
        assert!(engine.show_near(anchor, tip, "sent", Placement::Below, VIEWPORT).is_some());
        assert!(engine.show_near(anchor, tip, "   ", Placement::Below, VIEWPORT).is_none());
        assert!(engine.pinned().is_none());
    }
}
