//! Long-press recognizer for touch mode.
//!
//! Tracks a single contact. A press arms on pointer-down over an editable
//! cell and fires once the hold duration passes with total travel within
//! the tolerance. Moving too far, lifting, or cancelling first aborts with
//! no side effects. A press that fired or was dragged off swallows the tap
//! its release produces. While armed or fired, native scrolling is suppressed.

use std::time::{Duration, Instant};

use duudl_core::CellKey;

use crate::edit::events::PointerId;
use crate::geometry::Point;

pub const DEFAULT_HOLD: Duration = Duration::from_millis(520);
pub const DEFAULT_MOVE_TOLERANCE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum LongPressState {
    Idle,
    Armed {
        pointer: PointerId,
        key: CellKey,
        last: Point,
        /// Path length since contact.
        travelled: f32,
        started: Instant,
    },
    Fired {
        pointer: PointerId,
    },
}

#[derive(Debug)]
pub struct LongPress {
    state: LongPressState,
    hold: Duration,
    tolerance: f32,
    swallow_click: bool,
}

impl LongPress {
    pub fn new(hold: Duration, tolerance: f32) -> Self {
        Self {
            state: LongPressState::Idle,
            hold,
            tolerance,
            swallow_click: false,
        }
    }

    pub fn state(&self) -> &LongPressState {
        &self.state
    }

    /// Arm on contact. Ignored while another contact is tracked.
    pub fn arm(&mut self, pointer: PointerId, key: CellKey, pos: Point, now: Instant) -> bool {
        if !matches!(self.state, LongPressState::Idle) {
            return false;
        }
        self.swallow_click = false;
        self.state = LongPressState::Armed { pointer, key, last: pos, travelled: 0.0, started: now };
        true
    }

    /// Track movement. Returns true if this move aborted the press.
    pub fn on_move(&mut self, pointer: PointerId, pos: Point) -> bool {
        let LongPressState::Armed { pointer: tracked, last, travelled, .. } = &mut self.state else {
            return false;
        };
        if *tracked != pointer {
            return false;
        }
        *travelled += last.distance(pos);
        *last = pos;
        if *travelled > self.tolerance {
            log::debug!("long-press aborted after {:.1} units of movement", travelled);
            self.state = LongPressState::Idle;
            // a drag is not a tap
            self.swallow_click = true;
            return true;
        }
        false
    }

    /// Contact lifted. A fired press swallows the tap that follows.
    pub fn on_up(&mut self, pointer: PointerId) {
        match self.state {
            LongPressState::Armed { pointer: tracked, .. } if tracked == pointer => {
                self.state = LongPressState::Idle;
            }
            LongPressState::Fired { pointer: tracked } if tracked == pointer => {
                self.swallow_click = true;
                self.state = LongPressState::Idle;
            }
            _ => {}
        }
    }

    pub fn on_cancel(&mut self, pointer: PointerId) {
        match self.state {
            LongPressState::Armed { pointer: tracked, .. } | LongPressState::Fired { pointer: tracked }
                if tracked == pointer =>
            {
                self.state = LongPressState::Idle;
            }
            _ => {}
        }
    }

    /// Fire if the hold has elapsed. Returns the pressed cell once.
    pub fn poll(&mut self, now: Instant) -> Option<CellKey> {
        let LongPressState::Armed { pointer, key, started, .. } = self.state else {
            return None;
        };
        if now.duration_since(started) < self.hold {
            return None;
        }
        self.state = LongPressState::Fired { pointer };
        log::debug!("long-press fired on {}", key);
        Some(key)
    }

    /// When an armed press will fire.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            LongPressState::Armed { started, .. } => Some(started + self.hold),
            _ => None,
        }
    }

    pub fn suppresses_scroll(&self) -> bool {
        !matches!(self.state, LongPressState::Idle)
    }

    /// Consume the swallow flag left by a fired or dragged press.
    pub fn take_click_swallow(&mut self) -> bool {
        std::mem::take(&mut self.swallow_click)
    }

    /// New contact: a flag left by a release that produced no tap is stale.
    pub fn clear_click_swallow(&mut self) {
        self.swallow_click = false;
    }
}

impl Default for LongPress {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD, DEFAULT_MOVE_TOLERANCE)
    }
}
