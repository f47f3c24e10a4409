//! Gesture routers: translate raw input into edit actions.
//!
//! Both modes share one session lifecycle; the routers only decide *which*
//! action an event means. Routing happens in two phases. `capture` sees every
//! event first and handles outside-interaction exits, so nothing a target
//! handler does can hide them. `route` then handles the event at its target.

use std::time::Instant;

use duudl_core::CellKey;

use crate::edit::events::{CellPart, HitTarget, InputEvent, KeyInput};
use crate::edit::long_press::LongPress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Enter(CellKey),
    Exit,
    Toggle(CellKey),
}

/// What the routers may know about the editor.
pub struct GestureContext<'a> {
    pub active: Option<&'a CellKey>,
    pub can_edit: &'a dyn Fn(&CellKey) -> bool,
    pub now: Instant,
}

/// Exits shared by both modes: Enter/Escape and focus loss.
fn capture_common(event: &InputEvent, ctx: &GestureContext<'_>) -> Option<EditAction> {
    ctx.active?;
    match event {
        InputEvent::Key(KeyInput::Enter | KeyInput::Escape) | InputEvent::FocusLost => Some(EditAction::Exit),
        _ => None,
    }
}

fn hits_active_cell(target: &HitTarget, ctx: &GestureContext<'_>) -> bool {
    match (target.key(), ctx.active) {
        (Some(key), Some(active)) => key == *active,
        _ => false,
    }
}

/// Mouse and trackpad.
#[derive(Debug, Default)]
pub struct PointerGestures;

impl PointerGestures {
    pub fn capture(&mut self, event: &InputEvent, ctx: &GestureContext<'_>) -> Vec<EditAction> {
        if let Some(action) = capture_common(event, ctx) {
            return vec![action];
        }
        match event {
            InputEvent::PointerDown { target, .. } if ctx.active.is_some() && !hits_active_cell(target, ctx) => {
                vec![EditAction::Exit]
            }
            _ => Vec::new(),
        }
    }

    pub fn route(&mut self, event: &InputEvent, ctx: &GestureContext<'_>) -> Vec<EditAction> {
        let InputEvent::Click { target } = event else {
            return Vec::new();
        };
        let Some(key) = target.key() else {
            return Vec::new();
        };
        match target.part() {
            Some(CellPart::EditAffordance) => vec![EditAction::Enter(key)],
            // no toggling the cell whose text is being edited
            Some(CellPart::Body) if ctx.active != Some(&key) => vec![EditAction::Toggle(key)],
            _ => Vec::new(),
        }
    }
}

/// Touch screens: long-press to edit, taps toggle.
#[derive(Debug, Default)]
pub struct TouchGestures {
    long_press: LongPress,
}

impl TouchGestures {
    pub fn new(long_press: LongPress) -> Self {
        Self { long_press }
    }

    pub fn long_press(&self) -> &LongPress {
        &self.long_press
    }

    pub fn capture(&mut self, event: &InputEvent, ctx: &GestureContext<'_>) -> Vec<EditAction> {
        if let Some(action) = capture_common(event, ctx) {
            return vec![action];
        }
        match event {
            InputEvent::Click { target: HitTarget::OutsideGrid } if ctx.active.is_some() => vec![EditAction::Exit],
            _ => Vec::new(),
        }
    }

    pub fn route(&mut self, event: &InputEvent, ctx: &GestureContext<'_>) -> Vec<EditAction> {
        match event {
            InputEvent::PointerDown { id, pos, target } => {
                self.long_press.clear_click_swallow();
                if let Some(key) = target.key() {
                    let on_editor = target.part() == Some(CellPart::InlineEditor);
                    if !on_editor && ctx.active != Some(&key) && (ctx.can_edit)(&key) {
                        self.long_press.arm(*id, key, *pos, ctx.now);
                    }
                }
                Vec::new()
            }
            InputEvent::PointerMove { id, pos } => {
                self.long_press.on_move(*id, *pos);
                Vec::new()
            }
            InputEvent::PointerUp { id, .. } => {
                self.long_press.on_up(*id);
                Vec::new()
            }
            InputEvent::PointerCancel { id } => {
                self.long_press.on_cancel(*id);
                Vec::new()
            }
            InputEvent::Click { target } => {
                if self.long_press.take_click_swallow() {
                    return Vec::new();
                }
                if ctx.active.is_some() {
                    // Taps inside the grid never reach the toggle while the editor is open.
                    return Vec::new();
                }
                match (target.key(), target.part()) {
                    (Some(key), Some(CellPart::Body | CellPart::EditAffordance)) => vec![EditAction::Toggle(key)],
                    _ => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    /// Time-driven half of the long-press.
    pub fn tick(&mut self, ctx: &GestureContext<'_>) -> Vec<EditAction> {
        match self.long_press.poll(ctx.now) {
            Some(key) => vec![EditAction::Enter(key)],
            None => Vec::new(),
        }
    }
}
