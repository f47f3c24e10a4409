//! Interaction mode, picked once from the device's input capabilities.

/// What the device reported about its primary input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputCapabilities {
    /// Primary input can hover.
    pub hover: bool,
    /// Primary pointer is precise.
    pub fine_pointer: bool,
}

impl InputCapabilities {
    pub const MOUSE: Self = Self { hover: true, fine_pointer: true };
    pub const TOUCH: Self = Self { hover: false, fine_pointer: false };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Hover tooltips, edit affordance click, outside pointer-down exits.
    Pointer,
    /// Long-press enters, taps outside the grid exit.
    Touch,
}

impl InteractionMode {
    /// Pointer mode needs both hover and a fine pointer.
    pub fn detect(caps: InputCapabilities) -> Self {
        if caps.hover && caps.fine_pointer {
            InteractionMode::Pointer
        } else {
            InteractionMode::Touch
        }
    }
}
