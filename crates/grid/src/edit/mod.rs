//! Inline comment editing: input events, interaction mode, the single edit
//! session, and the gesture routers that drive it.

pub mod events;
pub mod gestures;
pub mod long_press;
pub mod mode;
pub mod session;

pub use events::{CellPart, HitTarget, InputEvent, KeyInput, PointerId};
pub use gestures::{EditAction, GestureContext, PointerGestures, TouchGestures};
pub use long_press::{LongPress, LongPressState};
pub use mode::{InputCapabilities, InteractionMode};
pub use session::{CommitSink, EditSessionController, InlineEditor, SessionTransition};
