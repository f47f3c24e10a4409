//! Headless response-grid editor.
//!
//! The host feeds [`edit::InputEvent`]s and clock ticks into a [`GridEditor`],
//! draws [`render::RenderedGrid`] after every change, and executes the
//! [`persist::WriteRequest`]s the editor queues. Nothing in this crate blocks
//! or touches the network.

pub mod clock;
pub mod debounce;
pub mod edit;
pub mod editor;
pub mod geometry;
pub mod measure;
pub mod persist;
pub mod render;
pub mod status;
pub mod store;
pub mod tooltip;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::DebounceScheduler;
pub use editor::{CommentPayload, EditorConfig, GridEditor};
pub use geometry::{Point, Rect, Size};
pub use persist::{Completion, Outbox, Ticket, WriteKind, WriteRequest};
pub use render::{render_grid, DisplayOptions, RenderInput, RenderedGrid};
pub use store::{CompletionOutcome, ResponseStateStore};
