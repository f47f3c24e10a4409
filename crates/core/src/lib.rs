//! Core types for the availability grid.
//!
//! Everything here is plain data: who is in the poll, which days it covers,
//! what each participant answered. No rendering, no I/O, no timers.

pub mod cell_key;
pub mod day;
pub mod error;
pub mod grid_state;
pub mod participant;
pub mod response;

pub use cell_key::CellKey;
pub use day::Day;
pub use error::CoreError;
pub use grid_state::GridState;
pub use participant::{Participant, ParticipantId};
pub use response::ResponseValue;
