//! Input events fed to the editor.
//!
//! Targets carry the raw cell attributes the host found at the event
//! position. They are parsed late: a target with a missing or unparsable
//! participant/day simply resolves to no cell.

use duudl_core::CellKey;

use crate::geometry::Point;

pub type PointerId = u64;

/// Which part of a cell was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPart {
    Body,
    /// The small edit button drawn on editable cells.
    EditAffordance,
    /// The inline text input of the active session.
    InlineEditor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    /// Anywhere outside the grid container.
    OutsideGrid,
    /// Inside the grid but not on a cell (headers, names, gaps).
    GridChrome,
    Cell {
        user_id: Option<String>,
        day: Option<String>,
        part: CellPart,
    },
}

impl HitTarget {
    pub fn cell(key: &CellKey, part: CellPart) -> Self {
        HitTarget::Cell {
            user_id: Some(key.participant.to_string()),
            day: Some(key.day.to_string()),
            part,
        }
    }

    /// The addressed cell, if the attributes parse.
    pub fn key(&self) -> Option<CellKey> {
        match self {
            HitTarget::Cell { user_id, day, .. } => CellKey::from_attrs(user_id.as_deref(), day.as_deref()),
            _ => None,
        }
    }

    pub fn part(&self) -> Option<CellPart> {
        match self {
            HitTarget::Cell { part, .. } => Some(*part),
            _ => None,
        }
    }

    pub fn is_inside_grid(&self) -> bool {
        !matches!(self, HitTarget::OutsideGrid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Enter,
    Escape,
    Backspace,
    Left,
    Right,
    Home,
    End,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { id: PointerId, pos: Point, target: HitTarget },
    PointerMove { id: PointerId, pos: Point },
    PointerUp { id: PointerId, pos: Point },
    PointerCancel { id: PointerId },
    /// Pointer left the grid container.
    PointerLeave,
    /// Click (pointer) or tap (touch), delivered after the matching pointer-up.
    Click { target: HitTarget },
    Key(KeyInput),
    TextInput(String),
    FocusLost,
}

#[cfg(test)]
mod tests {
    use super::*;
    use duudl_core::{Day, ParticipantId};

    #[test]
    fn test_malformed_targets_resolve_to_no_cell() {
        let missing_day = HitTarget::Cell { user_id: Some("1".into()), day: None, part: CellPart::Body };
        assert_eq!(missing_day.key(), None);
        let bad_day = HitTarget::Cell { user_id: Some("1".into()), day: Some("3. feb".into()), part: CellPart::Body };
        assert_eq!(bad_day.key(), None);
        let bad_user = HitTarget::Cell { user_id: Some("abc".into()), day: Some("2026-02-03".into()), part: CellPart::Body };
        assert_eq!(bad_user.key(), None);
        assert_eq!(HitTarget::GridChrome.key(), None);
    }

    #[test]
    fn test_cell_target_round_trips_key() {
        let key = CellKey::new(ParticipantId(4), Day::parse("2026-02-03").unwrap());
        let target = HitTarget::cell(&key, CellPart::EditAffordance);
        assert_eq!(target.key(), Some(key));
        assert_eq!(target.part(), Some(CellPart::EditAffordance));
        assert!(target.is_inside_grid());
        assert!(!HitTarget::OutsideGrid.is_inside_grid());
    }
}
