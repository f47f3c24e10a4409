//! Grid rendering.
//!
//! `render_grid` is a pure function of its input: the same state, predicate
//! and options always produce an equal [`RenderedGrid`]. It rebuilds the whole
//! table on every call; hosts draw the result and throw it away on the next
//! change.

use std::collections::BTreeSet;

use chrono::Weekday;
use duudl_core::{CellKey, Day, GridState, ParticipantId, ResponseValue};

/// Comment text that marks a quick "+1" on a day.
pub const PLUS_ONE: &str = "+1";

pub const CLASS_CELL: &str = "gridCell";
pub const CLASS_YES: &str = "gridCell--yes";
pub const CLASS_NO: &str = "gridCell--no";
pub const CLASS_INCONVENIENT: &str = "gridCell--inconvenient";
pub const CLASS_COMMENT: &str = "gridCell--comment";
pub const CLASS_READONLY: &str = "gridCell--readonly";
pub const CLASS_EDIT_MODE: &str = "gridCell--editMode";

/// Symbols shown for a cell without a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    pub yes: String,
    pub no: String,
    pub inconvenient: String,
    pub unset: String,
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self {
            yes: "✓".into(),
            no: "✕".into(),
            inconvenient: "△".into(),
            unset: String::new(),
        }
    }
}

impl SymbolSet {
    pub fn for_value(&self, value: ResponseValue) -> &str {
        match value {
            ResponseValue::Yes => &self.yes,
            ResponseValue::No => &self.no,
            ResponseValue::Inconvenient => &self.inconvenient,
            ResponseValue::Unset => &self.unset,
        }
    }
}

/// Fixed weekday label tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekdayLabels {
    #[default]
    English,
    Norwegian,
}

impl WeekdayLabels {
    pub fn short(self, weekday: Weekday) -> &'static str {
        let idx = weekday.num_days_from_monday() as usize;
        match self {
            WeekdayLabels::English => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"][idx],
            WeekdayLabels::Norwegian => ["Man", "Tir", "Ons", "Tor", "Fre", "Lør", "Søn"][idx],
        }
    }

    pub fn long(self, weekday: Weekday) -> &'static str {
        let idx = weekday.num_days_from_monday() as usize;
        match self {
            WeekdayLabels::English => {
                ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"][idx]
            }
            WeekdayLabels::Norwegian => {
                ["Mandag", "Tirsdag", "Onsdag", "Torsdag", "Fredag", "Lørdag", "Søndag"][idx]
            }
        }
    }
}

/// Column header label, e.g. `Mon 3`.
pub fn format_day_short(day: &Day, labels: WeekdayLabels) -> String {
    format!("{} {}", labels.short(day.weekday()), day.day_of_month())
}

/// Day card title, e.g. `Monday 3.2`.
pub fn format_day_detailed(day: &Day, labels: WeekdayLabels) -> String {
    format!("{} {}.{}", labels.long(day.weekday()), day.day_of_month(), day.month())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Row drawn highlighted (usually the viewer's own).
    pub highlight_row: Option<ParticipantId>,
    pub symbols: SymbolSet,
    pub weekday_labels: WeekdayLabels,
    pub name_header: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            highlight_row: None,
            symbols: SymbolSet::default(),
            weekday_labels: WeekdayLabels::default(),
            name_header: "Name".into(),
        }
    }
}

pub struct RenderInput<'a> {
    pub state: &'a GridState,
    pub can_edit: &'a dyn Fn(ParticipantId, &Day) -> bool,
    /// Cell currently in inline edit mode.
    pub editing: Option<&'a CellKey>,
    pub options: &'a DisplayOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub day: Day,
    pub label: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub key: CellKey,
    pub value: ResponseValue,
    pub classes: Vec<&'static str>,
    /// Short text drawn in the cell.
    pub text: String,
    /// Trimmed comment, shown in full by the tooltip. Empty without a comment.
    pub full_text: String,
    /// Cell shows the edit affordance.
    pub editable: bool,
    pub editing: bool,
}

impl RenderedCell {
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub participant: ParticipantId,
    pub name: String,
    pub highlighted: bool,
    pub cells: Vec<RenderedCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedGrid {
    pub name_header: String,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow>,
}

impl RenderedGrid {
    pub fn cell(&self, key: &CellKey) -> Option<&RenderedCell> {
        self.row(key.participant)?.cells.iter().find(|c| c.key.day == key.day)
    }

    pub fn row(&self, participant: ParticipantId) -> Option<&RenderedRow> {
        self.rows.iter().find(|r| r.participant == participant)
    }
}

pub fn render_grid(input: &RenderInput<'_>) -> RenderedGrid {
    let state = input.state;
    let options = input.options;

    let header = state
        .days()
        .iter()
        .map(|day| HeaderCell {
            day: *day,
            label: format_day_short(day, options.weekday_labels),
            title: format_day_detailed(day, options.weekday_labels),
        })
        .collect();

    let rows = state
        .participants()
        .iter()
        .map(|p| RenderedRow {
            participant: p.id,
            name: p.display_name.clone(),
            highlighted: options.highlight_row == Some(p.id),
            cells: state
                .days()
                .iter()
                .map(|day| render_cell(input, CellKey::new(p.id, *day)))
                .collect(),
        })
        .collect();

    RenderedGrid {
        name_header: options.name_header.clone(),
        header,
        rows,
    }
}

fn render_cell(input: &RenderInput<'_>, key: CellKey) -> RenderedCell {
    let value = input.state.value(&key);
    let comment = input.state.comment(&key).trim();
    let editable = (input.can_edit)(key.participant, &key.day);
    let editing = input.editing == Some(&key);

    let mut classes = vec![CLASS_CELL];
    match value {
        ResponseValue::Yes => classes.push(CLASS_YES),
        ResponseValue::No => classes.push(CLASS_NO),
        ResponseValue::Inconvenient => classes.push(CLASS_INCONVENIENT),
        ResponseValue::Unset => {}
    }
    if !comment.is_empty() {
        classes.push(CLASS_COMMENT);
    }
    if !editable {
        classes.push(CLASS_READONLY);
    }
    if editing {
        classes.push(CLASS_EDIT_MODE);
    }

    let text = if comment.is_empty() {
        input.options.symbols.for_value(value).to_string()
    } else {
        comment.to_string()
    };

    RenderedCell {
        key,
        value,
        classes,
        text,
        full_text: comment.to_string(),
        editable,
        editing,
    }
}

/// One day in the viewer's own response panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCard {
    pub key: CellKey,
    pub title: String,
    pub value: ResponseValue,
    pub comment: String,
    pub editor_open: bool,
    pub plus_one: bool,
}

/// Build the viewer's per-day panel.
///
/// A day's comment editor is open when its flag is set, or when it holds a
/// real comment (anything but empty or `+1`).
pub fn render_day_cards(
    state: &GridState,
    viewer: ParticipantId,
    open_days: &BTreeSet<Day>,
    labels: WeekdayLabels,
) -> Vec<DayCard> {
    if !state.has_participant(viewer) {
        return Vec::new();
    }
    state
        .days()
        .iter()
        .map(|day| {
            let key = CellKey::new(viewer, *day);
            let comment = state.comment(&key).to_string();
            let plus_one = comment.trim() == PLUS_ONE;
            let editor_open = open_days.contains(day) || (!comment.trim().is_empty() && !plus_one);
            DayCard {
                key,
                title: format_day_detailed(day, labels),
                value: state.value(&key),
                comment,
                editor_open,
                plus_one,
            }
        })
        .collect()
}
