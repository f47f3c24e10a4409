pub mod layout;

use std::io::{self, stdout, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event, KeyCode,
        KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use duudl_client::PersistenceClient;
use duudl_core::{CellKey, Day, ParticipantId, ResponseValue};
use duudl_grid::edit::{CellPart, HitTarget, InputCapabilities, InputEvent, InteractionMode, KeyInput};
use duudl_grid::measure::MeasureTarget;
use duudl_grid::render::{DayCard, RenderedCell, RenderedGrid, SymbolSet};
use duudl_grid::status::StatusKind;
use duudl_grid::tooltip::Placement;
use duudl_grid::{CompletionOutcome, EditorConfig, GridEditor, Size};

use crate::clipboard;
use crate::util;
use crate::worker::WriteWorker;
use layout::{GridLayout, TermPos, UNIT_H, UNIT_W};

/// Mouse stands in for a single pointer (or finger).
const POINTER: u64 = 1;

/// Max cards shown in the own-days panel.
const PANEL_CARDS: usize = 5;

/// How long to wait for in-flight writes on quit.
const QUIT_GRACE: Duration = Duration::from_secs(3);

const TOOLTIP_MAX_COLS: usize = 40;

pub struct TuiOptions {
    pub title: String,
    pub share_link: String,
    pub viewer: ParticipantId,
    pub caps: InputCapabilities,
    pub editor: EditorConfig,
    pub name_width: u16,
    pub column_width: u16,
    pub cell_lines: u16,
}

struct TuiApp {
    editor: GridEditor,
    worker: WriteWorker,
    client: Arc<dyn PersistenceClient>,
    title: String,
    share_link: String,
    symbols: SymbolSet,
    layout: GridLayout,
    viewport: Size,
    cursor_row: usize,
    cursor_day: usize,
    /// Target under the last pointer-down; a click fires if the pointer comes up on the same cell.
    pressed: Option<HitTarget>,
    pointer_inside: bool,
    /// Day whose panel comment is receiving keystrokes.
    panel_edit: Option<Day>,
    notice: Option<String>,
    should_quit: bool,
    show_help: bool,
}

impl TuiApp {
    fn new(client: Arc<dyn PersistenceClient>, state: duudl_core::GridState, opts: TuiOptions) -> Self {
        let symbols = opts.editor.display.symbols.clone();
        let editor = GridEditor::new(state, opts.viewer, opts.caps, opts.editor);
        let cursor_row = editor
            .view()
            .rows
            .iter()
            .position(|r| r.participant == opts.viewer)
            .unwrap_or(0);
        Self {
            editor,
            worker: WriteWorker::new(Arc::clone(&client)),
            client,
            title: opts.title,
            share_link: opts.share_link,
            symbols,
            layout: GridLayout {
                x: 0,
                y: 1,
                width: 0,
                height: 0,
                name_width: opts.name_width.max(4),
                column_width: opts.column_width.max(4),
                cell_lines: opts.cell_lines.max(1),
                first_day: 0,
                first_row: 0,
            },
            viewport: Size::default(),
            cursor_row,
            cursor_day: 0,
            pressed: None,
            pointer_inside: false,
            panel_edit: None,
            notice: None,
            should_quit: false,
            show_help: false,
        }
    }

    fn cursor_key(&self) -> Option<CellKey> {
        let view = self.editor.view();
        view.rows.get(self.cursor_row)?.cells.get(self.cursor_day).map(|c| c.key)
    }

    fn cursor_cell(&self) -> Option<&RenderedCell> {
        let view = self.editor.view();
        view.rows.get(self.cursor_row)?.cells.get(self.cursor_day)
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Apply arrived completions, then send whatever the editor queued.
    fn pump(&mut self) {
        for completion in self.worker.drain() {
            self.settle(completion);
        }
        for request in self.editor.take_writes() {
            self.worker.submit(request);
        }
    }

    /// Failed writes stay quiet: a rollback shows only as the reverted cell
    /// and a failed comment write keeps the local text. The store logs both.
    fn settle(&mut self, completion: duudl_grid::Completion) {
        if let CompletionOutcome::RolledBack(key) = self.editor.complete(completion) {
            log::debug!("redrawing {} after rollback", key);
        }
    }

    /// Commit everything and wait a little for the service to answer.
    fn flush_and_wait(&mut self) {
        self.editor.flush_all();
        self.pump();
        let start = Instant::now();
        while self.editor.in_flight() > 0 && start.elapsed() < QUIT_GRACE {
            if let Some(completion) = self.worker.recv_timeout(Duration::from_millis(100)) {
                self.settle(completion);
            }
        }
        if self.editor.in_flight() > 0 {
            log::warn!("{} write(s) still in flight at exit", self.editor.in_flight());
        }
    }

    fn refresh(&mut self) {
        self.flush_and_wait();
        match self.client.fetch_state() {
            Ok(state) => {
                self.editor.replace_state(state);
                self.pump();
                self.clamp_cursor();
                self.notice = Some("Reloaded.".to_string());
            }
            Err(e) => self.notice = Some(format!("Reload failed: {}", e)),
        }
    }

    fn timeout(&self) -> Duration {
        let idle = if self.editor.in_flight() > 0 { Duration::from_millis(50) } else { Duration::from_millis(100) };
        match self.editor.next_deadline() {
            Some(at) => at.saturating_duration_since(Instant::now()).clamp(Duration::from_millis(5), idle),
            None => idle,
        }
    }

    // ── Keyboard ────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }
        if self.editor.session().is_active() {
            self.session_key(key);
            return;
        }
        if let Some(day) = self.panel_edit {
            self.panel_key(day, key);
            return;
        }
        self.notice = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::Home | KeyCode::Char('0') => {
                self.cursor_day = 0;
                self.editor.tooltip_mut().hide_pinned();
            }
            KeyCode::Char(' ') => {
                if let Some(key) = self.cursor_key() {
                    self.editor.dispatch(InputEvent::Click { target: HitTarget::cell(&key, CellPart::Body) });
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(key) = self.cursor_key() {
                    if !self.editor.enter_session(key) {
                        self.notice = Some("Only your own row can be edited.".to_string());
                    }
                }
            }
            KeyCode::Char(c @ '1'..='3') => {
                let value = match c {
                    '1' => ResponseValue::Yes,
                    '2' => ResponseValue::No,
                    _ => ResponseValue::Inconvenient,
                };
                if let Some(day) = self.selected_day() {
                    self.editor.choose_value(&day, value);
                }
            }
            KeyCode::Char('+') => {
                if let Some(day) = self.selected_day() {
                    self.editor.toggle_plus_one(&day);
                }
            }
            KeyCode::Char('c') => {
                if let Some(day) = self.selected_day() {
                    if self.editor.day_cards().iter().any(|c| c.key.day == day) {
                        self.editor.open_day_comment(&day);
                        self.panel_edit = Some(day);
                    }
                }
            }
            KeyCode::Char('t') => self.toggle_pinned_tooltip(),
            KeyCode::Char('y') => {
                let copied = match clipboard::copy_text(&self.share_link) {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("copy failed: {}", e);
                        false
                    }
                };
                self.editor.report_copy(copied);
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }

    fn session_key(&mut self, key: KeyEvent) {
        let event = match key.code {
            KeyCode::Char(c) => InputEvent::TextInput(c.to_string()),
            KeyCode::Enter => InputEvent::Key(KeyInput::Enter),
            KeyCode::Esc => InputEvent::Key(KeyInput::Escape),
            KeyCode::Backspace => InputEvent::Key(KeyInput::Backspace),
            KeyCode::Left => InputEvent::Key(KeyInput::Left),
            KeyCode::Right => InputEvent::Key(KeyInput::Right),
            KeyCode::Home => InputEvent::Key(KeyInput::Home),
            KeyCode::End => InputEvent::Key(KeyInput::End),
            _ => InputEvent::Key(KeyInput::Other),
        };
        self.editor.dispatch(event);
    }

    fn panel_key(&mut self, day: Day, key: KeyEvent) {
        let viewer = self.editor.viewer();
        let mut text = self.editor.state().comment(&CellKey::new(viewer, day)).to_string();
        match key.code {
            KeyCode::Char(c) => {
                text.push(c);
                self.editor.edit_day_comment(&day, &text);
            }
            KeyCode::Backspace => {
                text.pop();
                self.editor.edit_day_comment(&day, &text);
            }
            KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => {
                self.editor.blur_day_comment(&day);
                self.panel_edit = None;
            }
            _ => {}
        }
    }

    /// Day under the cursor, when the viewer has a row.
    fn selected_day(&self) -> Option<Day> {
        self.editor.view().header.get(self.cursor_day).map(|h| h.day)
    }

    fn move_cursor(&mut self, drow: i32, dday: i32) {
        let view = self.editor.view();
        if view.rows.is_empty() || view.header.is_empty() {
            return;
        }
        self.cursor_row = (self.cursor_row as i32 + drow).clamp(0, view.rows.len() as i32 - 1) as usize;
        self.cursor_day = (self.cursor_day as i32 + dday).clamp(0, view.header.len() as i32 - 1) as usize;
        self.editor.tooltip_mut().hide_pinned();
    }

    fn clamp_cursor(&mut self) {
        let view = self.editor.view();
        self.cursor_row = self.cursor_row.min(view.rows.len().saturating_sub(1));
        self.cursor_day = self.cursor_day.min(view.header.len().saturating_sub(1));
    }

    fn toggle_pinned_tooltip(&mut self) {
        if self.editor.tooltip().pinned().is_some() {
            self.editor.tooltip_mut().hide_pinned();
            return;
        }
        let Some(cell) = self.cursor_cell() else { return };
        let text = cell.full_text.clone();
        let Some(anchor) = self.layout.cell_rect(self.cursor_row, self.cursor_day) else { return };
        let target = MeasureTarget { text: &text, metrics: self.layout.element_metrics(&text) };
        let viewport = self.viewport;
        let tooltip = self.editor.tooltip_mut();
        if !tooltip.is_truncated(&target) {
            return;
        }
        let (cols, rows) = tooltip_box(&text);
        let tip = Size::new(cols as f32 * UNIT_W, rows as f32 * UNIT_H);
        tooltip.show_near(anchor, tip, &text, Placement::Below, viewport);
    }

    // ── Mouse ───────────────────────────────────────────────────────

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let pos = TermPos::new(mouse.column, mouse.row);
        let point = pos.to_point();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let target = self.layout.hit(self.editor.view(), pos);
                self.pressed = Some(target.clone());
                if let Some((row, day)) = target.key().and_then(|k| GridLayout::index_of(self.editor.view(), &k)) {
                    self.cursor_row = row;
                    self.cursor_day = day;
                }
                self.editor.dispatch(InputEvent::PointerDown { id: POINTER, pos: point, target });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.editor.dispatch(InputEvent::PointerMove { id: POINTER, pos: point });
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.editor.dispatch(InputEvent::PointerUp { id: POINTER, pos: point });
                let released = self.layout.hit(self.editor.view(), pos);
                if let Some(pressed) = self.pressed.take() {
                    if same_element(&pressed, &released) {
                        self.editor.dispatch(InputEvent::Click { target: pressed });
                    }
                }
            }
            MouseEventKind::Moved => self.hover(pos),
            MouseEventKind::ScrollDown if !self.editor.scroll_suppressed() => self.move_cursor(1, 0),
            MouseEventKind::ScrollUp if !self.editor.scroll_suppressed() => self.move_cursor(-1, 0),
            _ => {}
        }
    }

    fn hover(&mut self, pos: TermPos) {
        let inside = self.layout.contains(pos);
        if !inside {
            if self.pointer_inside {
                self.pointer_inside = false;
                self.editor.dispatch(InputEvent::PointerLeave);
            }
            return;
        }
        self.pointer_inside = true;
        let text = self
            .layout
            .key_at(self.editor.view(), pos)
            .and_then(|k| self.editor.view().cell(&k))
            .map(|c| c.full_text.clone());
        let viewport = self.viewport;
        match text {
            Some(text) => {
                let target = MeasureTarget { text: &text, metrics: self.layout.element_metrics(&text) };
                self.editor.hover(pos.to_point(), viewport, Some(&target));
            }
            None => {
                self.editor.hover(pos.to_point(), viewport, None);
            }
        }
    }

    // ── Layout ──────────────────────────────────────────────────────

    fn panel_height(&self) -> u16 {
        let cards = self.editor.day_cards().len();
        if cards == 0 {
            0
        } else {
            cards.min(PANEL_CARDS) as u16 + 2
        }
    }

    fn relayout(&mut self, width: u16, height: u16) {
        self.viewport = layout::viewport(width, height);
        let panel = self.panel_height();
        self.layout.width = width;
        self.layout.height = height.saturating_sub(2 + panel).max(1);

        let rows = self.layout.visible_rows().max(1);
        if self.cursor_row < self.layout.first_row {
            self.layout.first_row = self.cursor_row;
        }
        if self.cursor_row >= self.layout.first_row + rows {
            self.layout.first_row = self.cursor_row + 1 - rows;
        }
        let days = self.layout.visible_days().max(1);
        if self.cursor_day < self.layout.first_day {
            self.layout.first_day = self.cursor_day;
        }
        if self.cursor_day >= self.layout.first_day + days {
            self.layout.first_day = self.cursor_day + 1 - days;
        }
    }

    // ── Drawing ─────────────────────────────────────────────────────

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(self.layout.height),
            Constraint::Length(self.panel_height()),
            Constraint::Min(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_grid(frame, chunks[1]);
        self.draw_panel(frame, chunks[2]);
        self.draw_status(frame, chunks[3]);
        self.draw_tooltip(frame, area);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let state = self.editor.state();
        let mode = match self.editor.mode() {
            InteractionMode::Pointer => "pointer",
            InteractionMode::Touch => "touch",
        };
        let title = format!(
            " duudl: {} | {} participants x {} days | {} answered | {} input ",
            self.title,
            state.participants().len(),
            state.days().len(),
            state.answered_count(),
            mode,
        );
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let view = self.editor.view();
        if view.rows.is_empty() || view.header.is_empty() {
            let msg = Paragraph::new("(no participants or days)").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, area);
            return;
        }

        let l = &self.layout;
        let name_w = l.name_width as usize;
        let col_w = l.column_width as usize;
        let text_w = l.text_width() as usize;
        let days = l.first_day..(l.first_day + l.visible_days()).min(view.header.len());
        let rows = l.first_row..(l.first_row + l.visible_rows()).min(view.rows.len());

        let mut lines: Vec<Line> = Vec::new();
        let mut header = vec![Span::styled(
            util::pad_right(&util::truncate_display(&view.name_header, name_w - 1), name_w),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )];
        for d in days.clone() {
            let style = if d == self.cursor_day {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };
            let label = util::center(&util::truncate_display(&view.header[d].label, col_w - 1), col_w - 1);
            header.push(Span::styled(format!("{} ", label), style));
        }
        lines.push(Line::from(header));

        for r in rows {
            let row = &view.rows[r];
            let cell_lines: Vec<Vec<String>> = days
                .clone()
                .map(|d| self.cell_lines(&row.cells[d], text_w, l.cell_lines as usize))
                .collect();

            for line_idx in 0..l.cell_lines as usize {
                let name = if line_idx == 0 { util::truncate_display(&row.name, name_w - 1) } else { String::new() };
                let name_style = if r == self.cursor_row {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else if row.highlighted {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let mut spans = vec![Span::styled(util::pad_right(&name, name_w), name_style)];

                for (i, d) in days.clone().enumerate() {
                    let cell = &row.cells[d];
                    let text = cell_lines[i].get(line_idx).map(String::as_str).unwrap_or("");
                    let style = cell_style(cell, r == self.cursor_row && d == self.cursor_day);
                    spans.push(Span::styled(util::pad_right(text, text_w), style));
                    let affordance = if line_idx == 0 && cell.editable && !cell.editing { "✎" } else { " " };
                    spans.push(Span::styled(affordance, style.add_modifier(Modifier::DIM)));
                    spans.push(Span::raw(" "));
                }
                lines.push(Line::from(spans));
            }
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    /// Wrapped lines for one cell. The cell being edited shows the editor text and caret.
    fn cell_lines(&self, cell: &RenderedCell, width: usize, max_lines: usize) -> Vec<String> {
        if cell.editing {
            if let Some(editor) = self.editor.session().editor() {
                let value = editor.value();
                let at = value.char_indices().nth(editor.caret()).map(|(i, _)| i).unwrap_or(value.len());
                let text = format!("{}▏{}", &value[..at], &value[at..]);
                let wrapped = duudl_grid::measure::wrap_text(&text, width);
                let skip = wrapped.len().saturating_sub(max_lines);
                return wrapped.into_iter().skip(skip).collect();
            }
        }
        util::clamp_lines(&cell.text, width, max_lines)
    }

    fn draw_panel(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        let cards = self.editor.day_cards();
        let start = self.cursor_day.saturating_sub(PANEL_CARDS / 2).min(cards.len().saturating_sub(PANEL_CARDS));
        let lines: Vec<Line> = cards
            .iter()
            .enumerate()
            .skip(start)
            .take(PANEL_CARDS)
            .map(|(i, card)| self.card_line(card, i == self.cursor_day))
            .collect();

        let block = Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Your days (1/2/3 answer, + plus one, c comment) ");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn card_line(&self, card: &DayCard, selected: bool) -> Line<'static> {
        let marker = if selected { "> " } else { "  " };
        let title_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let mut spans = vec![Span::styled(format!("{}{}", marker, util::pad_right(&card.title, 16)), title_style)];

        for value in [ResponseValue::Yes, ResponseValue::No, ResponseValue::Inconvenient] {
            let symbol = self.symbols.for_value(value);
            let style = if card.value == value {
                value_style(value).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!("[{}]", symbol), style));
        }
        let plus_style = if card.plus_one {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(" [+1] ", plus_style));

        if card.editor_open {
            let editing = self.panel_edit == Some(card.key.day);
            let text = if editing { format!("{}▏", card.comment) } else { card.comment.clone() };
            let style = if editing {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(util::truncate_display(&text, 48), style));
        }
        Line::from(spans)
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let (left, style) = if let Some((text, kind)) = self.editor.status() {
            let bg = match kind {
                StatusKind::Info => Color::Green,
                StatusKind::Error => Color::Red,
            };
            (format!(" {}", text), Style::default().fg(Color::Black).bg(bg))
        } else if let Some(notice) = &self.notice {
            (format!(" {}", notice), Style::default().fg(Color::Black).bg(Color::Yellow))
        } else {
            let info = match (self.editor.view().rows.get(self.cursor_row), self.editor.view().header.get(self.cursor_day)) {
                (Some(row), Some(day)) => format!(" {} / {}", row.name, day.title),
                _ => String::new(),
            };
            (info, Style::default().fg(Color::Black).bg(Color::DarkGray))
        };

        let saving = self.editor.in_flight() + self.editor.pending_commits();
        let right = if saving > 0 { format!("saving {}  ?: help ", saving) } else { "?: help ".to_string() };
        let padding = (area.width as usize).saturating_sub(util::display_width(&left) + util::display_width(&right));
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(vec![Span::styled(status, style)])).style(style);
        frame.render_widget(para, area);
    }

    fn draw_tooltip(&self, frame: &mut Frame, area: Rect) {
        let tooltip = self.editor.tooltip();
        let Some(tip) = tooltip.pinned().or(tooltip.hover()) else { return };
        let (cols, rows) = tooltip_box(&tip.text);
        let width = (cols as u16).min(area.width);
        let height = (rows as u16).min(area.height);
        let x = ((tip.position.x / UNIT_W) as u16).min(area.width.saturating_sub(width));
        let y = ((tip.position.y / UNIT_H) as u16).min(area.height.saturating_sub(height));
        let popup = Rect::new(area.x + x, area.y + y, width, height);

        let lines: Vec<Line> = util::clamp_lines(&tip.text, width.saturating_sub(2) as usize, 8)
            .into_iter()
            .map(Line::from)
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .style(Style::default().bg(Color::Black).fg(Color::White));
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let mut help_lines = vec![
            "",
            "  Navigation",
            "  ----------",
            "  arrows / hjkl     Move cursor",
            "  Home / 0          First day",
            "",
            "  Answering",
            "  ---------",
        ];
        match self.editor.mode() {
            InteractionMode::Pointer => help_lines.extend_from_slice(&[
                "  click / Space     Cycle answer",
                "  click ✎ / e       Edit comment",
            ]),
            InteractionMode::Touch => help_lines.extend_from_slice(&[
                "  tap / Space       Cycle answer",
                "  hold / e          Edit comment",
            ]),
        }
        help_lines.extend_from_slice(&[
            "  Enter / Esc       Finish comment",
            "  1 / 2 / 3         Yes / no / inconvenient",
            "  +                 Toggle +1",
            "  c                 Comment (own day panel)",
            "",
            "  General",
            "  -------",
            "  t                 Show full comment",
            "  y                 Copy share link",
            "  r                 Reload",
            "  q / Esc           Quit",
            "  ?                 Toggle this help",
            "",
        ]);
        let help_width: u16 = 46;
        let help_height: u16 = help_lines.len() as u16 + 2;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(area.x + x, area.y + y, help_width.min(area.width), help_height.min(area.height));

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Pointer-down and pointer-up landed on the same element.
fn same_element(down: &HitTarget, up: &HitTarget) -> bool {
    match (down, up) {
        (HitTarget::Cell { .. }, HitTarget::Cell { .. }) => down.key() == up.key(),
        (HitTarget::OutsideGrid, HitTarget::OutsideGrid) | (HitTarget::GridChrome, HitTarget::GridChrome) => true,
        _ => false,
    }
}

fn value_style(value: ResponseValue) -> Style {
    match value {
        ResponseValue::Yes => Style::default().fg(Color::Black).bg(Color::Green),
        ResponseValue::No => Style::default().fg(Color::White).bg(Color::Red),
        ResponseValue::Inconvenient => Style::default().fg(Color::Black).bg(Color::Yellow),
        ResponseValue::Unset => Style::default().fg(Color::Gray),
    }
}

fn cell_style(cell: &RenderedCell, is_cursor: bool) -> Style {
    let mut style = if cell.editing {
        Style::default().fg(Color::Black).bg(Color::White)
    } else {
        value_style(cell.value)
    };
    if cell.has_class(duudl_grid::render::CLASS_COMMENT) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if is_cursor {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    style
}

/// Tooltip box size in terminal cells, borders included.
fn tooltip_box(text: &str) -> (usize, usize) {
    let cols = util::display_width(text.trim()).clamp(1, TOOLTIP_MAX_COLS);
    let rows = util::clamp_lines(text, cols, 8).len().max(1);
    (cols + 2, rows + 2)
}

/// Run the interactive grid until the user quits.
pub fn run(client: Arc<dyn PersistenceClient>, state: duudl_core::GridState, opts: TuiOptions) -> Result<(), String> {
    let app = TuiApp::new(client, state, opts);
    run_app(app)
}

fn run_app(mut app: TuiApp) -> Result<(), String> {
    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(DisableFocusChange);
            let _ = stdout().execute(DisableMouseCapture);
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    stdout()
        .execute(EnableMouseCapture)
        .map_err(|e| format!("failed to enable mouse capture: {}", e))?;
    // Not every terminal reports focus; the grid still works without it.
    let _ = stdout().execute(EnableFocusChange);

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        app.editor.tick();
        app.pump();

        let size = terminal.size().map_err(|e| format!("failed to read terminal size: {}", e))?;
        app.relayout(size.width, size.height);

        terminal.draw(|frame| app.draw(frame)).map_err(|e| format!("draw error: {}", e))?;

        if event::poll(app.timeout()).map_err(|e| format!("event poll error: {}", e))? {
            match event::read().map_err(|e| format!("event read error: {}", e))? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::FocusLost => app.editor.dispatch(InputEvent::FocusLost),
                _ => {}
            }
        }
        app.pump();

        if app.should_quit {
            break;
        }
    }

    app.flush_and_wait();
    Ok(())
}

/// Print the grid as a plain text table to stdout (no TUI, no raw mode).
pub fn print_plain(grid: &RenderedGrid, name_width: usize, column_width: usize, cell_lines: usize) -> Result<(), String> {
    let out = io::stdout();
    let mut w = out.lock();
    write_plain(&mut w, grid, name_width, column_width, cell_lines).map_err(|e| e.to_string())
}

fn write_plain(
    w: &mut impl Write,
    grid: &RenderedGrid,
    name_width: usize,
    column_width: usize,
    cell_lines: usize,
) -> io::Result<()> {
    let text_w = column_width.saturating_sub(1).max(1);

    // Header
    write!(w, "{}", util::pad_right(&util::truncate_display(&grid.name_header, name_width), name_width))?;
    for h in &grid.header {
        write!(w, " {}", util::center(&util::truncate_display(&h.label, text_w), text_w))?;
    }
    writeln!(w)?;

    // Separator
    write!(w, "{}", "-".repeat(name_width))?;
    for _ in &grid.header {
        write!(w, "-{}", "-".repeat(text_w))?;
    }
    writeln!(w)?;

    // Rows
    for row in &grid.rows {
        let cells: Vec<Vec<String>> =
            row.cells.iter().map(|c| util::clamp_lines(&c.text, text_w, cell_lines.max(1))).collect();
        let height = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        for line in 0..height {
            let name = if line == 0 { util::truncate_display(&row.name, name_width) } else { String::new() };
            write!(w, "{}", util::pad_right(&name, name_width))?;
            for lines in &cells {
                let text = lines.get(line).map(String::as_str).unwrap_or("");
                write!(w, " {}", util::pad_right(text, text_w))?;
            }
            writeln!(w)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use duudl_core::{GridState, Participant};
    use duudl_grid::render::{render_grid, DisplayOptions, RenderInput};

    struct DownService;

    impl PersistenceClient for DownService {
        fn fetch_state(&self) -> Result<GridState, duudl_client::ClientError> {
            Err(duudl_client::ClientError::Network("down".into()))
        }

        fn update_response(&self, _: &duudl_protocol::ResponseUpdate) -> Result<(), duudl_client::ClientError> {
            Err(duudl_client::ClientError::Network("down".into()))
        }

        fn override_response(&self, _: &duudl_protocol::AdminResponseUpdate) -> Result<(), duudl_client::ClientError> {
            Err(duudl_client::ClientError::Network("down".into()))
        }
    }

    fn app() -> TuiApp {
        let day = Day::parse("2026-02-03").unwrap();
        let state = GridState::new(vec![Participant::new(1, "Ada"), Participant::new(2, "Bo")], vec![day]);
        let opts = TuiOptions {
            title: "Tur".into(),
            share_link: "http://127.0.0.1:5001/d/tok1".into(),
            viewer: ParticipantId(1),
            caps: InputCapabilities::MOUSE,
            editor: EditorConfig::default(),
            name_width: 12,
            column_width: 12,
            cell_lines: 1,
        };
        TuiApp::new(Arc::new(DownService), state, opts)
    }

    #[test]
    fn test_failed_writes_show_no_notice() {
        let mut app = app();
        let key = CellKey::new(ParticipantId(1), Day::parse("2026-02-03").unwrap());

        app.editor.dispatch(InputEvent::Click { target: HitTarget::cell(&key, CellPart::Body) });
        assert_eq!(app.editor.state().value(&key), ResponseValue::Yes);
        let toggle = app.editor.take_writes().remove(0);
        app.settle(duudl_grid::Completion::failed(toggle.ticket, "HTTP 500"));
        assert_eq!(app.editor.state().value(&key), ResponseValue::Unset);
        assert!(app.notice.is_none());

        app.editor.enter_session(key);
        app.editor.dispatch(InputEvent::TextInput("sent".into()));
        app.editor.dispatch(InputEvent::Key(KeyInput::Enter));
        let commit = app.editor.take_writes().remove(0);
        app.settle(duudl_grid::Completion::failed(commit.ticket, "HTTP 500"));
        assert_eq!(app.editor.state().comment(&key), "sent");
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_same_element() {
        let day = Day::parse("2026-02-03").unwrap();
        let a = CellKey::new(ParticipantId(1), day);
        let b = CellKey::new(ParticipantId(2), day);
        assert!(same_element(&HitTarget::cell(&a, CellPart::Body), &HitTarget::cell(&a, CellPart::EditAffordance)));
        assert!(!same_element(&HitTarget::cell(&a, CellPart::Body), &HitTarget::cell(&b, CellPart::Body)));
        assert!(!same_element(&HitTarget::cell(&a, CellPart::Body), &HitTarget::GridChrome));
        assert!(same_element(&HitTarget::OutsideGrid, &HitTarget::OutsideGrid));
    }

    #[test]
    fn test_tooltip_box_caps_width() {
        let (cols, rows) = tooltip_box("kort");
        assert_eq!((cols, rows), (6, 3));
        let long = "ord ".repeat(30);
        let (cols, rows) = tooltip_box(&long);
        assert_eq!(cols, TOOLTIP_MAX_COLS + 2);
        assert!(rows > 3);
    }

    #[test]
    fn test_write_plain_table() {
        let day = Day::parse("2026-02-03").unwrap();
        let mut state = GridState::new(vec![Participant::new(1, "Ada"), Participant::new(2, "Bo")], vec![day]);
        state.set_value(CellKey::new(ParticipantId(1), day), ResponseValue::Yes).unwrap();
        state.set_comment(CellKey::new(ParticipantId(2), day), "sent").unwrap();
        let options = DisplayOptions::default();
        let can_edit = |_: ParticipantId, _: &Day| false;
        let grid = render_grid(&RenderInput { state: &state, can_edit: &can_edit, editing: None, options: &options });

        let mut out = Vec::new();
        write_plain(&mut out, &grid, 6, 9, 1).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Name  "));
        assert!(lines[0].contains("Tue 3"));
        assert!(lines[2].starts_with("Ada   "));
        assert!(lines[2].contains('✓'));
        assert!(lines[3].contains("sent"));
    }
}
