//! The grid editor: one object the host drives.
//!
//! Every mutation runs synchronously inside `dispatch`, `tick`, `complete` or
//! one of the panel operations, and the view is rebuilt before the call
//! returns. Writes are queued, never sent; the host drains them with
//! `take_writes` and reports results through `complete`.

use std::time::{Duration, Instant};

use duudl_core::{CellKey, Day, GridState, ParticipantId, ResponseValue};

use crate::clock::{Clock, SystemClock};
use crate::debounce::DebounceScheduler;
use crate::edit::events::{InputEvent, KeyInput};
use crate::edit::gestures::{EditAction, GestureContext, PointerGestures, TouchGestures};
use crate::edit::long_press::{LongPress, DEFAULT_HOLD, DEFAULT_MOVE_TOLERANCE};
use crate::edit::mode::{InputCapabilities, InteractionMode};
use crate::edit::session::{CommitSink, EditSessionController};
use crate::geometry::{Point, Size};
use crate::measure::MeasureTarget;
use crate::persist::{Completion, Outbox, WriteKind, WriteRequest};
use crate::render::{render_day_cards, render_grid, DayCard, DisplayOptions, RenderInput, RenderedGrid, PLUS_ONE};
use crate::status::{StatusFlash, StatusKind, COPIED, COPY_FAILED, DEFAULT_FLASH};
use crate::store::{CompletionOutcome, ResponseStateStore};
use crate::tooltip::{Tooltip, TooltipConfig, TooltipEngine};

pub const DEFAULT_COMMENT_DEBOUNCE: Duration = Duration::from_millis(450);

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub comment_debounce: Duration,
    pub long_press_hold: Duration,
    pub long_press_tolerance: f32,
    pub tooltip: TooltipConfig,
    pub display: DisplayOptions,
    pub status_flash: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            comment_debounce: DEFAULT_COMMENT_DEBOUNCE,
            long_press_hold: DEFAULT_HOLD,
            long_press_tolerance: DEFAULT_MOVE_TOLERANCE,
            tooltip: TooltipConfig::default(),
            display: DisplayOptions::default(),
            status_flash: DEFAULT_FLASH,
        }
    }
}

/// Value + comment captured at a keystroke, sent when the debounce fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPayload {
    pub value: ResponseValue,
    pub comment: String,
}

enum Router {
    Pointer(PointerGestures),
    Touch(TouchGestures),
}

/// Commits a cell right away, dropping its pending debounce.
struct Flusher<'a, C: Clock> {
    store: &'a mut ResponseStateStore,
    debounce: &'a mut DebounceScheduler<CellKey, CommentPayload, C>,
    outbox: &'a mut Outbox,
}

impl<C: Clock> CommitSink for Flusher<'_, C> {
    fn commit_now(&mut self, key: &CellKey) {
        if self.debounce.flush(key).is_some() {
            log::debug!("flushing pending comment for {}", key);
        }
        if let Some(req) = self.store.commit_request(key, WriteKind::CommentCommit { flushed: true }) {
            self.outbox.push(req);
        }
    }
}

pub struct GridEditor<C: Clock + Clone = SystemClock> {
    clock: C,
    config: EditorConfig,
    mode: InteractionMode,
    store: ResponseStateStore,
    session: EditSessionController,
    debounce: DebounceScheduler<CellKey, CommentPayload, C>,
    router: Router,
    tooltip: TooltipEngine,
    outbox: Outbox,
    status: StatusFlash,
    view: RenderedGrid,
    render_count: u64,
}

impl GridEditor<SystemClock> {
    pub fn new(state: GridState, viewer: ParticipantId, caps: InputCapabilities, config: EditorConfig) -> Self {
        Self::with_clock(state, viewer, caps, config, SystemClock)
    }
}

impl<C: Clock + Clone> GridEditor<C> {
    /// Build an editor. The interaction mode is fixed here for its lifetime.
    pub fn with_clock(
        state: GridState,
        viewer: ParticipantId,
        caps: InputCapabilities,
        config: EditorConfig,
        clock: C,
    ) -> Self {
        let mode = InteractionMode::detect(caps);
        let router = match mode {
            InteractionMode::Pointer => Router::Pointer(PointerGestures),
            InteractionMode::Touch => Router::Touch(TouchGestures::new(LongPress::new(
                config.long_press_hold,
                config.long_press_tolerance,
            ))),
        };
        log::debug!("grid editor for participant {} in {:?} mode", viewer, mode);

        let mut editor = Self {
            debounce: DebounceScheduler::with_clock(clock.clone()),
            clock,
            tooltip: TooltipEngine::new(config.tooltip),
            status: StatusFlash::new(config.status_flash),
            config,
            mode,
            store: ResponseStateStore::new(state, viewer),
            session: EditSessionController::new(),
            router,
            outbox: Outbox::new(),
            view: RenderedGrid::default(),
            render_count: 0,
        };
        editor.rerender();
        editor
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn state(&self) -> &GridState {
        self.store.state()
    }

    pub fn viewer(&self) -> ParticipantId {
        self.store.viewer()
    }

    pub fn can_edit(&self, key: &CellKey) -> bool {
        self.store.can_edit(key)
    }

    pub fn session(&self) -> &EditSessionController {
        &self.session
    }

    /// Current view. Rebuilt after every mutation.
    pub fn view(&self) -> &RenderedGrid {
        &self.view
    }

    /// How many times the view has been rebuilt.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn day_cards(&self) -> Vec<DayCard> {
        render_day_cards(
            self.store.state(),
            self.store.viewer(),
            self.session.open_comment_days(),
            self.config.display.weekday_labels,
        )
    }

    pub fn is_commit_pending(&self, key: &CellKey) -> bool {
        self.debounce.is_pending(key)
    }

    pub fn pending_commits(&self) -> usize {
        self.debounce.len()
    }

    pub fn queued_writes(&self) -> usize {
        self.outbox.len()
    }

    pub fn in_flight(&self) -> usize {
        self.store.in_flight()
    }

    /// Native scrolling must stay off while a long-press is being held.
    pub fn scroll_suppressed(&self) -> bool {
        match &self.router {
            Router::Touch(g) => g.long_press().suppresses_scroll(),
            Router::Pointer(_) => false,
        }
    }

    pub fn tooltip(&self) -> &TooltipEngine {
        &self.tooltip
    }

    pub fn tooltip_mut(&mut self) -> &mut TooltipEngine {
        &mut self.tooltip
    }

    /// Earliest instant at which `tick` has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let long_press = match &self.router {
            Router::Touch(g) => g.long_press().deadline(),
            Router::Pointer(_) => None,
        };
        [self.debounce.next_deadline(), long_press, self.status.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Feed one input event.
    ///
    /// The capture phase runs first and handles exits on outside
    /// interaction, then the event is handled at its target.
    pub fn dispatch(&mut self, event: InputEvent) {
        self.poll_timers();

        let actions = {
            let store = &self.store;
            let can_edit = |k: &CellKey| store.can_edit(k);
            let ctx = GestureContext { active: self.session.active(), can_edit: &can_edit, now: self.clock.now() };
            match &mut self.router {
                Router::Pointer(g) => g.capture(&event, &ctx),
                Router::Touch(g) => g.capture(&event, &ctx),
            }
        };
        self.apply(actions);

        match &event {
            InputEvent::TextInput(text) => self.type_text(text),
            InputEvent::Key(key) => self.edit_key(*key),
            InputEvent::PointerLeave => self.tooltip.on_pointer_leave(),
            _ => {
                let actions = {
                    let store = &self.store;
                    let can_edit = |k: &CellKey| store.can_edit(k);
                    let ctx = GestureContext { active: self.session.active(), can_edit: &can_edit, now: self.clock.now() };
                    match &mut self.router {
                        Router::Pointer(g) => g.route(&event, &ctx),
                        Router::Touch(g) => g.route(&event, &ctx),
                    }
                };
                self.apply(actions);
            }
        }
    }

    /// Advance timers: fire due comment commits and held long-presses.
    pub fn tick(&mut self) {
        self.poll_timers();
    }

    /// Hover tracking for the tooltip. Touch mode never shows hover tooltips.
    pub fn hover(&mut self, pos: Point, viewport: Size, target: Option<&MeasureTarget<'_>>) -> Option<&Tooltip> {
        if self.mode != InteractionMode::Pointer {
            return None;
        }
        self.tooltip.on_pointer_move(pos, viewport, target)
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Open the inline editor on `key`. No-op for cells the viewer may not edit.
    pub fn enter_session(&mut self, key: CellKey) -> bool {
        if !self.store.can_edit(&key) {
            log::debug!("edit session refused for {}", key);
            return false;
        }
        let text = self.store.state().comment(&key).to_string();
        let mut sink = Flusher { store: &mut self.store, debounce: &mut self.debounce, outbox: &mut self.outbox };
        if !self.session.enter(key, &text, &mut sink) {
            return false;
        }
        self.tooltip.hide();
        self.rerender();
        true
    }

    /// Close the inline editor, committing its cell immediately.
    pub fn exit_session(&mut self) -> Option<CellKey> {
        let mut sink = Flusher { store: &mut self.store, debounce: &mut self.debounce, outbox: &mut self.outbox };
        let exited = self.session.exit(&mut sink)?;
        self.rerender();
        Some(exited)
    }

    // ── Per-day panel ───────────────────────────────────────────────

    /// Pick a value for one of the viewer's days. Picking the current one clears it.
    pub fn choose_value(&mut self, day: &Day, value: ResponseValue) {
        let key = CellKey::new(self.viewer(), *day);
        if let Some(req) = self.store.choose(&key, value) {
            self.outbox.push(req);
            self.rerender();
        }
    }

    /// Flip the day's comment between `+1` and empty, committed immediately.
    pub fn toggle_plus_one(&mut self, day: &Day) {
        let key = CellKey::new(self.viewer(), *day);
        if !self.store.can_edit(&key) {
            return;
        }
        let next = if self.store.state().comment(&key).trim() == PLUS_ONE { "" } else { PLUS_ONE };
        self.store.set_comment(&key, next);
        self.session.set_day_open(*day, false);
        self.sync_inline_editor(&key, next);

        let mut sink = Flusher { store: &mut self.store, debounce: &mut self.debounce, outbox: &mut self.outbox };
        sink.commit_now(&key);
        self.rerender();
    }

    pub fn open_day_comment(&mut self, day: &Day) {
        if self.store.state().has_day(day) && !self.session.is_day_open(day) {
            self.session.set_day_open(*day, true);
            self.rerender();
        }
    }

    /// Replace the whole comment of one of the viewer's days.
    pub fn edit_day_comment(&mut self, day: &Day, text: &str) {
        let key = CellKey::new(self.viewer(), *day);
        if self.edit_comment(&key, text) {
            self.sync_inline_editor(&key, text);
            self.rerender();
        }
    }

    /// Focus left a day's comment editor. An empty editor closes.
    pub fn blur_day_comment(&mut self, day: &Day) {
        let key = CellKey::new(self.viewer(), *day);
        if self.store.state().comment(&key).trim().is_empty() && self.session.is_day_open(day) {
            self.session.set_day_open(*day, false);
            self.rerender();
        }
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Writes queued since the last call, oldest first.
    pub fn take_writes(&mut self) -> Vec<WriteRequest> {
        self.outbox.drain()
    }

    pub fn complete(&mut self, completion: Completion) -> CompletionOutcome {
        let outcome = self.store.complete(&completion);
        if let CompletionOutcome::RolledBack(_) = outcome {
            self.rerender();
        }
        outcome
    }

    /// Commit everything now: the open session and every pending comment.
    pub fn flush_all(&mut self) {
        self.exit_session();
        for (key, payload) in self.debounce.flush_all() {
            let kind = WriteKind::CommentCommit { flushed: true };
            if let Some(req) = self.store.commit_captured(&key, payload.value, payload.comment, kind) {
                self.outbox.push(req);
            }
        }
    }

    /// Swap in a freshly fetched state, committing local edits first.
    pub fn replace_state(&mut self, state: GridState) {
        self.flush_all();
        self.store.replace_state(state);
        self.tooltip.hide();
        self.rerender();
    }

    // ── Status ──────────────────────────────────────────────────────

    /// Report the outcome of copying the share link.
    pub fn report_copy(&mut self, copied: bool) {
        let now = self.clock.now();
        if copied {
            self.status.show(COPIED, StatusKind::Info, now);
        } else {
            self.status.show(COPY_FAILED, StatusKind::Error, now);
        }
    }

    pub fn status(&self) -> Option<(&str, StatusKind)> {
        self.status.current(self.clock.now())
    }

    // ── Internals ───────────────────────────────────────────────────

    fn apply(&mut self, actions: Vec<EditAction>) {
        for action in actions {
            match action {
                EditAction::Enter(key) => {
                    self.enter_session(key);
                }
                EditAction::Exit => {
                    self.exit_session();
                }
                EditAction::Toggle(key) => self.toggle(&key),
            }
        }
    }

    fn toggle(&mut self, key: &CellKey) {
        if let Some(req) = self.store.toggle(key) {
            self.outbox.push(req);
            self.rerender();
        }
    }

    fn poll_timers(&mut self) {
        for (key, payload) in self.debounce.poll_due() {
            let kind = WriteKind::CommentCommit { flushed: false };
            if let Some(req) = self.store.commit_captured(&key, payload.value, payload.comment, kind) {
                self.outbox.push(req);
            }
        }

        let actions = match &mut self.router {
            Router::Touch(g) => {
                let store = &self.store;
                let can_edit = |k: &CellKey| store.can_edit(k);
                let ctx = GestureContext { active: self.session.active(), can_edit: &can_edit, now: self.clock.now() };
                g.tick(&ctx)
            }
            Router::Pointer(_) => Vec::new(),
        };
        self.apply(actions);

        self.status.expire(self.clock.now());
    }

    fn type_text(&mut self, text: &str) {
        let Some(editor) = self.session.editor_mut() else {
            return;
        };
        editor.insert_str(text);
        self.after_inline_edit();
    }

    fn edit_key(&mut self, key: KeyInput) {
        let Some(editor) = self.session.editor_mut() else {
            return;
        };
        match key {
            KeyInput::Backspace => {
                if editor.backspace() {
                    self.after_inline_edit();
                }
            }
            KeyInput::Left => editor.move_left(),
            KeyInput::Right => editor.move_right(),
            KeyInput::Home => editor.move_home(),
            KeyInput::End => editor.move_end(),
            KeyInput::Enter | KeyInput::Escape | KeyInput::Other => {}
        }
    }

    fn after_inline_edit(&mut self) {
        let (Some(key), Some(editor)) = (self.session.active().copied(), self.session.editor()) else {
            return;
        };
        let text = editor.value().to_string();
        if self.edit_comment(&key, &text) {
            self.rerender();
        }
    }

    /// Write the comment locally and (re)start its debounce with the payload
    /// as of this keystroke.
    fn edit_comment(&mut self, key: &CellKey, text: &str) -> bool {
        if !self.store.set_comment(key, text) {
            return false;
        }
        let (value, comment) = self.store.snapshot(key);
        self.debounce
            .schedule(*key, self.config.comment_debounce, CommentPayload { value, comment });
        true
    }

    fn sync_inline_editor(&mut self, key: &CellKey, text: &str) {
        if !self.session.is_active_cell(key) {
            return;
        }
        if let Some(editor) = self.session.editor_mut() {
            if editor.value() != text {
                editor.set_value(text);
            }
        }
    }

    fn rerender(&mut self) {
        let store = &self.store;
        let can_edit = |p: ParticipantId, d: &Day| store.can_edit_cell(p, d);
        let input = RenderInput {
            state: store.state(),
            can_edit: &can_edit,
            editing: self.session.active(),
            options: &self.config.display,
        };
        self.view = render_grid(&input);
        self.render_count += 1;
    }
}
