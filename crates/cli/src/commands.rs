//! Command implementations.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use duudl_client::{
    delete_auth, load_auth, save_auth, share_link, ClientError, Credentials, HttpClient, PersistenceClient,
};
use duudl_config::{InputModeSetting, Settings, WeekdayLabelSet};
use duudl_core::{CellKey, Day, GridState, ParticipantId, ResponseValue};
use duudl_grid::edit::InputCapabilities;
use duudl_grid::render::{format_day_detailed, render_grid, DisplayOptions, RenderInput, WeekdayLabels};
use duudl_grid::status::COPIED;
use duudl_grid::tooltip::TooltipConfig;
use duudl_grid::{EditorConfig, ResponseStateStore, WriteKind};
use duudl_protocol::{AdminResponseUpdate, NewPollForm, PollStatePayload};

use crate::exit_codes::*;
use crate::tui::{self, TuiOptions};
use crate::CliError;

/// Settings and overrides shared by every command.
pub struct Context {
    server: Option<String>,
    settings: Settings,
}

impl Context {
    pub fn new(server: Option<String>, config: Option<PathBuf>) -> Self {
        let settings = match config {
            Some(path) => Settings::load_from(&path),
            None => Settings::load(),
        };
        Self { server, settings }
    }

    /// `--server` beats the saved login, which beats settings.
    fn base_url(&self, creds: Option<&Credentials>) -> String {
        self.server
            .clone()
            .or_else(|| creds.map(|c| c.base_url.clone()))
            .unwrap_or_else(|| self.settings.base_url.clone())
    }

    fn credentials(&self) -> Result<Credentials, CliError> {
        let creds = load_auth().ok_or_else(|| CliError::from(ClientError::NotAuthenticated))?;
        Ok(Credentials::new(self.base_url(Some(&creds)), creds.password, creds.participant_id))
    }

    fn connect(&self, token: &str) -> Result<(Credentials, HttpClient), CliError> {
        let creds = self.credentials()?;
        log::debug!("connecting to {} for poll {}", creds.base_url, token);
        let client = HttpClient::connect(&creds, token)?;
        Ok((creds, client))
    }

    fn labels(&self) -> WeekdayLabels {
        match self.settings.weekday_labels {
            WeekdayLabelSet::En => WeekdayLabels::English,
            WeekdayLabelSet::No => WeekdayLabels::Norwegian,
        }
    }

    fn display_options(&self, viewer: ParticipantId) -> DisplayOptions {
        DisplayOptions {
            highlight_row: self.settings.highlight_own_row.then_some(viewer),
            weekday_labels: self.labels(),
            ..DisplayOptions::default()
        }
    }

    fn editor_config(&self, viewer: ParticipantId) -> EditorConfig {
        let s = &self.settings;
        EditorConfig {
            comment_debounce: Duration::from_millis(s.comment_debounce_ms),
            long_press_hold: Duration::from_millis(s.long_press_ms),
            long_press_tolerance: s.long_press_move_tolerance,
            tooltip: TooltipConfig {
                offset_x: s.tooltip_offset_x,
                offset_y: s.tooltip_offset_y,
                viewport_padding: s.tooltip_viewport_padding,
                min_width: s.tooltip_min_width,
                tolerance: s.truncation_tolerance,
            },
            display: self.display_options(viewer),
            status_flash: Duration::from_millis(s.status_flash_ms),
        }
    }
}

fn parse_day(s: &str) -> Result<Day, CliError> {
    Day::parse(s).map_err(|e| CliError::args(e.to_string()).with_hint("days look like 2026-02-03"))
}

/// The viewer's cell for `day`, checked against the poll.
fn own_cell(state: &GridState, viewer: ParticipantId, day: Day) -> Result<CellKey, CliError> {
    if !state.has_day(&day) {
        return Err(CliError::args(format!("Poll has no day {}", day)));
    }
    if !state.has_participant(viewer) {
        return Err(CliError::new(EXIT_FORBIDDEN_CELL, format!("Participant {} is not in this poll", viewer))
            .with_hint("log in as a participant of this poll: duudl login --participant <id>"));
    }
    Ok(CellKey::new(viewer, day))
}

/// Interaction capabilities for the terminal.
///
/// Terminals report a mouse with hover; Termux on a phone is the one common
/// touch-first terminal.
fn capabilities(mode: InputModeSetting) -> InputCapabilities {
    match mode {
        InputModeSetting::Pointer => InputCapabilities::MOUSE,
        InputModeSetting::Touch => InputCapabilities::TOUCH,
        InputModeSetting::Auto => {
            if std::env::var_os("TERMUX_VERSION").is_some() {
                InputCapabilities::TOUCH
            } else {
                InputCapabilities::MOUSE
            }
        }
    }
}

// ── Login ───────────────────────────────────────────────────────────

pub fn cmd_login(ctx: &Context, password: Option<String>, participant: i64) -> Result<(), CliError> {
    if participant <= 0 {
        return Err(CliError::args(format!("Invalid participant id {}", participant)));
    }

    // Resolve password: --password flag / DUUDL_PASSWORD env > interactive prompt
    let password = if let Some(p) = password {
        p
    } else if atty::is(atty::Stream::Stdin) {
        eprint!("Password: ");
        io::stderr().flush().ok();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).map_err(|e| CliError::io(e.to_string()))?;
        let trimmed = buf.trim().to_string();
        if trimmed.is_empty() {
            return Err(CliError::args("No password provided").with_hint("pass --password or set DUUDL_PASSWORD"));
        }
        trimmed
    } else {
        return Err(CliError::args("No password provided and stdin is not a TTY")
            .with_hint("pass --password or set DUUDL_PASSWORD"));
    };

    let base_url = ctx.base_url(None);
    let client = HttpClient::new(&base_url, "")?;
    client.login(&password, participant).map_err(|e| match e {
        ClientError::NotAuthenticated => {
            CliError::new(EXIT_NOT_AUTH, "Wrong password").with_hint("ask the poll organizer for the password")
        }
        other => CliError::from(other),
    })?;

    let creds = Credentials::new(base_url, password, participant);
    save_auth(&creds).map_err(CliError::io)?;

    eprintln!("Logged in to {} as participant {}", creds.base_url, participant);
    Ok(())
}

pub fn cmd_logout() -> Result<(), CliError> {
    delete_auth().map_err(CliError::io)?;
    eprintln!("Logged out");
    Ok(())
}

// ── Read ────────────────────────────────────────────────────────────

pub fn cmd_show(ctx: &Context, token: &str, plain: bool, json: bool) -> Result<(), CliError> {
    let (creds, client) = ctx.connect(token)?;
    let state = client.fetch_state()?;

    if json {
        let payload = PollStatePayload::from_grid_state(&state);
        let out = serde_json::to_string_pretty(&payload).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    let viewer = ParticipantId(creds.participant_id);
    let options = ctx.display_options(viewer);
    let can_edit = |p: ParticipantId, d: &Day| p == viewer && state.has_day(d);
    let grid = render_grid(&RenderInput { state: &state, can_edit: &can_edit, editing: None, options: &options });

    let s = &ctx.settings;
    tui::print_plain(&grid, s.name_column_width as usize, s.column_width as usize, s.cell_lines as usize)
        .map_err(CliError::io)?;

    if !plain {
        let total = state.participants().len() * state.days().len();
        println!();
        println!("{} of {} answered", state.answered_count(), total);
    }
    Ok(())
}

// ── Write ───────────────────────────────────────────────────────────

pub fn cmd_toggle(ctx: &Context, token: &str, day: &str) -> Result<(), CliError> {
    let day = parse_day(day)?;
    let (creds, client) = ctx.connect(token)?;
    let viewer = ParticipantId(creds.participant_id);
    let state = client.fetch_state()?;
    let key = own_cell(&state, viewer, day)?;

    let mut store = ResponseStateStore::new(state, viewer);
    let request = store
        .toggle(&key)
        .ok_or_else(|| CliError::new(EXIT_FORBIDDEN_CELL, format!("Cannot edit {}", key)))?;
    client.update_response(&request.to_update())?;

    println!("{}: {}", format_day_detailed(&day, ctx.labels()), request.value);
    Ok(())
}

pub fn cmd_comment(ctx: &Context, token: &str, day: &str, text: &str) -> Result<(), CliError> {
    let day = parse_day(day)?;
    let (creds, client) = ctx.connect(token)?;
    let viewer = ParticipantId(creds.participant_id);
    let state = client.fetch_state()?;
    let key = own_cell(&state, viewer, day)?;

    let mut store = ResponseStateStore::new(state, viewer);
    if !store.set_comment(&key, text) {
        return Err(CliError::new(EXIT_FORBIDDEN_CELL, format!("Cannot edit {}", key)));
    }
    let request = store
        .commit_request(&key, WriteKind::CommentCommit { flushed: true })
        .ok_or_else(|| CliError::new(EXIT_FORBIDDEN_CELL, format!("Cannot edit {}", key)))?;
    client.update_response(&request.to_update())?;

    let title = format_day_detailed(&day, ctx.labels());
    if text.trim().is_empty() {
        println!("{}: comment cleared", title);
    } else {
        println!("{}: {}", title, text.trim());
    }
    Ok(())
}

pub fn cmd_admin_set(ctx: &Context, token: &str, participant: i64, day: &str, value: &str) -> Result<(), CliError> {
    let day = parse_day(day)?;
    let value: ResponseValue = value
        .parse()
        .map_err(|e: duudl_core::CoreError| CliError::args(e.to_string()).with_hint("use yes, no, inconvenient or unset"))?;
    let (_, client) = ctx.connect(token)?;

    let key = CellKey::new(ParticipantId(participant), day);
    client.override_response(&AdminResponseUpdate::new(&key, value))?;

    println!("{}: {}", key, value);
    Ok(())
}

// ── Poll management ─────────────────────────────────────────────────

pub fn cmd_list(ctx: &Context, json: bool) -> Result<(), CliError> {
    let (_, client) = ctx.connect("")?;
    let polls = client.list_polls()?;

    if json {
        let out = serde_json::to_string_pretty(&polls).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }
    if polls.is_empty() {
        eprintln!("No polls yet");
        return Ok(());
    }
    let width = polls.iter().map(|p| p.token.chars().count()).max().unwrap_or(0);
    for poll in &polls {
        println!("{:<width$}  {}", poll.token, poll.title, width = width);
    }
    Ok(())
}

pub fn cmd_create(ctx: &Context, title: &str, description: &str, days: &[String]) -> Result<(), CliError> {
    if title.trim().is_empty() {
        return Err(CliError::args("A poll needs a title").with_hint("pass --title"));
    }
    let days = days.iter().map(|d| parse_day(d)).collect::<Result<Vec<_>, _>>()?;
    if days.is_empty() {
        return Err(CliError::args("A poll needs at least one day").with_hint("days look like 2026-02-03"));
    }

    let (creds, client) = ctx.connect("")?;
    let token = client.create_poll(&NewPollForm::new(title, description, &days))?;
    log::info!("created poll {} with {} days", token, days.len());

    println!("{}", share_link(&creds.base_url, &token));
    Ok(())
}

pub fn cmd_delete(ctx: &Context, token: &str) -> Result<(), CliError> {
    let (_, client) = ctx.connect(token)?;
    client.delete_poll()?;
    println!("Deleted {}", token);
    Ok(())
}

// ── Share ───────────────────────────────────────────────────────────

pub fn cmd_link(ctx: &Context, token: &str, copy: bool) -> Result<(), CliError> {
    let base_url = ctx.base_url(load_auth().as_ref());
    let link = share_link(&base_url, token);
    println!("{}", link);

    if copy {
        crate::clipboard::copy_text(&link).map_err(|e| CliError::new(EXIT_CLIPBOARD, "Could not copy.").with_hint(e))?;
        eprintln!("{}", COPIED);
    }
    Ok(())
}

// ── Interactive grid ────────────────────────────────────────────────

pub fn cmd_open(ctx: &Context, token: &str, input: Option<InputModeSetting>) -> Result<(), CliError> {
    if !atty::is(atty::Stream::Stdout) {
        return Err(CliError::new(EXIT_TERMINAL, "The interactive grid needs a terminal")
            .with_hint("use `duudl show` for plain output"));
    }

    let (creds, client) = ctx.connect(token)?;
    let state = client.fetch_state()?;
    let viewer = ParticipantId(creds.participant_id);
    let caps = capabilities(input.unwrap_or(ctx.settings.input_mode));
    log::info!("opening poll {} as participant {} ({:?})", token, viewer, caps);

    let s = &ctx.settings;
    let opts = TuiOptions {
        title: token.to_string(),
        share_link: client.share_link(),
        viewer,
        caps,
        editor: ctx.editor_config(viewer),
        name_width: s.name_column_width,
        column_width: s.column_width,
        cell_lines: s.cell_lines,
    };
    let client: Arc<dyn PersistenceClient> = Arc::new(client);
    tui::run(client, state, opts).map_err(|e| CliError::new(EXIT_TERMINAL, e))
}
