//! Duudl poll API wire format
//!
//! This crate defines the JSON bodies exchanged with the poll service:
//!
//! - `GET  /api/duudl/<token>`                → [`PollStatePayload`]
//! - `POST /api/duudl/<token>/response`       ← [`ResponseUpdate`] (own row)
//! - `POST /api/duudl/<token>/admin-response` ← [`AdminResponseUpdate`] (any row, value only)
//!
//! Poll management goes through the service's HTML forms instead:
//!
//! - `GET  /`                  → overview page, read with [`parse_overview`]
//! - `POST /duudl/new`         ← [`NewPollForm`] (form-encoded)
//! - `POST /d/<token>/delete`  ← empty form
//!
//! Responses and comments are keyed by `"<participantId>:<day>"`, the same
//! scheme [`duudl_core::CellKey`] prints and parses.
//!
//! # Usage
//!
//! ```ignore
//! use duudl_protocol::PollStatePayload;
//!
//! let payload: PollStatePayload = serde_json::from_str(&body)?;
//! let state = payload.into_grid_state()?;
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use duudl_core::{CellKey, CoreError, Day, GridState, Participant, ParticipantId, ResponseValue};

// =============================================================================
// Read
// =============================================================================

/// Full poll state as returned by the read endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollStatePayload {
    /// Row order is significant. Older servers call this field `users`.
    #[serde(alias = "users")]
    pub participants: Vec<ParticipantPayload>,
    pub days: Vec<String>,
    #[serde(default)]
    pub responses: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub comments: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantPayload {
    pub id: i64,
    pub display_name: String,
}

impl PollStatePayload {
    /// Convert into the in-memory grid.
    ///
    /// Malformed days fail the whole payload. Response/comment entries whose
    /// key is malformed or points outside the grid are skipped with a warning.
    pub fn into_grid_state(self) -> Result<GridState, ProtocolError> {
        let participants = self
            .participants
            .into_iter()
            .map(|p| {
                if p.id <= 0 {
                    return Err(ProtocolError::Model(CoreError::InvalidParticipant(p.id.to_string())));
                }
                Ok(Participant { id: ParticipantId(p.id), display_name: p.display_name })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let days = self
            .days
            .iter()
            .map(|d| Day::parse(d).map_err(ProtocolError::Model))
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = GridState::new(participants, days);

        for (raw_key, raw_value) in &self.responses {
            let Some(key) = parse_entry_key(raw_key, &state) else { continue };
            match ResponseValue::from_wire(raw_value.as_deref()) {
                Ok(value) => {
                    // Key was validated against the grid above.
                    let _ = state.set_value(key, value);
                }
                Err(e) => log::warn!("skipping response {}: {}", raw_key, e),
            }
        }

        for (raw_key, comment) in &self.comments {
            let Some(key) = parse_entry_key(raw_key, &state) else { continue };
            let _ = state.set_comment(key, comment.clone());
        }

        Ok(state)
    }

    /// Serialize an in-memory grid back into the read payload shape.
    pub fn from_grid_state(state: &GridState) -> Self {
        let participants = state
            .participants()
            .iter()
            .map(|p| ParticipantPayload { id: p.id.raw(), display_name: p.display_name.clone() })
            .collect();
        let days = state.days().iter().map(|d| d.to_string()).collect();
        let responses = state
            .values()
            .map(|(k, v)| (k.to_string(), v.as_wire().map(String::from)))
            .collect();
        let comments = state
            .comments()
            .map(|(k, c)| (k.to_string(), c.to_string()))
            .collect();
        Self { participants, days, responses, comments }
    }
}

fn parse_entry_key(raw: &str, state: &GridState) -> Option<CellKey> {
    match raw.parse::<CellKey>() {
        Ok(key) if state.contains(&key) => Some(key),
        Ok(key) => {
            log::warn!("skipping entry for {} (not in grid)", key);
            None
        }
        Err(e) => {
            log::warn!("skipping entry: {}", e);
            None
        }
    }
}

// =============================================================================
// Write
// =============================================================================

/// Self-service update of the caller's own cell.
///
/// Idempotent on the server: resending the same body is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseUpdate {
    pub day: String,
    pub value: Option<String>,
    /// `None` leaves the stored comment untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ResponseUpdate {
    pub fn new(day: &Day, value: ResponseValue, comment: Option<&str>) -> Self {
        Self {
            day: day.to_string(),
            value: value.as_wire().map(String::from),
            comment: comment.map(String::from),
        }
    }
}

/// Privileged override of any participant's value for a day. Never carries a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminResponseUpdate {
    pub user_id: i64,
    pub day: String,
    pub value: Option<String>,
}

impl AdminResponseUpdate {
    pub fn new(key: &CellKey, value: ResponseValue) -> Self {
        Self {
            user_id: key.participant.raw(),
            day: key.day.to_string(),
            value: value.as_wire().map(String::from),
        }
    }
}

/// Body returned by both write endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

// =============================================================================
// Poll management
// =============================================================================

/// Form body for creating a poll. Days travel as a JSON array inside the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPollForm {
    pub title: String,
    pub description: String,
    pub selected_days_json: String,
}

impl NewPollForm {
    /// Days are deduplicated and sorted, as the service stores them.
    pub fn new(title: &str, description: &str, days: &[Day]) -> Self {
        let mut days: Vec<String> = days.iter().map(Day::to_string).collect();
        days.sort();
        days.dedup();
        Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            // A list of strings always serializes.
            selected_days_json: serde_json::to_string(&days).unwrap_or_else(|_| "[]".to_string()),
        }
    }
}

/// One poll listed on the overview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub token: String,
    pub title: String,
}

const POLL_LINK: &str = "href=\"/d/";

/// Polls linked from the overview page, in page order.
///
/// The overview has no JSON form, so this reads the `/d/<token>` links and
/// takes each link's text as the title. Links to sub-pages such as
/// `/d/<token>/edit` are skipped, and a token is listed once.
pub fn parse_overview(html: &str) -> Vec<PollSummary> {
    let mut polls: Vec<PollSummary> = Vec::new();
    let mut rest = html;

    while let Some(at) = rest.find(POLL_LINK) {
        rest = &rest[at + POLL_LINK.len()..];
        let Some(end) = rest.find('"') else { break };
        let token = &rest[..end];
        rest = &rest[end..];

        let is_token = !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !is_token || polls.iter().any(|p| p.token == token) {
            continue;
        }

        let title = rest
            .find('>')
            .map(|gt| &rest[gt + 1..])
            .and_then(|body| body.find("</a>").map(|close| inner_text(&body[..close])))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| token.to_string());
        polls.push(PollSummary { token: token.to_string(), title });
    }
    polls
}

/// Markup stripped, common entities decoded, whitespace collapsed.
fn inner_text(fragment: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ProtocolError {
    /// JSON did not match the expected shape
    Json(String),
    /// Payload parsed but contains invalid model data
    Model(CoreError),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::Json(msg) => write!(f, "Malformed payload: {}", msg),
            ProtocolError::Model(e) => write!(f, "Invalid poll data: {}", e),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        ProtocolError::Json(e.to_string())
    }
}

/// Parse a read-endpoint body straight into a grid.
pub fn parse_poll_state(body: &str) -> Result<GridState, ProtocolError> {
    let payload: PollStatePayload = serde_json::from_str(body)?;
    payload.into_grid_state()
}
