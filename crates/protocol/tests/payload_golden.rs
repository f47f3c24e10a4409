//! Golden payload tests for the poll read endpoint.
//!
//! The JSON below is what the service actually sends. If these break, the
//! client no longer understands the server.

use duudl_core::{CellKey, ResponseValue};
use duudl_protocol::{parse_poll_state, PollStatePayload};

const STATE_JSON: &str = r#"{
    "users": [
        {"id": 1, "display_name": "Huez-Helge"},
        {"id": 2, "display_name": "Andreas Aubisque"},
        {"id": 3, "display_name": "Deux Alpes-Daniel"}
    ],
    "days": ["2026-02-03", "2026-02-05"],
    "responses": {
        "1:2026-02-03": "yes",
        "1:2026-02-05": null,
        "2:2026-02-03": "inconvenient",
        "3:2026-02-05": "no",
        "9:2026-02-03": "yes",
        "garbage": "yes",
        "2:2026-02-05": "maybe"
    },
    "comments": {
        "2:2026-02-03": "after 18",
        "3:2026-02-04": "not a poll day"
    }
}"#;

fn key(s: &str) -> CellKey {
    s.parse().unwrap()
}

#[test]
fn test_golden_state_parses_with_users_alias() {
    let state = parse_poll_state(STATE_JSON).unwrap();
    assert_eq!(state.participants().len(), 3);
    assert_eq!(state.participants()[1].display_name, "Andreas Aubisque");
    assert_eq!(state.days().len(), 2);

    assert_eq!(state.value(&key("1:2026-02-03")), ResponseValue::Yes);
    assert_eq!(state.value(&key("1:2026-02-05")), ResponseValue::Unset);
    assert_eq!(state.value(&key("2:2026-02-03")), ResponseValue::Inconvenient);
    assert_eq!(state.value(&key("3:2026-02-05")), ResponseValue::No);
    assert_eq!(state.comment(&key("2:2026-02-03")), "after 18");
}

#[test]
fn test_golden_state_skips_bad_entries() {
    let state = parse_poll_state(STATE_JSON).unwrap();
    // participant 9 is not in the grid, "garbage" is not a key, "maybe" is not a value,
    // 2026-02-04 is not a poll day
    assert_eq!(state.answered_count(), 3);
    assert_eq!(state.comments().count(), 1);
    assert_eq!(state.value(&key("2:2026-02-05")), ResponseValue::Unset);
}

#[test]
fn test_state_payload_rebuilds_same_grid() {
    let state = parse_poll_state(STATE_JSON).unwrap();
    let payload = PollStatePayload::from_grid_state(&state);
    let again = payload.clone().into_grid_state().unwrap();
    assert_eq!(again, state);

    let json = serde_json::to_value(&payload).unwrap();
    assert!(json["participants"].is_array());
    assert_eq!(json["responses"]["1:2026-02-03"], "yes");
}
