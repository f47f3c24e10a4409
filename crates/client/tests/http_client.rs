//! HTTP client behaviour against a mock poll service.

use httpmock::prelude::*;

use duudl_client::{ClientError, Credentials, HttpClient, PersistenceClient};
use duudl_core::{CellKey, Day, ResponseValue};
use duudl_protocol::{AdminResponseUpdate, NewPollForm, PollSummary, ResponseUpdate};

fn state_json() -> serde_json::Value {
    serde_json::json!({
        "participants": [
            {"id": 1, "display_name": "Huez-Helge"},
            {"id": 2, "display_name": "Galibier-Geir"}
        ],
        "days": ["2026-02-03", "2026-02-04"],
        "responses": {"1:2026-02-03": "yes", "2:2026-02-04": "no"},
        "comments": {"2:2026-02-04": "kanskje"}
    })
}

#[test]
fn test_fetch_state() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/duudl/tok1");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(state_json());
    });

    let client = HttpClient::new(&server.base_url(), "tok1").unwrap();
    let state = client.fetch_state().unwrap();

    mock.assert();
    assert_eq!(state.participants().len(), 2);
    let key: CellKey = "2:2026-02-04".parse().unwrap();
    assert_eq!(state.value(&key), ResponseValue::No);
    assert_eq!(state.comment(&key), "kanskje");
}

#[test]
fn test_update_response_posts_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/duudl/tok1/response")
            .json_body(serde_json::json!({"day": "2026-02-03", "value": "no", "comment": "etter jobb"}));
        then.status(200).json_body(serde_json::json!({"ok": true}));
    });

    let client = HttpClient::new(&server.base_url(), "tok1").unwrap();
    let day = Day::parse("2026-02-03").unwrap();
    client
        .update_response(&ResponseUpdate::new(&day, ResponseValue::No, Some("etter jobb")))
        .unwrap();
    mock.assert();
}

#[test]
fn test_override_response_posts_value_only() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/duudl/tok1/admin-response")
            .json_body(serde_json::json!({"user_id": 2, "day": "2026-02-04", "value": null}));
        then.status(200).json_body(serde_json::json!({"ok": true}));
    });

    let client = HttpClient::new(&server.base_url(), "tok1").unwrap();
    let key: CellKey = "2:2026-02-04".parse().unwrap();
    client
        .override_response(&AdminResponseUpdate::new(&key, ResponseValue::Unset))
        .unwrap();
    mock.assert();
}

#[test]
fn test_status_codes_map_to_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/duudl/missing");
        then.status(404).body("Not found");
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/duudl/tok1/response");
        then.status(400).body("Bad value");
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/duudl/broken");
        then.status(500).body("boom");
    });

    let missing = HttpClient::new(&server.base_url(), "missing").unwrap();
    assert_eq!(missing.fetch_state().unwrap_err(), ClientError::NotFound("missing".into()));

    let client = HttpClient::new(&server.base_url(), "tok1").unwrap();
    let day = Day::parse("2026-02-03").unwrap();
    let err = client
        .update_response(&ResponseUpdate::new(&day, ResponseValue::Yes, Some("")))
        .unwrap_err();
    assert_eq!(err, ClientError::Validation("Bad value".into()));

    let broken = HttpClient::new(&server.base_url(), "broken").unwrap();
    assert_eq!(broken.fetch_state().unwrap_err(), ClientError::Http(500, "boom".into()));
}

#[test]
fn test_connect_logs_in_and_selects_participant() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/login").body_includes("password=hemmelig");
        then.status(200).body("ok");
    });
    let select = server.mock(|when, then| {
        when.method(POST).path("/select-user").body_includes("user_id=2");
        then.status(200).body("ok");
    });

    let creds = Credentials::new(server.base_url(), "hemmelig", 2);
    let client = HttpClient::connect(&creds, "tok1").unwrap();

    login.assert();
    select.assert();
    assert_eq!(client.share_link(), format!("{}/d/tok1", server.base_url()));
}

#[test]
fn test_malformed_state_is_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/duudl/tok1");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({"participants": [], "days": ["tomorrow"]}));
    });

    let client = HttpClient::new(&server.base_url(), "tok1").unwrap();
    assert!(matches!(client.fetch_state(), Err(ClientError::Parse(_))));
}

#[test]
fn test_login_redirects_decide_outcome() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/login").body_includes("password=feil");
        then.status(302).header("location", "/login");
    });
    server.mock(|when, then| {
        when.method(POST).path("/login").body_includes("password=hemmelig");
        then.status(302).header("location", "/select-user");
    });
    server.mock(|when, then| {
        when.method(POST).path("/select-user").body_includes("user_id=99");
        then.status(302).header("location", "/select-user");
    });
    let accepted = server.mock(|when, then| {
        when.method(POST).path("/select-user").body_includes("user_id=2");
        then.status(302).header("location", format!("{}/", server.base_url()));
    });

    let client = HttpClient::new(&server.base_url(), "tok1").unwrap();
    assert_eq!(client.login("feil", 2).unwrap_err(), ClientError::NotAuthenticated);
    assert!(matches!(client.login("hemmelig", 99), Err(ClientError::Validation(_))));
    client.login("hemmelig", 2).unwrap();
    accepted.assert();
}

#[test]
fn test_api_redirect_to_login_is_not_authenticated() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/duudl/tok1");
        then.status(302).header("location", "/login?next=/api/duudl/tok1");
    });

    let client = HttpClient::new(&server.base_url(), "tok1").unwrap();
    assert_eq!(client.fetch_state().unwrap_err(), ClientError::NotAuthenticated);
}

#[test]
fn test_list_polls_reads_overview_links() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("content-type", "text/html")
            .body(r#"<ul>
  <li><a href="/d/Ab3_x-9">Sykkeltur &amp; grilling</a> <a href="/d/Ab3_x-9/edit">endre</a></li>
  <li><a href="/d/Zz9"><strong>Julebord</strong></a></li>
</ul>"#);
    });

    let client = HttpClient::new(&server.base_url(), "").unwrap();
    let polls = client.list_polls().unwrap();

    mock.assert();
    assert_eq!(
        polls,
        vec![
            PollSummary { token: "Ab3_x-9".into(), title: "Sykkeltur & grilling".into() },
            PollSummary { token: "Zz9".into(), title: "Julebord".into() },
        ]
    );
}

#[test]
fn test_create_poll_posts_form_and_returns_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/duudl/new")
            .form_urlencoded_tuple("title", "Sykkeltur")
            .form_urlencoded_tuple("description", "")
            .form_urlencoded_tuple("selected_days_json", r#"["2026-02-03","2026-02-04"]"#);
        then.status(302).header("location", "/d/NewTok1");
    });

    let days = [Day::parse("2026-02-04").unwrap(), Day::parse("2026-02-03").unwrap()];
    let client = HttpClient::new(&server.base_url(), "").unwrap();
    let token = client.create_poll(&NewPollForm::new(" Sykkeltur ", "", &days)).unwrap();

    mock.assert();
    assert_eq!(token, "NewTok1");
}

#[test]
fn test_create_poll_rejected_form() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/duudl/new");
        then.status(302).header("location", "/duudl/new");
    });

    let client = HttpClient::new(&server.base_url(), "").unwrap();
    let err = client.create_poll(&NewPollForm::new("", "", &[])).unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[test]
fn test_delete_poll_outcomes() {
    let server = MockServer::start();
    let deleted = server.mock(|when, then| {
        when.method(POST).path("/d/tok1/delete");
        then.status(302).header("location", "/");
    });
    server.mock(|when, then| {
        when.method(POST).path("/d/gone/delete");
        then.status(404).body("Not found");
    });
    server.mock(|when, then| {
        when.method(POST).path("/d/locked/delete");
        then.status(302).header("location", "/login?next=/d/locked/delete");
    });

    HttpClient::new(&server.base_url(), "tok1").unwrap().delete_poll().unwrap();
    deleted.assert();

    let gone = HttpClient::new(&server.base_url(), "gone").unwrap();
    assert_eq!(gone.delete_poll().unwrap_err(), ClientError::NotFound("gone".into()));

    let locked = HttpClient::new(&server.base_url(), "locked").unwrap();
    assert_eq!(locked.delete_poll().unwrap_err(), ClientError::NotAuthenticated);
}
