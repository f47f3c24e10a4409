//! End-to-end editor behaviour driven through input events and a manual clock.

use duudl_core::{CellKey, Day, GridState, Participant, ParticipantId, ResponseValue};
use duudl_grid::edit::{CellPart, HitTarget, InputCapabilities, InputEvent, KeyInput, SessionTransition};
use duudl_grid::{
    render_grid, Completion, CompletionOutcome, DisplayOptions, EditorConfig, GridEditor, ManualClock, Point,
    RenderInput, WriteKind,
};

fn day(s: &str) -> Day {
    Day::parse(s).unwrap()
}

fn poll() -> GridState {
    let mut state = GridState::new(
        vec![
            Participant::new(1, "Huez-Helge"),
            Participant::new(2, "Galibier-Geir"),
            Participant::new(3, "Stelvio-Siri"),
        ],
        vec![day("2026-02-03"), day("2026-02-04"), day("2026-02-05")],
    );
    let theirs = CellKey::new(ParticipantId(2), day("2026-02-04"));
    state.set_value(theirs, ResponseValue::No).unwrap();
    state.set_comment(theirs, "jobber sent").unwrap();
    state
}

fn editor(caps: InputCapabilities) -> (ManualClock, GridEditor<ManualClock>) {
    let clock = ManualClock::new();
    let ed = GridEditor::with_clock(poll(), ParticipantId(1), caps, EditorConfig::default(), clock.clone());
    (clock, ed)
}

fn mine(d: &str) -> CellKey {
    CellKey::new(ParticipantId(1), day(d))
}

fn click(key: &CellKey, part: CellPart) -> InputEvent {
    InputEvent::Click { target: HitTarget::cell(key, part) }
}

fn pointer_down(key: &CellKey, part: CellPart) -> InputEvent {
    InputEvent::PointerDown { id: 1, pos: Point::new(0.0, 0.0), target: HitTarget::cell(key, part) }
}

#[test]
fn four_clicks_cycle_back_to_unset() {
    let (_clock, mut ed) = editor(InputCapabilities::MOUSE);
    let key = mine("2026-02-03");
    let mut seen = Vec::new();
    for _ in 0..4 {
        ed.dispatch(click(&key, CellPart::Body));
        seen.push(ed.state().value(&key));
    }
    assert_eq!(
        seen,
        vec![ResponseValue::Yes, ResponseValue::No, ResponseValue::Inconvenient, ResponseValue::Unset]
    );
}

#[test]
fn rendering_same_state_twice_is_identical() {
    let (_clock, ed) = editor(InputCapabilities::MOUSE);
    let options = DisplayOptions::default();
    let can_edit = |p: ParticipantId, _d: &Day| p == ParticipantId(1);
    let input = RenderInput { state: ed.state(), can_edit: &can_edit, editing: None, options: &options };
    let first = render_grid(&input);
    let second = render_grid(&input);
    assert_eq!(first, second);
    assert_eq!(&first, ed.view());
}

#[test]
fn failed_toggle_settles_on_previous_value() {
    let (_clock, mut ed) = editor(InputCapabilities::MOUSE);
    let key = mine("2026-02-05");
    ed.dispatch(click(&key, CellPart::Body));
    assert_eq!(ed.state().value(&key), ResponseValue::Yes);

    let writes = ed.take_writes();
    assert_eq!(writes.len(), 1);
    let renders = ed.render_count();
    let outcome = ed.complete(Completion::failed(writes[0].ticket, "HTTP 500"));

    assert_eq!(outcome, CompletionOutcome::RolledBack(key));
    assert_eq!(ed.state().value(&key), ResponseValue::Unset);
    assert_eq!(ed.view().cell(&key).map(|c| c.value), Some(ResponseValue::Unset));
    assert_eq!(ed.render_count(), renders + 1);
}

#[test]
fn keystroke_burst_sends_one_update_with_last_payload() {
    let (clock, mut ed) = editor(InputCapabilities::MOUSE);
    let key = mine("2026-02-03");
    ed.dispatch(click(&key, CellPart::Body)); // value = yes
    ed.take_writes();

    ed.dispatch(click(&key, CellPart::EditAffordance));
    for ch in ["k", "o", "m", "m", "e", "r"] {
        ed.dispatch(InputEvent::TextInput(ch.into()));
        clock.advance_ms(200);
        ed.tick();
        assert!(ed.take_writes().is_empty());
    }

    clock.advance_ms(250);
    ed.tick();
    let writes = ed.take_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].key, key);
    assert_eq!(writes[0].value, ResponseValue::Yes);
    assert_eq!(writes[0].comment, "kommer");
    assert_eq!(writes[0].kind, WriteKind::CommentCommit { flushed: false });
    // the session is still open; the visible cell already shows the text
    assert!(ed.session().is_active());
    assert_eq!(ed.view().cell(&key).map(|c| c.text.as_str()), Some("kommer"));
}

#[test]
fn opening_b_commits_a_once_before_b_is_active() {
    let (_clock, mut ed) = editor(InputCapabilities::MOUSE);
    let a = mine("2026-02-03");
    let b = mine("2026-02-04");

    ed.dispatch(click(&a, CellPart::EditAffordance));
    ed.dispatch(InputEvent::TextInput("sent".into()));
    assert!(ed.is_commit_pending(&a));

    ed.dispatch(pointer_down(&b, CellPart::EditAffordance));
    ed.dispatch(click(&b, CellPart::EditAffordance));

    let writes = ed.take_writes();
    let for_a: Vec<_> = writes.iter().filter(|w| w.key == a).collect();
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0].comment, "sent");
    assert_eq!(for_a[0].kind, WriteKind::CommentCommit { flushed: true });
    assert!(!ed.is_commit_pending(&a));

    let journal = ed.session().journal();
    assert_eq!(
        journal,
        &[
            SessionTransition::Entered(a),
            SessionTransition::Flushed(a),
            SessionTransition::Exited(a),
            SessionTransition::Entered(b),
        ]
    );
    assert_eq!(ed.session().active(), Some(&b));
    assert_eq!(ed.session().editor_allocations(), 1);
}

#[test]
fn switching_sessions_directly_also_flushes_first() {
    let (_clock, mut ed) = editor(InputCapabilities::TOUCH);
    let a = mine("2026-02-03");
    let b = mine("2026-02-05");
    assert!(ed.enter_session(a));
    ed.dispatch(InputEvent::TextInput("tidlig".into()));
    assert!(ed.enter_session(b));

    let writes = ed.take_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].key, a);
    assert_eq!(writes[0].comment, "tidlig");
    assert_eq!(ed.session().journal().last(), Some(&SessionTransition::Entered(b)));
}

#[test]
fn long_press_enters_edit_mode_on_touch() {
    let (clock, mut ed) = editor(InputCapabilities::TOUCH);
    let key = mine("2026-02-04");
    ed.dispatch(pointer_down(&key, CellPart::Body));
    assert!(ed.scroll_suppressed());
    clock.advance_ms(300);
    ed.tick();
    assert!(!ed.session().is_active());
    clock.advance_ms(220);
    ed.tick();
    assert_eq!(ed.session().active(), Some(&key));

    // the tap produced by lifting the finger must not toggle the value
    ed.dispatch(InputEvent::PointerUp { id: 1, pos: Point::new(0.0, 0.0) });
    ed.dispatch(click(&key, CellPart::Body));
    assert_eq!(ed.state().value(&key), ResponseValue::Unset);
    assert!(!ed.scroll_suppressed());
}

#[test]
fn moving_during_long_press_aborts_without_side_effects() {
    let (clock, mut ed) = editor(InputCapabilities::TOUCH);
    let key = mine("2026-02-04");
    let before = ed.state().clone();
    let renders = ed.render_count();

    ed.dispatch(pointer_down(&key, CellPart::Body));
    clock.advance_ms(100);
    ed.dispatch(InputEvent::PointerMove { id: 1, pos: Point::new(0.0, 8.0) });
    clock.advance_ms(100);
    ed.dispatch(InputEvent::PointerMove { id: 1, pos: Point::new(0.0, 16.0) });
    clock.advance_ms(600);
    ed.tick();
    // lifting on the same cell still yields a tap, which must not toggle
    ed.dispatch(InputEvent::PointerUp { id: 1, pos: Point::new(0.0, 16.0) });
    ed.dispatch(click(&key, CellPart::Body));

    assert!(!ed.session().is_active());
    assert!(ed.session().journal().is_empty());
    assert_eq!(ed.state(), &before);
    assert!(ed.take_writes().is_empty());
    assert_eq!(ed.render_count(), renders);
    assert!(!ed.scroll_suppressed());
}

#[test]
fn touch_taps_inside_grid_are_intercepted_while_editing() {
    let (_clock, mut ed) = editor(InputCapabilities::TOUCH);
    let a = mine("2026-02-03");
    let other_day = mine("2026-02-04");
    ed.enter_session(a);

    ed.dispatch(click(&other_day, CellPart::Body));
    ed.dispatch(InputEvent::Click { target: HitTarget::GridChrome });
    assert_eq!(ed.state().value(&other_day), ResponseValue::Unset);
    assert_eq!(ed.session().active(), Some(&a));

    ed.dispatch(InputEvent::Click { target: HitTarget::OutsideGrid });
    assert!(!ed.session().is_active());
    assert_eq!(ed.take_writes().len(), 1);
}

#[test]
fn clicking_the_cell_being_edited_does_not_toggle_it() {
    let (_clock, mut ed) = editor(InputCapabilities::MOUSE);
    let key = mine("2026-02-03");
    ed.dispatch(click(&key, CellPart::EditAffordance));
    ed.dispatch(pointer_down(&key, CellPart::Body));
    ed.dispatch(click(&key, CellPart::Body));
    assert_eq!(ed.state().value(&key), ResponseValue::Unset);
    assert!(ed.session().is_active());
}

#[test]
fn outside_pointer_down_and_keys_end_the_session() {
    let (_clock, mut ed) = editor(InputCapabilities::MOUSE);
    let key = mine("2026-02-03");
    for exit in [
        InputEvent::PointerDown { id: 1, pos: Point::new(900.0, 900.0), target: HitTarget::OutsideGrid },
        InputEvent::Key(KeyInput::Escape),
        InputEvent::FocusLost,
    ] {
        ed.enter_session(key);
        ed.dispatch(exit);
        assert!(!ed.session().is_active());
    }
    // every exit commits, even with nothing typed
    assert_eq!(ed.take_writes().len(), 3);
}

#[test]
fn foreign_cells_cannot_be_toggled_or_edited() {
    let (clock, mut ed) = editor(InputCapabilities::MOUSE);
    let theirs = CellKey::new(ParticipantId(2), day("2026-02-04"));
    let before = ed.state().clone();

    ed.dispatch(click(&theirs, CellPart::Body));
    ed.dispatch(click(&theirs, CellPart::EditAffordance));
    assert!(!ed.enter_session(theirs));
    ed.dispatch(InputEvent::TextInput("hijack".into()));
    clock.advance_ms(1000);
    ed.tick();

    assert_eq!(ed.state(), &before);
    assert!(!ed.session().is_active());
    assert!(ed.take_writes().is_empty());
    assert!(ed.view().cell(&theirs).is_some_and(|c| !c.editable));
}

#[test]
fn foreign_cells_cannot_be_long_pressed() {
    let (clock, mut ed) = editor(InputCapabilities::TOUCH);
    let theirs = CellKey::new(ParticipantId(3), day("2026-02-03"));
    ed.dispatch(pointer_down(&theirs, CellPart::Body));
    clock.advance_ms(1000);
    ed.tick();
    assert!(!ed.session().is_active());
}

#[test]
fn malformed_targets_are_ignored() {
    let (_clock, mut ed) = editor(InputCapabilities::MOUSE);
    let before = ed.state().clone();
    for target in [
        HitTarget::Cell { user_id: None, day: Some("2026-02-03".into()), part: CellPart::Body },
        HitTarget::Cell { user_id: Some("1".into()), day: Some("tirsdag".into()), part: CellPart::Body },
        HitTarget::Cell { user_id: Some("1".into()), day: None, part: CellPart::EditAffordance },
    ] {
        ed.dispatch(InputEvent::Click { target });
    }
    assert_eq!(ed.state(), &before);
    assert!(ed.take_writes().is_empty());
}

#[test]
fn out_of_order_completions_are_not_ordered() {
    let (_clock, mut ed) = editor(InputCapabilities::MOUSE);
    let key = mine("2026-02-03");
    ed.dispatch(click(&key, CellPart::Body)); // yes
    ed.dispatch(click(&key, CellPart::Body)); // no
    let writes = ed.take_writes();
    assert_eq!(writes.len(), 2);

    assert_eq!(ed.complete(Completion::ok(writes[1].ticket)), CompletionOutcome::Settled);
    // the older request fails after the newer one succeeded
    ed.complete(Completion::failed(writes[0].ticket, "timeout"));
    assert_eq!(ed.state().value(&key), ResponseValue::Unset);
}
