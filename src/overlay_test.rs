use super::*;

const WINDOW: Duration = Duration::from_millis(5000);

fn msg(login: &str, text: &str) -> ChatMessage {
    ChatMessage {
        user_id: format!("id-{login}"),
        login: login.into(),
        message: text.into(),
        timestamp: "2024-01-01T00:00:00Z".into(),
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// =============================================================
// Idle
// =============================================================

#[test]
fn starts_idle_and_hidden() {
    let widget = OverlayWidget::new(WINDOW);
    let view = widget.view();
    assert_eq!(view.phase, Phase::Idle);
    assert!(!view.visible);
    assert_eq!(view.text, ": ");
    assert!(widget.latest().is_none());
    assert!(widget.deadline().is_none());
}

#[test]
fn expire_on_idle_is_noop() {
    let mut widget = OverlayWidget::new(WINDOW);
    assert!(!widget.expire(Instant::now() + ms(60_000)));
    assert_eq!(widget.view().phase, Phase::Idle);
}

// =============================================================
// Receive
// =============================================================

#[test]
fn receive_shows_message_and_arms_deadline() {
    let mut widget = OverlayWidget::new(WINDOW);
    let t0 = Instant::now();

    let deadline = widget.receive(msg("alice", "hi"), t0);

    assert_eq!(deadline, t0 + WINDOW);
    assert_eq!(widget.deadline(), Some(t0 + WINDOW));
    let view = widget.view();
    assert_eq!(view.text, "alice: hi");
    assert!(view.visible);
    assert_eq!(view.phase, Phase::Showing);
}

#[test]
fn hides_exactly_at_deadline() {
    let mut widget = OverlayWidget::new(WINDOW);
    let t0 = Instant::now();
    widget.receive(msg("alice", "hi"), t0);

    assert!(!widget.expire(t0 + ms(4999)));
    assert!(widget.is_visible());

    assert!(widget.expire(t0 + ms(5000)));
    let view = widget.view();
    assert!(!view.visible);
    assert_eq!(view.phase, Phase::Hidden);
    assert!(widget.deadline().is_none());
}

#[test]
fn hidden_retains_latest_message() {
    let mut widget = OverlayWidget::new(WINDOW);
    let t0 = Instant::now();
    widget.receive(msg("alice", "hi"), t0);
    widget.expire(t0 + WINDOW);

    assert_eq!(widget.latest().map(|m| m.login.as_str()), Some("alice"));
    assert_eq!(widget.view().text, "alice: hi");
}

#[test]
fn second_expire_after_hide_reports_no_change() {
    let mut widget = OverlayWidget::new(WINDOW);
    let t0 = Instant::now();
    widget.receive(msg("alice", "hi"), t0);
    assert!(widget.expire(t0 + WINDOW));
    assert!(!widget.expire(t0 + WINDOW + ms(1)));
}

// =============================================================
// Latest wins
// =============================================================

#[test]
fn newer_message_moves_deadline() {
    let mut widget = OverlayWidget::new(WINDOW);
    let t0 = Instant::now();
    widget.receive(msg("alice", "first"), t0);
    widget.receive(msg("bob", "second"), t0 + ms(2000));

    assert_eq!(widget.view().text, "bob: second");

    // The first message's window ends here; the second must stay up.
    assert!(!widget.expire(t0 + ms(5000)));
    assert!(widget.is_visible());

    assert!(!widget.expire(t0 + ms(6999)));
    assert!(widget.expire(t0 + ms(7000)));
    assert!(!widget.is_visible());
}

#[test]
fn same_payload_twice_rearms_without_changing_text() {
    let mut widget = OverlayWidget::new(WINDOW);
    let t0 = Instant::now();
    widget.receive(msg("alice", "hi"), t0);
    let before = widget.view();

    widget.receive(msg("alice", "hi"), t0 + ms(100));

    assert_eq!(widget.view(), before);
    assert_eq!(widget.deadline(), Some(t0 + ms(5100)));
}

#[test]
fn message_after_hide_shows_again() {
    let mut widget = OverlayWidget::new(WINDOW);
    let t0 = Instant::now();
    widget.receive(msg("alice", "hi"), t0);
    widget.expire(t0 + WINDOW);

    widget.receive(msg("carol", "back"), t0 + ms(9000));

    let view = widget.view();
    assert!(view.visible);
    assert_eq!(view.phase, Phase::Showing);
    assert_eq!(view.text, "carol: back");
}

#[test]
fn view_serializes_phase_lowercase() {
    let widget = OverlayWidget::new(WINDOW);
    let json = serde_json::to_value(widget.view()).unwrap();
    assert_eq!(json, serde_json::json!({ "text": ": ", "visible": false, "phase": "idle" }));
}
