use super::*;
use crate::notify::Toast;
use crate::wheel::WheelPhase;
use serde_json::{Value, json};

fn to_value(frame: &ServerFrame) -> Value {
    serde_json::from_str(&frame.to_json().unwrap()).unwrap()
}

// =============================================================================
// ClientFrame
// =============================================================================

#[test]
fn parse_login() {
    let frame = ClientFrame::parse(r#"{"type":"login","name":"Alice","password":"pw"}"#).unwrap();
    assert_eq!(frame, ClientFrame::Login { name: "Alice".into(), password: "pw".into() });
}

#[test]
fn parse_spin_and_logout() {
    assert_eq!(ClientFrame::parse(r#"{"type":"spin"}"#).unwrap(), ClientFrame::Spin);
    assert_eq!(ClientFrame::parse(r#"{"type":"logout"}"#).unwrap(), ClientFrame::Logout);
}

#[test]
fn kind_names_the_frame_type() {
    let login = ClientFrame::Login { name: "Alice".into(), password: "secret".into() };
    assert_eq!(login.kind(), "login");
    assert_eq!(ClientFrame::Spin.kind(), "spin");
}

#[test]
fn parse_rejects_unknown_type() {
    assert!(ClientFrame::parse(r#"{"type":"cheat","winner":"me"}"#).is_err());
}

#[test]
fn parse_rejects_login_without_password_field() {
    assert!(ClientFrame::parse(r#"{"type":"login","name":"Alice"}"#).is_err());
}

#[test]
fn parse_rejects_garbage() {
    assert!(ClientFrame::parse("not json").is_err());
}

// =============================================================================
// ServerFrame
// =============================================================================

#[test]
fn connected_frame_shape() {
    let id = Uuid::nil();
    let value = to_value(&ServerFrame::Connected { session_id: id });
    assert_eq!(value, json!({"type": "connected", "session_id": id.to_string()}));
}

#[test]
fn toast_frame_flattens_toast_fields() {
    let value = to_value(&ServerFrame::Toast(Toast::success("You drew: Bob!").with_duration_ms(5000)));
    assert_eq!(
        value,
        json!({"type": "toast", "level": "success", "message": "You drew: Bob!", "duration_ms": 5000})
    );
}

#[test]
fn toast_without_duration_omits_field() {
    let value = to_value(&ServerFrame::Toast(Toast::error("Nobody is available!")));
    assert!(value.get("duration_ms").is_none());
    assert_eq!(value["level"], "error");
}

#[test]
fn wheel_frame_shape() {
    let view = WheelView { phase: WheelPhase::Spinning, rotation_deg: 2115.0, eased: true, transition_ms: 4000 };
    let value = to_value(&ServerFrame::Wheel(view));
    assert_eq!(
        value,
        json!({"type": "wheel", "phase": "spinning", "rotation_deg": 2115.0, "eased": true, "transition_ms": 4000})
    );
}

#[test]
fn view_frame_uses_camel_case_participants() {
    let view = SessionView {
        people: vec![Participant { id: "A".into(), available: false, assigned_to: Some("B".into()) }],
        current_user: Some("B".into()),
        assigned_to: Some("A".into()),
        segments: vec![],
        spinning: false,
        can_spin: false,
        result: Some("A".into()),
    };
    let value = to_value(&ServerFrame::View(view));
    assert_eq!(value["type"], "view");
    assert_eq!(value["people"][0]["assignedTo"], "B");
    assert_eq!(value["current_user"], "B");
    assert_eq!(value["can_spin"], false);
}
