use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_admission_accessors() {
    assert!(Admission::Admit.is_admitted());
    assert!(!Admission::Admit.should_stop());
    assert_eq!(Admission::Admit.reject_reason(), None);

    let rejected = Admission::Reject(RejectReason::Cooldown);
    assert!(rejected.should_stop());
    assert_eq!(rejected.reject_reason(), Some(RejectReason::Cooldown));
}

#[test]
fn test_admission_json() {
    assert_eq!(
        serde_json::to_value(Admission::Admit).unwrap(),
        serde_json::json!({"decision": "admit"})
    );
    assert_eq!(
        serde_json::to_value(Admission::Reject(RejectReason::AlreadyGenerating)).unwrap(),
        serde_json::json!({"decision": "reject", "reason": "already_generating"})
    );
}

#[test]
fn test_reject_reason_display_and_status() {
    assert_eq!(RejectReason::Muted.to_string(), "muted");
    assert_eq!(RejectReason::AlreadyGenerating.as_ref(), "already_generating");
    assert_eq!(RejectReason::Muted.status_code(), StatusCode::Muted);
    assert_eq!(RejectReason::Cooldown.status_code(), StatusCode::RateLimited);
    assert_eq!(RejectReason::AlreadyGenerating.status_code(), StatusCode::Busy);
}

#[test]
fn test_mute_receipt_message() {
    let receipt = MuteReceipt {
        session_id: "s".to_string(),
        remaining: Duration::from_secs(3660),
        muted_until: 1_700_000_000.0,
    };
    let message = receipt.message();
    assert!(message.starts_with("LLM muted for 1h 1m\nUnmute at: "));
    assert!(message.ends_with(&format_timestamp(1_700_000_000.0)));
}

#[test]
fn test_unmute_receipt_message() {
    let receipt = UnmuteReceipt {
        session_id: "s".to_string(),
    };
    assert_eq!(receipt.message(), "LLM unmuted");
}
