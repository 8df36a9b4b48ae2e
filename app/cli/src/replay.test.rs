use std::sync::Arc;

use super::*;
use llm_mute_gate::LlmMuteConfig;
use llm_mute_gate::ManualClock;
use pretty_assertions::assert_eq;

fn test_gate(interval: u64) -> LlmMuteGate {
    let mut config = LlmMuteConfig::default();
    config.persistence.enabled = false;
    config.llm_interval.interval = interval;
    LlmMuteGate::new(config, Arc::new(ManualClock::new(1000.0)))
}

fn run(gate: &LlmMuteGate, input: &str) -> (ReplayStats, Vec<serde_json::Value>) {
    let mut out = Vec::new();
    let stats = replay(gate, input.as_bytes(), &mut out).unwrap();
    let lines = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    (stats, lines)
}

#[test]
fn test_parse_events() {
    let event: HostEvent =
        serde_json::from_str(r#"{"type":"mute","session_id":"g","duration":5}"#).unwrap();
    assert_eq!(
        event,
        HostEvent::Mute {
            session_id: "g".to_string(),
            duration: Some(5),
            is_admin: false,
        }
    );

    let event: HostEvent = serde_json::from_str(r#"{"type":"request","session_id":"g"}"#).unwrap();
    assert_eq!(
        event,
        HostEvent::Request {
            session_id: "g".to_string(),
            timestamp: None,
        }
    );
}

#[test]
fn test_request_defaults_to_gate_clock() {
    let gate = test_gate(10);
    gate.on_response(&LlmResponse::new("g"));

    let reply = apply(
        &gate,
        HostEvent::Request {
            session_id: "g".to_string(),
            timestamp: None,
        },
    );
    assert_eq!(
        reply,
        Some(ReplayOutput::Request {
            session_id: "g".to_string(),
            admitted: false,
            reason: Some(RejectReason::Cooldown),
            status_code: Some(12_001),
            retryable: Some(true),
        })
    );
}

#[test]
fn test_replay_session() {
    let gate = test_gate(0);
    let input = r#"
# admin mutes, a stranger cannot unmute
{"type":"mute","session_id":"g","duration":60,"is_admin":true}
{"type":"request","session_id":"g","timestamp":1000.0}
{"type":"unmute","session_id":"g"}
{"type":"unmute","session_id":"g","is_admin":true}
{"type":"request","session_id":"g","timestamp":1000.0}
{"type":"request","session_id":"g","timestamp":1000.0}
{"type":"response","session_id":"g"}
"#;

    let (stats, lines) = run(&gate, input);
    assert_eq!(stats, ReplayStats { events: 7, skipped: 0 });

    let events: Vec<&str> = lines.iter().map(|l| l["event"].as_str().unwrap()).collect();
    assert_eq!(
        events,
        ["mute", "request", "unmute", "request", "request", "response"]
    );
    assert_eq!(lines[0]["muted_until"], 1060.0);
    assert_eq!(lines[0]["remaining_secs"], 60);
    assert_eq!(lines[1]["reason"], "muted");
    assert_eq!(lines[1]["status_code"], 12_000);
    assert_eq!(lines[1]["retryable"], false);
    assert_eq!(lines[2]["message"], "LLM unmuted");
    assert_eq!(lines[3]["admitted"], true);
    assert!(lines[3].get("reason").is_none());
    assert!(lines[3].get("status_code").is_none());
    assert_eq!(lines[4]["reason"], "already_generating");
    assert_eq!(lines[4]["retryable"], true);
}

#[test]
fn test_replay_skips_malformed_lines() {
    let gate = test_gate(0);
    let input = "not json\n{\"type\":\"explode\"}\n{\"type\":\"response\",\"session_id\":\"g\"}\n";

    let (stats, lines) = run(&gate, input);
    assert_eq!(stats, ReplayStats { events: 1, skipped: 2 });
    assert_eq!(lines.len(), 1);
}
