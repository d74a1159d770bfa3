//! Soroban RPC client — polls `getEvents` and decodes crisis ledger events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns a soft error or a
//!   rate-limit response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//! * JSON-RPC `-32600` / `-32601` are treated as hard failures and surfaced.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, LedgerEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// JSON-RPC codes that will never succeed on retry.
const HARD_ERROR_CODES: [i64; 2] = [-32600, -32601];

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Decoded topic list, one JSON-encoded ScVal per entry.
    pub topic: Vec<String>,
    /// Decoded event data.
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// One page of `getEvents` output.
#[derive(Debug, Default)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub next_cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// Doubling retry delay capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = Backoff::new();
    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&payload).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.secs);
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if HARD_ERROR_CODES.contains(&err.code) {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs, err.code, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventPage {
            events: result.events,
            next_cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`LedgerEvent`]s.
///
/// Events from reverted invocations are dropped: the ledger only notifies on
/// successful mutations.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<LedgerEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<LedgerEvent> {
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let subject = kind.subject();
    let subject_id = subject.and_then(|_| raw.topic.get(1).map(|t| extract_scalar(t)));

    let mut fields = decode_data(&raw.value, kind);
    // `trusted` carries the identity as its second topic.
    if kind == EventKind::TrustUpdated && fields.actor.is_none() {
        fields.actor = raw.topic.get(1).map(|t| extract_scalar(t));
    }

    Some(LedgerEvent {
        event_type: kind.as_str().to_string(),
        subject_kind: subject.map(|s| s.as_str().to_string()),
        subject_id,
        actor: fields.actor,
        amount: fields.amount,
        detail: fields.detail,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

#[derive(Debug, Default)]
struct DataFields {
    actor: Option<String>,
    amount: Option<String>,
    detail: Option<String>,
}

/// Pull apart the JSON `value` blob that Soroban returns for event data.
fn decode_data(value: &Value, kind: EventKind) -> DataFields {
    match kind {
        EventKind::ReportSubmitted => DataFields {
            actor: extract_field(value, &["submitter"]).or_else(|| find_nested(value, "submitter")),
            amount: None,
            detail: extract_field(value, &["title"]),
        },
        EventKind::ReportApproved => DataFields {
            actor: extract_field(value, &["approver"]),
            amount: None,
            detail: extract_field(value, &["approvals"]),
        },
        EventKind::ReportVerified => DataFields {
            detail: extract_field(value, &["approvals"]),
            ..Default::default()
        },
        EventKind::DonationReceived => DataFields {
            actor: extract_field(value, &["donor"]).or_else(|| find_nested(value, "donor")),
            amount: extract_field(value, &["amount"]),
            detail: extract_field(value, &["message"]),
        },
        EventKind::TrustUpdated => DataFields {
            actor: extract_field(value, &["identity"]),
            amount: None,
            detail: extract_field(value, &["trusted"]),
        },
        EventKind::FundsWithdrawn => DataFields {
            actor: extract_field(value, &["admin"]),
            amount: extract_field(value, &["amount"]),
            detail: None,
        },
        EventKind::AdminTransferred => DataFields {
            actor: extract_field(value, &["new_admin"]),
            amount: None,
            detail: extract_field(value, &["previous"]),
        },
        EventKind::Unknown => DataFields::default(),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
}

fn find_nested(value: &Value, key: &str) -> Option<String> {
    if let Value::Object(map) = value {
        for (k, v) in map {
            if k == key {
                return v.as_str().map(String::from);
            }
            if let Some(found) = find_nested(v, key) {
                return Some(found);
            }
        }
    }
    None
}

/// Extract a Soroban Symbol from the decoded topic string.
/// The RPC may return `{"type":"symbol","value":"submitted"}` or just the raw string.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    raw.to_string()
}

/// Extract an id or address from a topic entry that might be a JSON object or a raw value.
fn extract_scalar(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        match v.get("value") {
            Some(Value::Number(n)) => return n.to_string(),
            Some(Value::String(s)) => return s.clone(),
            _ => {}
        }
    }
    raw.to_string()
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_event(topic: &[&str], value: Value) -> RawEvent {
        RawEvent {
            topic: topic.iter().map(|t| t.to_string()).collect(),
            value,
            contract_id: Some("CONTRACT1".to_string()),
            tx_hash: Some("TX1".to_string()),
            ledger: Some(1000),
            ledger_closed_at: Some("2024-01-01T00:00:00Z".to_string()),
            in_successful_contract_call: Some(true),
        }
    }

    #[test]
    fn event_kind_from_topic() {
        assert_eq!(EventKind::from_topic("submitted"), EventKind::ReportSubmitted);
        assert_eq!(EventKind::from_topic("approved"), EventKind::ReportApproved);
        assert_eq!(EventKind::from_topic("verified"), EventKind::ReportVerified);
        assert_eq!(EventKind::from_topic("donated"), EventKind::DonationReceived);
        assert_eq!(EventKind::from_topic("trusted"), EventKind::TrustUpdated);
        assert_eq!(EventKind::from_topic("withdrawn"), EventKind::FundsWithdrawn);
        assert_eq!(EventKind::from_topic("admin_set"), EventKind::AdminTransferred);
        assert_eq!(EventKind::from_topic("something_else"), EventKind::Unknown);
    }

    #[test]
    fn event_kind_as_str() {
        assert_eq!(EventKind::ReportSubmitted.as_str(), "report_submitted");
        assert_eq!(EventKind::ReportVerified.as_str(), "report_verified");
        assert_eq!(EventKind::DonationReceived.as_str(), "donation_received");
        assert_eq!(EventKind::TrustUpdated.as_str(), "trust_updated");
    }

    #[test]
    fn extract_symbol_from_json() {
        let raw = r#"{"type":"symbol","value":"donated"}"#;
        assert_eq!(extract_symbol(raw), "donated");
    }

    #[test]
    fn extract_symbol_raw_fallback() {
        assert_eq!(extract_symbol("verified"), "verified");
    }

    #[test]
    fn build_params_prefers_cursor() {
        let with_cursor = build_params("C1", 10, Some("abc"), 50);
        assert_eq!(with_cursor["pagination"]["cursor"], "abc");
        assert!(with_cursor.get("startLedger").is_none());

        let from_ledger = build_params("C1", 10, None, 50);
        assert_eq!(from_ledger["startLedger"], 10);
        assert_eq!(from_ledger["pagination"]["limit"], 50);
    }

    #[test]
    fn decode_report_submitted_event() {
        let raw = raw_event(
            &[
                r#"{"type":"symbol","value":"submitted"}"#,
                r#"{"type":"u64","value":"7"}"#,
            ],
            json!({ "report_id": 7, "submitter": "GREPORTER", "title": "Flood in District 5", "content_ref": "QmCID" }),
        );

        let events = decode_events(&[raw], "CONTRACT1");
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert_eq!(ev.event_type, "report_submitted");
        assert_eq!(ev.subject_kind.as_deref(), Some("report"));
        assert_eq!(ev.subject_id.as_deref(), Some("7"));
        assert_eq!(ev.actor.as_deref(), Some("GREPORTER"));
        assert_eq!(ev.detail.as_deref(), Some("Flood in District 5"));
        assert_eq!(ev.amount, None);
        assert_eq!(ev.timestamp, 1_704_067_200);
    }

    #[test]
    fn decode_donation_event() {
        let raw = raw_event(
            &[
                r#"{"type":"symbol","value":"donated"}"#,
                r#"{"type":"u64","value":3}"#,
            ],
            json!({ "donation_id": 3, "donor": "GDONOR", "amount": "15000000", "message": "for relief" }),
        );

        let events = decode_events(&[raw], "CONTRACT1");
        let ev = &events[0];
        assert_eq!(ev.event_type, "donation_received");
        assert_eq!(ev.subject_kind.as_deref(), Some("donation"));
        assert_eq!(ev.subject_id.as_deref(), Some("3"));
        assert_eq!(ev.actor.as_deref(), Some("GDONOR"));
        assert_eq!(ev.amount.as_deref(), Some("15000000"));
        assert_eq!(ev.detail.as_deref(), Some("for relief"));
        assert_eq!(ev.ledger, 1000);
    }

    #[test]
    fn decode_trust_event_falls_back_to_topic_identity() {
        let raw = raw_event(
            &[
                r#"{"type":"symbol","value":"trusted"}"#,
                r#"{"type":"address","value":"GTRUSTED"}"#,
            ],
            json!({ "trusted": true }),
        );

        let events = decode_events(&[raw], "CONTRACT1");
        let ev = &events[0];
        assert_eq!(ev.event_type, "trust_updated");
        assert_eq!(ev.subject_kind, None);
        assert_eq!(ev.subject_id, None);
        assert_eq!(ev.actor.as_deref(), Some("GTRUSTED"));
        assert_eq!(ev.detail.as_deref(), Some("true"));
    }

    #[test]
    fn decode_skips_failed_calls() {
        let mut raw = raw_event(&["verified"], json!({ "report_id": 1, "approvals": 3 }));
        raw.in_successful_contract_call = Some(false);
        assert!(decode_events(&[raw], "CONTRACT1").is_empty());
    }

    #[test]
    fn decode_skips_events_without_topics() {
        let raw = raw_event(&[], json!(null));
        assert!(decode_events(&[raw], "CONTRACT1").is_empty());
    }

    #[test]
    fn parse_iso_timestamp() {
        let ts = parse_iso_to_unix("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, 1_704_067_200);
    }
}
