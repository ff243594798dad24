//! Reader for the pipe-delimited telephony `queue_log` text format.
//!
//! One record per line:
//!
//! ```text
//! epoch|callid|queue|agent|EVENT|data1|data2|...
//! 1700000000|1700000000.42|500|NONE|ENTERQUEUE||5551234|1
//! 1700000005|1700000000.42|500|1001|CONNECT|5|1700000000.43|2
//! ```
//!
//! The trailing data fields mean different things per event; the reader
//! lifts the ones the engine uses into named payload keys:
//!
//! | event             | data fields                                  |
//! |-------------------|----------------------------------------------|
//! | `PAUSE*`          | data1 → reason                               |
//! | `ENTERQUEUE`      | data2 → caller id, data3 → position          |
//! | `CONNECT`         | data1 → hold secs                            |
//! | `COMPLETE*`       | data1 → hold secs, data2 → talk secs         |
//! | `*TRANSFER`       | data3 → hold secs, data4 → talk secs         |
//! | `ABANDON`, `EXIT*`| data1 → position                             |
//!
//! Reported talk time also becomes the record's `duration_hint`. Anything
//! else is kept verbatim as `data1`, `data2`, ... so nothing is lost.

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

use callpulse_contracts::{
    error::{CallpulseError, CallpulseResult},
    event::{EventPayload, RawEvent},
};

/// Result of reading a whole `queue_log` file.
#[derive(Debug, Clone, Default)]
pub struct QueueLogImport {
    /// Accepted records, sequence numbers in line order starting at 1.
    pub events: Vec<RawEvent>,
    /// Lines that could not be parsed.
    pub skipped: u64,
}

/// Parse one line. Blank lines are the caller's business.
pub fn parse_line(line: &str, sequence: u64) -> CallpulseResult<RawEvent> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('|').collect();
    if fields.len() < 5 {
        return Err(CallpulseError::MalformedInput {
            reason: format!("expected at least 5 '|' separated fields, got {}", fields.len()),
        });
    }

    let timestamp = parse_epoch(fields[0])?;
    let code = fields[4].trim();
    if code.is_empty() {
        return Err(CallpulseError::MalformedInput {
            reason: "empty event code".to_string(),
        });
    }

    let data: Vec<&str> = fields[5..].iter().map(|d| d.trim()).collect();
    let (payload, duration_hint) = payload_for(code, &data);

    Ok(RawEvent {
        sequence,
        agent: optional(fields[3]),
        queue: optional(fields[2]),
        call_id: optional(fields[1]),
        code: code.to_string(),
        timestamp,
        payload,
        duration_hint,
    })
}

/// Read a whole file, skipping and counting malformed lines.
pub fn read_queue_log(text: &str) -> QueueLogImport {
    let mut import = QueueLogImport::default();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let sequence = import.events.len() as u64 + 1;
        match parse_line(line, sequence) {
            Ok(event) => import.events.push(event),
            Err(e) => {
                import.skipped += 1;
                warn!(line = line_no + 1, error = %e, "queue_log line skipped");
            }
        }
    }
    debug!(
        accepted = import.events.len(),
        skipped = import.skipped,
        "queue_log read"
    );
    import
}

fn parse_epoch(field: &str) -> CallpulseResult<DateTime<Utc>> {
    let field = field.trim();
    // Some writers append fractional seconds.
    let whole = field.split('.').next().unwrap_or(field);
    let secs: i64 = whole.parse().map_err(|_| CallpulseError::MalformedInput {
        reason: format!("invalid epoch timestamp '{}'", field),
    })?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| CallpulseError::MalformedInput {
            reason: format!("epoch timestamp out of range '{}'", field),
        })
}

fn optional(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn payload_for(code: &str, data: &[&str]) -> (EventPayload, Option<u64>) {
    let upper = code.to_ascii_uppercase();
    let mut payload = EventPayload::new();
    let get = |i: usize| data.get(i).copied().unwrap_or("");
    let mut talk_index = None;

    if upper.contains("PAUSE") && !upper.contains("UNPAUSE") {
        payload.insert(EventPayload::REASON, get(0));
    } else if upper == "ENTERQUEUE" {
        payload.insert(EventPayload::CALLER_ID, get(1));
        payload.insert(EventPayload::POSITION, get(2));
    } else if upper == "CONNECT" {
        payload.insert(EventPayload::HOLD_SECS, get(0));
    } else if upper.starts_with("COMPLETE") {
        payload.insert(EventPayload::HOLD_SECS, get(0));
        talk_index = Some(1);
    } else if upper.ends_with("TRANSFER") {
        payload.insert(EventPayload::HOLD_SECS, get(2));
        talk_index = Some(3);
    } else if upper == "ABANDON" || upper.starts_with("EXIT") {
        payload.insert(EventPayload::POSITION, get(0));
    }

    if let Some(i) = talk_index {
        payload.insert(EventPayload::TALK_SECS, get(i));
    }
    for (i, value) in data.iter().enumerate() {
        payload.insert(&format!("data{}", i + 1), *value);
    }

    let duration_hint = payload.talk_secs();
    (payload, duration_hint)
}
