//! Simulated telephony data for the callpulse reference runtime.
//!
//! All data in this module is hardcoded and fictional. No external systems are
//! contacted. The `queue_log` text stands in for the file a PBX writes; the
//! legacy payloads stand in for a reporting tool's cached statistics.
//!
//! The morning shift (08:00–08:30 UTC, 2024-03-04) contains, on purpose:
//!
//! - a ring that is logged after the connect that followed it
//! - agent 1002 pausing for "break" and then "lunch" without unpausing
//! - agent 1004 unpausing with no pause in the log (paused before the shift)
//! - an event code no rule knows (`SYSCOMPAT`)
//! - one truncated line

use chrono::{DateTime, Duration, Utc};

/// 2024-03-04 08:00:00 UTC.
pub const SHIFT_START_EPOCH: i64 = 1_709_539_200;

/// Seconds covered by [`MORNING_QUEUE_LOG`].
pub const SHIFT_LENGTH_SECS: i64 = 1800;

/// `offset_secs` after the shift start.
pub fn shift_time(offset_secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(SHIFT_START_EPOCH + offset_secs)
}

pub fn shift_start() -> DateTime<Utc> {
    shift_time(0)
}

pub fn shift_end() -> DateTime<Utc> {
    shift_time(SHIFT_LENGTH_SECS)
}

// ── queue_log (mock) ──────────────────────────────────────────────────────────

/// Six calls across two queues, four agents.
///
/// | call   | queue | outcome                                   |
/// |--------|-------|-------------------------------------------|
/// | c-0001 | 500   | answered by 1001 after 4 s, 180 s talk    |
/// | c-0002 | 500   | abandoned after 35 s                      |
/// | c-0003 | 501   | answered by 1003 after 12 s, transferred  |
/// | c-0004 | 500   | still waiting at 08:30                    |
/// | c-0005 | 500   | timed out after 90 s                      |
/// | c-0006 | 500   | answered by 1001 after 30 s, still talking|
pub const MORNING_QUEUE_LOG: &str = "\
1709539200|NONE|500|1001|ADDMEMBER|
1709539205|NONE|500|1002|ADDMEMBER|
1709539210|NONE|501|1003|ADDMEMBER|
1709539260|c-0001|500|NONE|ENTERQUEUE||5551001|1
1709539264|c-0001|500|1001|CONNECT|4|c-0001b|2
1709539262|c-0001|500|1002|RINGNOANSWER|2000
1709539444|c-0001|500|1001|COMPLETECALLER|4|180|1
1709539500|NONE|500|1002|PAUSE|break
1709539620|NONE|500|1002|PAUSE|lunch
1709539700|c-0002|500|NONE|ENTERQUEUE||5551002|1
1709539735|c-0002|500|NONE|ABANDON|1|1|35
1709539800|c-0003|501|NONE|ENTERQUEUE||5551003|1
1709539812|c-0003|501|1003|CONNECT|12|c-0003b|3
1709540100|c-0003|501|1003|BLINDTRANSFER|2000|from-internal|12|288
1709540105|NONE|501|1004|UNPAUSE|
1709540200|c-0004|500|NONE|ENTERQUEUE||5551004|1
1709540210|c-0005|500|NONE|ENTERQUEUE||5551005|2
1709540220|c-0006|500|NONE|ENTERQUEUE||5551006|3
1709540250|c-0006|500|1001|CONNECT|30|c-0006b|1
1709540300|c-0005|500|NONE|EXITWITHTIMEOUT|1|1|90
1709540350|NONE|501|1004|SYSCOMPAT|
1709540400|c-0007|500
";

// ── Legacy payloads (mock) ────────────────────────────────────────────────────

/// The smallest payload the old reporting tool writes: 11 received, 11
/// answered, none abandoned.
pub const LEGACY_MINIMAL: &str = "a:3:{s:14:\"TOTAL_RECEIVED\";i:11;s:14:\"TOTAL_ANSWERED\";i:11;s:15:\"TOTAL_ABANDONED\";i:0;}";

/// A full cached snapshot for queue 500, with nested sections, numeric
/// strings, an unrelated key and one corrupted pair (`MAX_WAIT` declares 9
/// bytes but holds 8).
pub const LEGACY_SUPPORT_SNAPSHOT: &str = concat!(
    "a:4:{",
    "s:5:\"calls\";a:5:{",
    "s:14:\"TOTAL_RECEIVED\";i:42;",
    "s:14:\"TOTAL_ANSWERED\";i:36;",
    "s:18:\"TOTAL_ANSWERED_SLA\";i:30;",
    "s:15:\"TOTAL_ABANDONED\";s:1:\"5\";",
    "s:17:\"TOTAL_TRANSFERRED\";i:3;",
    "}",
    "s:5:\"times\";a:4:{",
    "s:10:\"TOTAL_WAIT\";i:540;",
    "s:10:\"TOTAL_TALK\";i:7920;",
    "s:9:\"MAX_WAIT\";i:75;",
    "s:13:\"SLA_THRESHOLD\";i:20;",
    "}",
    "s:6:\"agents\";a:6:{",
    "s:16:\"AGENTS_LOGGED_IN\";i:4;",
    "s:16:\"AGENTS_AVAILABLE\";i:1;",
    "s:11:\"AGENTS_BUSY\";i:2;",
    "s:13:\"AGENTS_PAUSED\";i:1;",
    "s:13:\"CALLS_WAITING\";i:1;",
    "s:12:\"LONGEST_WAIT\";i:12;",
    "}",
    "s:7:\"VERSION\";s:5:\"2.4.1\";",
    "}"
);
