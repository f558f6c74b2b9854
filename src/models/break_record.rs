//! Break session model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether break time counts as paid working time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakType {
    /// Break time is paid; it is not subtracted from working minutes.
    Paid,
    /// Break time is unpaid; effective break minutes are subtracted.
    #[default]
    Unpaid,
}

/// One break session within an attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRecord {
    /// Unique identifier of the session.
    pub id: Uuid,
    /// The attendance record that owns this session.
    pub attendance_id: Uuid,
    /// The employee who took the break.
    pub employee_id: String,
    /// 1-based position of the session within the record.
    pub sequence: u32,
    /// Start of the break (after rounding).
    pub start_time: NaiveDateTime,
    /// End of the break (after rounding), once ended.
    pub end_time: Option<NaiveDateTime>,
    /// Minutes between start and end, truncated.
    pub actual_minutes: Option<u32>,
    /// Actual minutes capped into the configured bounds.
    pub effective_minutes: Option<u32>,
    /// Whether the break started inside the night window.
    pub is_night_break: bool,
    /// Synthesized by fixed break mode rather than tracked.
    pub system_generated: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl BreakRecord {
    /// Returns true if the session has been ended.
    pub fn is_completed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Returns true if `time` lies within this completed session, inclusive of both ends.
    ///
    /// Open sessions never contain a time.
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        match self.end_time {
            Some(end) => time >= self.start_time && time <= end,
            None => false,
        }
    }

    /// Returns the `[start, end)` interval of a completed session.
    pub fn interval(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.end_time.map(|end| (self.start_time, end))
    }
}
