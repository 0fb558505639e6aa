use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use strum_macros::IntoStaticStr;

pub const DEFAULT_STATUS: &str = "Hadir";

/// Where an account stands for one calendar day.
///
/// A stored attendance row is always `CheckedIn` or `CheckedOut`; the absence
/// of a row for the day is `NotCheckedIn`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceState {
    NotCheckedIn,
    CheckedIn {
        check_in: NaiveTime,
    },
    CheckedOut {
        check_in: NaiveTime,
        check_out: NaiveTime,
    },
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("Already checked in today")]
    AlreadyCheckedIn,
    #[error("No active check-in found")]
    NotCheckedIn,
    #[error("Already checked out")]
    AlreadyCheckedOut,
    #[error("Check-out time {check_out} precedes check-in time {check_in}")]
    CheckOutBeforeCheckIn {
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    },
}

impl AttendanceState {
    /// Rebuilds the state from nullable storage columns. A check-out without a
    /// check-in has no meaning and yields `None`.
    pub fn from_times(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> Option<Self> {
        match (check_in, check_out) {
            (None, None) => Some(AttendanceState::NotCheckedIn),
            (Some(check_in), None) => Some(AttendanceState::CheckedIn { check_in }),
            (Some(check_in), Some(check_out)) => Some(AttendanceState::CheckedOut {
                check_in,
                check_out,
            }),
            (None, Some(_)) => None,
        }
    }

    pub fn check_in_time(&self) -> Option<NaiveTime> {
        match *self {
            AttendanceState::NotCheckedIn => None,
            AttendanceState::CheckedIn { check_in } => Some(check_in),
            AttendanceState::CheckedOut { check_in, .. } => Some(check_in),
        }
    }

    pub fn check_out_time(&self) -> Option<NaiveTime> {
        match *self {
            AttendanceState::CheckedOut { check_out, .. } => Some(check_out),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// `NotCheckedIn -> CheckedIn`.
    pub fn check_in(self, at: NaiveTime) -> Result<Self, TransitionError> {
        match self {
            AttendanceState::NotCheckedIn => Ok(AttendanceState::CheckedIn { check_in: at }),
            _ => Err(TransitionError::AlreadyCheckedIn),
        }
    }

    /// `CheckedIn -> CheckedOut`. `day` is the record's day bucket, so a
    /// check-out after midnight still compares correctly against the check-in.
    pub fn check_out(self, day: NaiveDate, now: NaiveDateTime) -> Result<Self, TransitionError> {
        match self {
            AttendanceState::NotCheckedIn => Err(TransitionError::NotCheckedIn),
            AttendanceState::CheckedOut { .. } => Err(TransitionError::AlreadyCheckedOut),
            AttendanceState::CheckedIn { check_in } => {
                let check_in_at = day.and_time(check_in);
                if now < check_in_at {
                    return Err(TransitionError::CheckOutBeforeCheckIn {
                        check_in: check_in_at,
                        check_out: now,
                    });
                }
                Ok(AttendanceState::CheckedOut {
                    check_in,
                    check_out: clock_time(now),
                })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    pub id: u64,
    pub account_id: u64,
    pub date: NaiveDate,
    pub state: AttendanceState,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub account_id: u64,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub status: String,
    pub notes: Option<String>,
}

/// The day bucket: `now` with its time of day zeroed.
pub fn day_bucket(now: NaiveDateTime) -> NaiveDate {
    now.date()
}

/// Wall-clock time at whole-second precision, rendered as `HH:MM:SS`.
pub fn clock_time(now: NaiveDateTime) -> NaiveTime {
    let time = now.time();
    time.with_nanosecond(0).unwrap_or(time)
}

/// Falls back to the default status when the client sent none or a blank one.
pub fn status_or_default(status: Option<String>) -> String {
    status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string())
}
