use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    db::{OfficeStore, StoreError},
    error::{ApiError, ApiResult},
    model::attendance::{
        AttendanceRecord, AttendanceState, NewAttendance, clock_time, day_bucket,
        status_or_default,
    },
};

/// Days of history returned alongside today's record.
const HISTORY_DAYS: u32 = 30;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AttendanceAction {
    CheckIn {
        #[schema(example = "Hadir")]
        status: Option<String>,
        notes: Option<String>,
    },
    CheckOut {
        #[schema(example = 12)]
        id: u64,
    },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: u64,
    pub account_id: u64,
    #[schema(value_type = String, format = "date", example = "2024-01-01")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:00:00")]
    pub check_out: Option<NaiveTime>,
    #[schema(value_type = String, example = "checked_in")]
    pub state: &'static str,
    #[schema(example = "Hadir")]
    pub status: String,
    pub notes: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}

impl From<&AttendanceRecord> for AttendanceResponse {
    fn from(record: &AttendanceRecord) -> Self {
        AttendanceResponse {
            id: record.id,
            account_id: record.account_id,
            date: record.date,
            check_in: record.state.check_in_time(),
            check_out: record.state.check_out_time(),
            state: record.state.name(),
            status: record.status.clone(),
            notes: record.notes.clone(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceOverview {
    /// `not_checked_in`, `checked_in` or `checked_out`.
    #[schema(value_type = String, example = "not_checked_in")]
    pub state: &'static str,
    pub today: Option<AttendanceResponse>,
    pub history: Vec<AttendanceResponse>,
}

/// Starts the day for `account_id`. The store's unique index is the final
/// word: a concurrent check-in that slips past the lookup still comes back as
/// a duplicate.
pub async fn record_check_in(
    store: &dyn OfficeStore,
    account_id: u64,
    now: NaiveDateTime,
    status: Option<String>,
    notes: Option<String>,
) -> ApiResult<AttendanceRecord> {
    let day = day_bucket(now);

    let current = store
        .find_attendance_for_day(account_id, day)
        .await?
        .map(|r| r.state)
        .unwrap_or(AttendanceState::NotCheckedIn);

    let AttendanceState::CheckedIn { check_in } = current.check_in(clock_time(now))? else {
        return Err(ApiError::Internal("check-in produced no check-in time".into()));
    };

    let record = store
        .insert_attendance(NewAttendance {
            account_id,
            date: day,
            check_in,
            status: status_or_default(status),
            notes: notes.filter(|n| !n.trim().is_empty()),
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation { .. } => {
                ApiError::Duplicate("Already checked in today".into())
            }
            other => other.into(),
        })?;

    info!(account_id, attendance_id = record.id, %day, "Checked in");
    Ok(record)
}

/// Closes `record_id`. Only the owner may check out, and only once.
pub async fn record_check_out(
    store: &dyn OfficeStore,
    account_id: u64,
    record_id: u64,
    now: NaiveDateTime,
) -> ApiResult<AttendanceRecord> {
    let mut record = match store.find_attendance(record_id).await? {
        Some(r) if r.account_id == account_id => r,
        Some(_) => {
            warn!(account_id, attendance_id = record_id, "Check-out on another account's record");
            return Err(ApiError::NotFound("Attendance record not found".into()));
        }
        None => return Err(ApiError::NotFound("Attendance record not found".into())),
    };

    let next = record.state.check_out(record.date, now)?;
    let Some(check_out) = next.check_out_time() else {
        return Err(ApiError::Internal("check-out produced no check-out time".into()));
    };

    if !store.set_check_out(record.id, check_out).await? {
        // Lost a race with another check-out of the same record.
        return Err(ApiError::Conflict("Already checked out".into()));
    }

    record.state = next;
    info!(account_id, attendance_id = record.id, "Checked out");
    Ok(record)
}

/// Check in or check out
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceAction,
    responses(
        (status = 200, description = "Attendance record after the transition", body = AttendanceResponse),
        (status = 400, description = "Invalid action or check-out before check-in", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Attendance record not found", body = ErrorBody),
        (status = 409, description = "Already checked in today / already checked out", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn record_attendance(
    auth: AuthUser,
    store: web::Data<dyn OfficeStore>,
    payload: web::Json<AttendanceAction>,
) -> ApiResult<HttpResponse> {
    let now = Local::now().naive_local();
    debug!(account_id = auth.account_id, action = ?payload, "Attendance request");

    let record = match payload.into_inner() {
        AttendanceAction::CheckIn { status, notes } => {
            record_check_in(store.get_ref(), auth.account_id, now, status, notes).await?
        }
        AttendanceAction::CheckOut { id } => {
            record_check_out(store.get_ref(), auth.account_id, id, now).await?
        }
    };

    Ok(HttpResponse::Ok().json(AttendanceResponse::from(&record)))
}

/// Today's state and recent history
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Caller's attendance for today and the last 30 days", body = AttendanceOverview),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_overview(
    auth: AuthUser,
    store: web::Data<dyn OfficeStore>,
) -> ApiResult<HttpResponse> {
    let today = day_bucket(Local::now().naive_local());

    let todays = store.find_attendance_for_day(auth.account_id, today).await?;
    let history = store
        .attendance_history(auth.account_id, HISTORY_DAYS)
        .await?;

    let state = todays
        .as_ref()
        .map(|r| r.state)
        .unwrap_or(AttendanceState::NotCheckedIn);

    Ok(HttpResponse::Ok().json(AttendanceOverview {
        state: state.name(),
        today: todays.as_ref().map(AttendanceResponse::from),
        history: history.iter().map(AttendanceResponse::from).collect(),
    }))
}
