//! Storage abstraction.
//!
//! Handlers talk to an [`OfficeStore`]; engine-specific constraint signals are
//! turned into [`StoreError`] variants here and nowhere else.

mod memory;
mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;

use crate::model::{
    account::{Account, AccountCredentials, NewAccount},
    attendance::{AttendanceRecord, NewAttendance},
    mail::{InboundMail, MailDirection, NewInboundMail, NewOutboundMail, OutboundMail},
    summary::Summary,
};

/// Unique index guarding one attendance row per account per day.
pub const ATTENDANCE_DAY_CONSTRAINT: &str = "user_date_idx";
/// Unique index on account email.
pub const ACCOUNT_EMAIL_CONSTRAINT: &str = "uq_accounts_email";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value violates unique constraint {}", .constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },

    #[error("foreign key constraint violated")]
    ForeignKeyViolation,

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation {
                    constraint: db_err.constraint().map(str::to_owned),
                };
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation;
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait OfficeStore: Send + Sync {
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account>;

    async fn find_credentials(&self, email: &str) -> StoreResult<Option<AccountCredentials>>;

    /// Newest first.
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    /// `Ok(false)` when no such account exists. Accounts still referenced by
    /// mail or attendance rows fail with [`StoreError::ForeignKeyViolation`].
    async fn delete_account(&self, id: u64) -> StoreResult<bool>;

    async fn insert_inbound_mail(&self, mail: NewInboundMail) -> StoreResult<InboundMail>;

    async fn insert_outbound_mail(&self, mail: NewOutboundMail) -> StoreResult<OutboundMail>;

    async fn list_inbound_mail(&self) -> StoreResult<Vec<InboundMail>>;

    async fn list_outbound_mail(&self) -> StoreResult<Vec<OutboundMail>>;

    async fn delete_mail(&self, direction: MailDirection, id: u64) -> StoreResult<bool>;

    /// Fails with [`StoreError::UniqueViolation`] when the account already
    /// has a row for the day.
    async fn insert_attendance(&self, record: NewAttendance) -> StoreResult<AttendanceRecord>;

    async fn find_attendance(&self, id: u64) -> StoreResult<Option<AttendanceRecord>>;

    async fn find_attendance_for_day(
        &self,
        account_id: u64,
        day: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Most recent days first.
    async fn attendance_history(
        &self,
        account_id: u64,
        limit: u32,
    ) -> StoreResult<Vec<AttendanceRecord>>;

    /// Sets the check-out time only if none is recorded yet; `Ok(false)` means
    /// the row is missing or was already checked out.
    async fn set_check_out(&self, id: u64, check_out: NaiveTime) -> StoreResult<bool>;

    async fn summary(&self, day: NaiveDate) -> StoreResult<Summary>;
}

/// Connects to MySQL and applies the embedded migrations.
pub async fn init_db(database_url: &str) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}
