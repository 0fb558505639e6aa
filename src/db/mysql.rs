use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

use super::{OfficeStore, StoreError, StoreResult};
use crate::model::{
    account::{Account, AccountCredentials, NewAccount},
    attendance::{AttendanceRecord, AttendanceState, NewAttendance},
    mail::{InboundMail, MailDirection, NewInboundMail, NewOutboundMail, OutboundMail},
    role::Role,
    summary::Summary,
};

const ACCOUNT_COLUMNS: &str = r#"
    id, email, password, name, role, position, department, phone, image, created_at, updated_at
"#;

const ATTENDANCE_COLUMNS: &str = r#"
    id, account_id, date, check_in, check_out, status, notes, created_at
"#;

#[derive(FromRow)]
struct AccountRow {
    id: u64,
    email: String,
    password: String,
    name: Option<String>,
    role: String,
    position: Option<String>,
    department: Option<String>,
    phone: Option<String>,
    image: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<AccountRow> for AccountCredentials {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> StoreResult<Self> {
        let role = Role::from_name(&row.role)
            .ok_or_else(|| StoreError::Corrupt(format!("account {} has role {:?}", row.id, row.role)))?;

        Ok(AccountCredentials {
            account: Account {
                id: row.id,
                email: row.email,
                name: row.name,
                role,
                position: row.position,
                department: row.department,
                phone: row.phone,
                image: row.image,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password,
        })
    }
}

#[derive(FromRow)]
struct InboundMailRow {
    id: u64,
    mail_number: String,
    sender: String,
    subject: String,
    received_at: NaiveDateTime,
    file_url: Option<String>,
    created_by: u64,
    created_at: NaiveDateTime,
}

impl From<InboundMailRow> for InboundMail {
    fn from(row: InboundMailRow) -> Self {
        InboundMail {
            id: row.id,
            mail_number: row.mail_number,
            sender: row.sender,
            subject: row.subject,
            received_at: row.received_at,
            file_url: row.file_url,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct OutboundMailRow {
    id: u64,
    mail_number: String,
    recipient: String,
    subject: String,
    sent_at: NaiveDateTime,
    file_url: Option<String>,
    created_by: u64,
    created_at: NaiveDateTime,
}

impl From<OutboundMailRow> for OutboundMail {
    fn from(row: OutboundMailRow) -> Self {
        OutboundMail {
            id: row.id,
            mail_number: row.mail_number,
            recipient: row.recipient,
            subject: row.subject,
            sent_at: row.sent_at,
            file_url: row.file_url,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    account_id: u64,
    date: NaiveDate,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    status: String,
    notes: Option<String>,
    created_at: NaiveDateTime,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> StoreResult<Self> {
        let state = match AttendanceState::from_times(row.check_in, row.check_out) {
            Some(AttendanceState::NotCheckedIn) | None => {
                return Err(StoreError::Corrupt(format!(
                    "attendance {} has check_in {:?} and check_out {:?}",
                    row.id, row.check_in, row.check_out
                )));
            }
            Some(state) => state,
        };

        Ok(AttendanceRecord {
            id: row.id,
            account_id: row.account_id,
            date: row.date,
            state,
            status: row.status,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct SummaryRow {
    employees: i64,
    incoming: i64,
    outgoing: i64,
    attendance_today: i64,
}

/// [`OfficeStore`] backed by the MySQL schema in `migrations/`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_account(&self, id: u64) -> StoreResult<Account> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(AccountCredentials::try_from(row)?.account)
    }
}

#[async_trait]
impl OfficeStore for MySqlStore {
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (email, password, name, role, position, department, phone, image)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.name)
        .bind(account.role.as_ref())
        .bind(&account.position)
        .bind(&account.department)
        .bind(&account.phone)
        .bind(&account.image)
        .execute(&self.pool)
        .await?;

        debug!(account_id = result.last_insert_id(), "Account row inserted");
        self.fetch_account(result.last_insert_id()).await
    }

    async fn find_credentials(&self, email: &str) -> StoreResult<Option<AccountCredentials>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(AccountCredentials::try_from)
            .transpose()
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, AccountRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| AccountCredentials::try_from(row).map(|c| c.account))
            .collect()
    }

    async fn delete_account(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_inbound_mail(&self, mail: NewInboundMail) -> StoreResult<InboundMail> {
        let result = sqlx::query(
            r#"
            INSERT INTO inbound_mail (mail_number, sender, subject, received_at, file_url, created_by)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&mail.mail_number)
        .bind(&mail.sender)
        .bind(&mail.subject)
        .bind(mail.received_at)
        .bind(&mail.file_url)
        .bind(mail.created_by)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, InboundMailRow>("SELECT * FROM inbound_mail WHERE id = ?")
            .bind(result.last_insert_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn insert_outbound_mail(&self, mail: NewOutboundMail) -> StoreResult<OutboundMail> {
        let result = sqlx::query(
            r#"
            INSERT INTO outbound_mail (mail_number, recipient, subject, sent_at, file_url, created_by)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&mail.mail_number)
        .bind(&mail.recipient)
        .bind(&mail.subject)
        .bind(mail.sent_at)
        .bind(&mail.file_url)
        .bind(mail.created_by)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, OutboundMailRow>("SELECT * FROM outbound_mail WHERE id = ?")
            .bind(result.last_insert_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn list_inbound_mail(&self) -> StoreResult<Vec<InboundMail>> {
        let rows = sqlx::query_as::<_, InboundMailRow>(
            "SELECT * FROM inbound_mail ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_outbound_mail(&self) -> StoreResult<Vec<OutboundMail>> {
        let rows = sqlx::query_as::<_, OutboundMailRow>(
            "SELECT * FROM outbound_mail ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_mail(&self, direction: MailDirection, id: u64) -> StoreResult<bool> {
        let sql = match direction {
            MailDirection::Inbound => "DELETE FROM inbound_mail WHERE id = ?",
            MailDirection::Outbound => "DELETE FROM outbound_mail WHERE id = ?",
        };
        let result = sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_attendance(&self, record: NewAttendance) -> StoreResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (account_id, date, check_in, status, notes)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.account_id)
        .bind(record.date)
        .bind(record.check_in)
        .bind(&record.status)
        .bind(&record.notes)
        .execute(&self.pool)
        .await?;

        self.find_attendance(result.last_insert_id())
            .await?
            .ok_or_else(|| StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn find_attendance(&self, id: u64) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE id = ?");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn find_attendance_for_day(
        &self,
        account_id: u64,
        day: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE account_id = ? AND date = ? LIMIT 1"
        );
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(account_id)
            .bind(day)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn attendance_history(
        &self,
        account_id: u64,
        limit: u32,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE account_id = ? ORDER BY date DESC LIMIT ?"
        );
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(account_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }

    async fn set_check_out(&self, id: u64, check_out: NaiveTime) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?
            WHERE id = ?
            AND check_in IS NOT NULL
            AND check_out IS NULL
            "#,
        )
        .bind(check_out)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn summary(&self, day: NaiveDate) -> StoreResult<Summary> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM accounts) AS employees,
                (SELECT COUNT(*) FROM inbound_mail) AS incoming,
                (SELECT COUNT(*) FROM outbound_mail) AS outgoing,
                (SELECT COUNT(*) FROM attendance WHERE date = ?) AS attendance_today
            "#,
        )
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        Ok(Summary {
            employees: row.employees,
            incoming: row.incoming,
            outgoing: row.outgoing,
            attendance_today: row.attendance_today,
        })
    }
}
