use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use super::{
    ACCOUNT_EMAIL_CONSTRAINT, ATTENDANCE_DAY_CONSTRAINT, OfficeStore, StoreError, StoreResult,
};
use crate::model::{
    account::{Account, AccountCredentials, NewAccount},
    attendance::{AttendanceRecord, AttendanceState, NewAttendance},
    mail::{InboundMail, MailDirection, NewInboundMail, NewOutboundMail, OutboundMail},
    summary::Summary,
};

#[derive(Default)]
struct Tables {
    last_id: u64,
    accounts: Vec<AccountCredentials>,
    inbound: Vec<InboundMail>,
    outbound: Vec<OutboundMail>,
    attendance: Vec<AttendanceRecord>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn account_exists(&self, id: u64) -> bool {
        self.accounts.iter().any(|c| c.account.id == id)
    }

    fn is_referenced(&self, account_id: u64) -> bool {
        self.inbound.iter().any(|m| m.created_by == account_id)
            || self.outbound.iter().any(|m| m.created_by == account_id)
            || self.attendance.iter().any(|r| r.account_id == account_id)
    }
}

/// Process-local [`OfficeStore`] with the same unique and foreign-key rules as
/// the MySQL schema. Used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Newest first; ids break ties between rows created in the same instant.
fn newest_first<T: Clone>(rows: &[T], key: impl Fn(&T) -> (NaiveDateTime, u64)) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl OfficeStore for MemoryStore {
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut tables = self.tables();

        if tables
            .accounts
            .iter()
            .any(|c| c.account.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(StoreError::UniqueViolation {
                constraint: Some(ACCOUNT_EMAIL_CONSTRAINT.to_string()),
            });
        }

        let stamp = now();
        let created = Account {
            id: tables.next_id(),
            email: account.email,
            name: account.name,
            role: account.role,
            position: account.position,
            department: account.department,
            phone: account.phone,
            image: account.image,
            created_at: stamp,
            updated_at: stamp,
        };
        tables.accounts.push(AccountCredentials {
            account: created.clone(),
            password_hash: account.password_hash,
        });
        Ok(created)
    }

    async fn find_credentials(&self, email: &str) -> StoreResult<Option<AccountCredentials>> {
        Ok(self
            .tables()
            .accounts
            .iter()
            .find(|c| c.account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let tables = self.tables();
        let accounts: Vec<Account> = tables.accounts.iter().map(|c| c.account.clone()).collect();
        Ok(newest_first(&accounts, |a| (a.created_at, a.id)))
    }

    async fn delete_account(&self, id: u64) -> StoreResult<bool> {
        let mut tables = self.tables();
        if !tables.account_exists(id) {
            return Ok(false);
        }
        if tables.is_referenced(id) {
            return Err(StoreError::ForeignKeyViolation);
        }
        tables.accounts.retain(|c| c.account.id != id);
        Ok(true)
    }

    async fn insert_inbound_mail(&self, mail: NewInboundMail) -> StoreResult<InboundMail> {
        let mut tables = self.tables();
        if !tables.account_exists(mail.created_by) {
            return Err(StoreError::ForeignKeyViolation);
        }

        let created = InboundMail {
            id: tables.next_id(),
            mail_number: mail.mail_number,
            sender: mail.sender,
            subject: mail.subject,
            received_at: mail.received_at,
            file_url: mail.file_url,
            created_by: mail.created_by,
            created_at: now(),
        };
        tables.inbound.push(created.clone());
        Ok(created)
    }

    async fn insert_outbound_mail(&self, mail: NewOutboundMail) -> StoreResult<OutboundMail> {
        let mut tables = self.tables();
        if !tables.account_exists(mail.created_by) {
            return Err(StoreError::ForeignKeyViolation);
        }

        let created = OutboundMail {
            id: tables.next_id(),
            mail_number: mail.mail_number,
            recipient: mail.recipient,
            subject: mail.subject,
            sent_at: mail.sent_at,
            file_url: mail.file_url,
            created_by: mail.created_by,
            created_at: now(),
        };
        tables.outbound.push(created.clone());
        Ok(created)
    }

    async fn list_inbound_mail(&self) -> StoreResult<Vec<InboundMail>> {
        Ok(newest_first(&self.tables().inbound, |m| (m.created_at, m.id)))
    }

    async fn list_outbound_mail(&self) -> StoreResult<Vec<OutboundMail>> {
        Ok(newest_first(&self.tables().outbound, |m| (m.created_at, m.id)))
    }

    async fn delete_mail(&self, direction: MailDirection, id: u64) -> StoreResult<bool> {
        let mut tables = self.tables();
        let removed = match direction {
            MailDirection::Inbound => {
                let before = tables.inbound.len();
                tables.inbound.retain(|m| m.id != id);
                before != tables.inbound.len()
            }
            MailDirection::Outbound => {
                let before = tables.outbound.len();
                tables.outbound.retain(|m| m.id != id);
                before != tables.outbound.len()
            }
        };
        Ok(removed)
    }

    async fn insert_attendance(&self, record: NewAttendance) -> StoreResult<AttendanceRecord> {
        let mut tables = self.tables();
        if !tables.account_exists(record.account_id) {
            return Err(StoreError::ForeignKeyViolation);
        }
        if tables
            .attendance
            .iter()
            .any(|r| r.account_id == record.account_id && r.date == record.date)
        {
            return Err(StoreError::UniqueViolation {
                constraint: Some(ATTENDANCE_DAY_CONSTRAINT.to_string()),
            });
        }

        let created = AttendanceRecord {
            id: tables.next_id(),
            account_id: record.account_id,
            date: record.date,
            state: AttendanceState::CheckedIn {
                check_in: record.check_in,
            },
            status: record.status,
            notes: record.notes,
            created_at: now(),
        };
        tables.attendance.push(created.clone());
        Ok(created)
    }

    async fn find_attendance(&self, id: u64) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self
            .tables()
            .attendance
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_attendance_for_day(
        &self,
        account_id: u64,
        day: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self
            .tables()
            .attendance
            .iter()
            .find(|r| r.account_id == account_id && r.date == day)
            .cloned())
    }

    async fn attendance_history(
        &self,
        account_id: u64,
        limit: u32,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let mut history: Vec<AttendanceRecord> = self
            .tables()
            .attendance
            .iter()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history.truncate(limit as usize);
        Ok(history)
    }

    async fn set_check_out(&self, id: u64, check_out: NaiveTime) -> StoreResult<bool> {
        let mut tables = self.tables();
        let Some(record) = tables.attendance.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };

        match record.state {
            AttendanceState::CheckedIn { check_in } => {
                record.state = AttendanceState::CheckedOut {
                    check_in,
                    check_out,
                };
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn summary(&self, day: NaiveDate) -> StoreResult<Summary> {
        let tables = self.tables();
        Ok(Summary {
            employees: tables.accounts.len() as i64,
            incoming: tables.inbound.len() as i64,
            outgoing: tables.outbound.len() as i64,
            attendance_today: tables.attendance.iter().filter(|r| r.date == day).count() as i64,
        })
    }
}
