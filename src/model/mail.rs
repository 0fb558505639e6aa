use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Which of the two mail registers a record lives in. The wire names are the
/// office's own (`masuk` / `keluar`); the English ones are accepted as aliases.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum MailDirection {
    #[serde(rename = "masuk", alias = "incoming")]
    #[strum(to_string = "masuk", serialize = "incoming")]
    Inbound,
    #[serde(rename = "keluar", alias = "outgoing")]
    #[strum(to_string = "keluar", serialize = "outgoing")]
    Outbound,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InboundMail {
    pub id: u64,
    #[serde(rename = "nomor_surat")]
    pub mail_number: String,
    #[serde(rename = "pengirim")]
    pub sender: String,
    #[serde(rename = "perihal")]
    pub subject: String,
    #[serde(rename = "tanggal_terima")]
    #[schema(value_type = String, format = "date-time")]
    pub received_at: NaiveDateTime,
    pub file_url: Option<String>,
    #[serde(rename = "created_by_id")]
    pub created_by: u64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OutboundMail {
    pub id: u64,
    #[serde(rename = "nomor_surat")]
    pub mail_number: String,
    #[serde(rename = "penerima")]
    pub recipient: String,
    #[serde(rename = "perihal")]
    pub subject: String,
    #[serde(rename = "tanggal_kirim")]
    #[schema(value_type = String, format = "date-time")]
    pub sent_at: NaiveDateTime,
    pub file_url: Option<String>,
    #[serde(rename = "created_by_id")]
    pub created_by: u64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}

/// Either register's row, tagged with `type` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MailRecord {
    #[serde(rename = "masuk")]
    Inbound(InboundMail),
    #[serde(rename = "keluar")]
    Outbound(OutboundMail),
}

impl MailRecord {
    pub fn id(&self) -> u64 {
        match self {
            MailRecord::Inbound(m) => m.id,
            MailRecord::Outbound(m) => m.id,
        }
    }

    pub fn direction(&self) -> MailDirection {
        match self {
            MailRecord::Inbound(_) => MailDirection::Inbound,
            MailRecord::Outbound(_) => MailDirection::Outbound,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewInboundMail {
    pub mail_number: String,
    pub sender: String,
    pub subject: String,
    pub received_at: NaiveDateTime,
    pub file_url: Option<String>,
    pub created_by: u64,
}

#[derive(Debug, Clone)]
pub struct NewOutboundMail {
    pub mail_number: String,
    pub recipient: String,
    pub subject: String,
    pub sent_at: NaiveDateTime,
    pub file_url: Option<String>,
    pub created_by: u64,
}

/// Accepts what the mail forms send: a plain date, a `datetime-local`
/// value, or a full RFC 3339 timestamp (converted to server-local time).
pub fn parse_mail_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
