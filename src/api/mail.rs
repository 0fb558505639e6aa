use actix_web::{HttpResponse, web};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    db::OfficeStore,
    error::{ApiError, ApiResult},
    model::mail::{MailDirection, MailRecord, NewInboundMail, NewOutboundMail, parse_mail_date},
};

/// Mail submission; `type` selects the register and which of the
/// sender/recipient and date fields apply.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum CreateMail {
    #[serde(rename = "masuk", alias = "incoming")]
    Inbound {
        #[schema(example = "001/SM/I/2024")]
        nomor_surat: String,
        #[schema(example = "Dinas Pendidikan")]
        pengirim: String,
        #[schema(example = "Undangan rapat koordinasi")]
        perihal: String,
        #[schema(example = "2024-01-01")]
        tanggal_terima: String,
        #[schema(example = "/uploads/surat-masuk/1704067200000_undangan.pdf")]
        file_url: Option<String>,
    },
    #[serde(rename = "keluar", alias = "outgoing")]
    Outbound {
        #[schema(example = "002/SK/I/2024")]
        nomor_surat: String,
        #[schema(example = "Kantor Kecamatan")]
        penerima: String,
        #[schema(example = "Laporan bulanan")]
        perihal: String,
        #[schema(example = "2024-01-02")]
        tanggal_kirim: String,
        file_url: Option<String>,
    },
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MailQuery {
    /// Mail id; required for deletion.
    pub id: Option<u64>,
    /// `masuk` or `keluar`.
    #[serde(rename = "type")]
    pub direction: Option<MailDirection>,
}

fn required(value: String, field: &str) -> ApiResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("Missing field: {field}")));
    }
    Ok(value)
}

fn required_date(raw: &str, field: &str) -> ApiResult<NaiveDateTime> {
    parse_mail_date(raw).ok_or_else(|| ApiError::Validation(format!("Invalid date in {field}: {raw:?}")))
}

fn optional_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

/// Record mail
#[utoipa::path(
    post,
    path = "/api/mail",
    request_body = CreateMail,
    responses(
        (status = 201, description = "Mail recorded, tagged with its `type`", body = InboundMail),
        (status = 400, description = "Missing field, unknown type or invalid date", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Mail"
)]
pub async fn create_mail(
    auth: AuthUser,
    store: web::Data<dyn OfficeStore>,
    payload: web::Json<CreateMail>,
) -> ApiResult<HttpResponse> {
    let record = match payload.into_inner() {
        CreateMail::Inbound {
            nomor_surat,
            pengirim,
            perihal,
            tanggal_terima,
            file_url,
        } => {
            let mail = NewInboundMail {
                mail_number: required(nomor_surat, "nomor_surat")?,
                sender: required(pengirim, "pengirim")?,
                subject: required(perihal, "perihal")?,
                received_at: required_date(&tanggal_terima, "tanggal_terima")?,
                file_url: optional_url(file_url),
                created_by: auth.account_id,
            };
            MailRecord::Inbound(store.insert_inbound_mail(mail).await?)
        }
        CreateMail::Outbound {
            nomor_surat,
            penerima,
            perihal,
            tanggal_kirim,
            file_url,
        } => {
            let mail = NewOutboundMail {
                mail_number: required(nomor_surat, "nomor_surat")?,
                recipient: required(penerima, "penerima")?,
                subject: required(perihal, "perihal")?,
                sent_at: required_date(&tanggal_kirim, "tanggal_kirim")?,
                file_url: optional_url(file_url),
                created_by: auth.account_id,
            };
            MailRecord::Outbound(store.insert_outbound_mail(mail).await?)
        }
    };

    info!(
        mail_id = record.id(),
        direction = %record.direction(),
        created_by = auth.account_id,
        "Mail recorded"
    );
    Ok(HttpResponse::Created().json(record))
}

/// List mail
#[utoipa::path(
    get,
    path = "/api/mail",
    params(MailQuery),
    responses(
        (status = 200, description = "Records of the requested register, newest first", body = [OutboundMail]),
        (status = 400, description = "Missing type", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Mail"
)]
pub async fn list_mail(
    _auth: AuthUser,
    store: web::Data<dyn OfficeStore>,
    query: web::Query<MailQuery>,
) -> ApiResult<HttpResponse> {
    let direction = query
        .direction
        .ok_or_else(|| ApiError::Validation("Missing type".into()))?;

    let records: Vec<MailRecord> = match direction {
        MailDirection::Inbound => store
            .list_inbound_mail()
            .await?
            .into_iter()
            .map(MailRecord::Inbound)
            .collect(),
        MailDirection::Outbound => store
            .list_outbound_mail()
            .await?
            .into_iter()
            .map(MailRecord::Outbound)
            .collect(),
    };

    Ok(HttpResponse::Ok().json(records))
}

/// Delete mail
#[utoipa::path(
    delete,
    path = "/api/mail",
    params(MailQuery),
    responses(
        (status = 200, description = "Mail deleted", body = Object, example = json!({
            "success": true
        })),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Mail not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Mail"
)]
pub async fn delete_mail(
    auth: AuthUser,
    store: web::Data<dyn OfficeStore>,
    query: web::Query<MailQuery>,
) -> ApiResult<HttpResponse> {
    let (Some(id), Some(direction)) = (query.id, query.direction) else {
        return Err(ApiError::Validation("Missing fields".into()));
    };

    if !store.delete_mail(direction, id).await? {
        return Err(ApiError::NotFound("Mail not found".into()));
    }

    info!(mail_id = id, %direction, deleted_by = auth.account_id, "Mail deleted");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
