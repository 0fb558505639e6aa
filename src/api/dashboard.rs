use actix_web::{HttpResponse, web};
use chrono::Local;
use tracing::debug;

use crate::{
    auth::auth::AuthUser,
    db::OfficeStore,
    error::ApiResult,
    model::attendance::day_bucket,
};

/// Dashboard summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses(
        (status = 200, description = "Headline counts; attendance is for the current day", body = Summary),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn summary(
    _auth: AuthUser,
    store: web::Data<dyn OfficeStore>,
) -> ApiResult<HttpResponse> {
    let today = day_bucket(Local::now().naive_local());
    let summary = store.summary(today).await?;
    debug!(%today, ?summary, "Dashboard summary");
    Ok(HttpResponse::Ok().json(summary))
}
