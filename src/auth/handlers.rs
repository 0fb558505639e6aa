use actix_web::{HttpResponse, web};
use tracing::{debug, info, instrument};

use crate::{
    auth::{auth::AuthUser, jwt::generate_access_token, password::verify_password},
    config::Config,
    db::OfficeStore,
    error::{ApiError, ApiResult},
    model::account::normalize_email,
    models::{LoginReqDto, LoginResponse},
};

/// Login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn OfficeStore>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    info!("Login request received");

    let email = normalize_email(&user.email);
    if email.is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    debug!("Fetching account");
    let Some(credentials) = store.find_credentials(&email).await? else {
        info!("Invalid credentials: account not found");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    if let Err(e) = verify_password(&user.password, &credentials.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let account = credentials.account;
    let access_token = generate_access_token(
        account.id,
        account.email,
        account.role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to issue token: {e}")))?;

    info!(account_id = account.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl,
    }))
}

/// Current identity
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "The verified caller", body = AuthUser),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(auth)
}
