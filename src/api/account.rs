use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    auth::{auth::AuthUser, password::hash_password},
    db::{OfficeStore, StoreError},
    error::{ApiError, ApiResult},
    model::{
        account::{NewAccount, normalize_email},
        role::Role,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccount {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "siti@office.local", format = "email")]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    #[schema(example = "s3cret!")]
    pub password: String,
    #[schema(example = "Siti Rahma")]
    pub full_name: Option<String>,
    /// Defaults to `staff`; `admin` is only accepted from an admin caller.
    pub role: Option<Role>,
    #[schema(example = "Secretary")]
    pub position: Option<String>,
    #[schema(example = "General Affairs")]
    pub department: Option<String>,
    #[schema(example = "+62811000111")]
    pub phone: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountIdQuery {
    /// Account id.
    pub id: Option<u64>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn hash(password: &str) -> ApiResult<String> {
    hash_password(password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::Internal("Failed to hash password".into())
    })
}

/// Creates the admin account named in the configuration unless an account
/// with that email already exists. Returns whether a row was inserted.
pub async fn seed_admin(store: &dyn OfficeStore, email: &str, password: &str) -> ApiResult<bool> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Admin email and password are required".into()));
    }

    if let Some(existing) = store.find_credentials(&email).await? {
        if existing.account.role != Role::Admin {
            warn!(account_id = existing.account.id, "Configured admin email belongs to a staff account");
        }
        return Ok(false);
    }

    let account = store
        .insert_account(NewAccount {
            email,
            password_hash: hash(password)?,
            name: Some("Administrator".into()),
            role: Role::Admin,
            position: None,
            department: None,
            phone: None,
            image: None,
        })
        .await?;

    info!(account_id = account.id, "Admin account seeded");
    Ok(true)
}

/// Create account
#[utoipa::path(
    post,
    path = "/api/accounts",
    request_body = CreateAccount,
    responses(
        (status = 201, description = "Account created; the credential is never returned", body = Account),
        (status = 400, description = "Invalid email or empty password", body = ErrorBody),
        (status = 403, description = "Only an admin can create admin accounts", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    caller: Option<AuthUser>,
    store: web::Data<dyn OfficeStore>,
    payload: web::Json<CreateAccount>,
) -> ApiResult<HttpResponse> {
    payload.validate()?;
    let payload = payload.into_inner();

    let role = payload.role.unwrap_or_default();
    if role == Role::Admin && !caller.as_ref().is_some_and(|c| c.role == Role::Admin) {
        warn!(
            caller = ?caller.as_ref().map(|c| c.account_id),
            "Refused to create admin account"
        );
        return Err(ApiError::Forbidden(
            "Only an admin can create admin accounts".into(),
        ));
    }

    let account = store
        .insert_account(NewAccount {
            email: normalize_email(&payload.email),
            password_hash: hash(&payload.password)?,
            name: blank_to_none(payload.full_name),
            role,
            position: blank_to_none(payload.position),
            department: blank_to_none(payload.department),
            phone: blank_to_none(payload.phone),
            image: blank_to_none(payload.image),
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation { .. } => ApiError::Duplicate("Email already exists".into()),
            other => other.into(),
        })?;

    info!(account_id = account.id, role = %account.role, "Account created");
    Ok(HttpResponse::Created().json(json!({ "user": account })))
}

/// List accounts
#[utoipa::path(
    get,
    path = "/api/accounts",
    responses(
        (status = 200, description = "All accounts, newest first", body = [Account]),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Accounts"
)]
pub async fn list_accounts(
    _auth: AuthUser,
    store: web::Data<dyn OfficeStore>,
) -> ApiResult<HttpResponse> {
    let accounts = store.list_accounts().await?;
    Ok(HttpResponse::Ok().json(accounts))
}

/// Delete account
#[utoipa::path(
    delete,
    path = "/api/accounts",
    params(AccountIdQuery),
    responses(
        (status = 200, description = "Account deleted", body = Object, example = json!({
            "success": true
        })),
        (status = 400, description = "Missing ID", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody),
        (status = 409, description = "Account has dependent records", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Accounts"
)]
pub async fn delete_account(
    auth: AuthUser,
    store: web::Data<dyn OfficeStore>,
    query: web::Query<AccountIdQuery>,
) -> ApiResult<HttpResponse> {
    auth.require_admin()?;

    let id = query
        .id
        .ok_or_else(|| ApiError::Validation("Missing ID".into()))?;

    match store.delete_account(id).await {
        Ok(true) => {
            info!(account_id = id, deleted_by = auth.account_id, "Account deleted");
            Ok(HttpResponse::Ok().json(json!({ "success": true })))
        }
        Ok(false) => Err(ApiError::NotFound("Account not found".into())),
        Err(StoreError::ForeignKeyViolation) => {
            warn!(account_id = id, "Refused to delete account with dependent records");
            Err(ApiError::Conflict("Account has dependent records".into()))
        }
        Err(e) => Err(e.into()),
    }
}
