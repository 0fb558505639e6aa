use actix_web::{
    Error, HttpMessage,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, HeaderValue},
    middleware::Next,
    web::Data,
};
use tracing::debug;

use crate::{
    auth::{
        auth::{AuthUser, RejectedToken},
        jwt::verify_token,
    },
    config::Config,
    error::ApiError,
};

/// Verifies a bearer token when one is presented. A verified token puts an
/// [`AuthUser`] into the request extensions; a bad one leaves a
/// [`RejectedToken`] instead. The request always reaches the handler, so
/// public routes under the same scope work with a stale header, and handlers
/// that need an identity reject the caller by extracting `AuthUser`.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return next.call(req).await;
    };

    let Some(config) = req.app_data::<Data<Config>>() else {
        return Err(ApiError::Internal("App config missing".into()).into());
    };

    match verify_bearer(header, &config.jwt_secret) {
        Ok(user) => {
            req.extensions_mut().insert(user);
        }
        Err(reason) => {
            debug!(reason, "Bearer token not accepted");
            req.extensions_mut().insert(RejectedToken(reason));
        }
    }

    next.call(req).await
}

fn verify_bearer(header: &HeaderValue, secret: &str) -> Result<AuthUser, &'static str> {
    let value = header
        .to_str()
        .map_err(|_| "Invalid Authorization header encoding")?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must start with Bearer")?;

    verify_token(token, secret).map(AuthUser::from).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        "Invalid or expired token"
    })
}
