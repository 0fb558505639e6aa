use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    model::role::Role,
    models::Claims,
};

/// The verified caller. Inserted into request extensions by
/// [`auth_middleware`](crate::auth::middleware::auth_middleware) and taken as
/// an explicit handler argument wherever an identity is required.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthUser {
    pub account_id: u64,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            account_id: claims.account_id,
            email: claims.sub,
            role: claims.role,
        }
    }
}

/// Left in the request extensions when a presented bearer token failed
/// verification; the `AuthUser` extractor reports its reason.
#[derive(Debug, Clone, Copy)]
pub struct RejectedToken(pub &'static str);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        let result = match extensions.get::<AuthUser>() {
            Some(user) => Ok(user.clone()),
            None => {
                let reason = extensions
                    .get::<RejectedToken>()
                    .map_or("Unauthorized", |rejected| rejected.0);
                Err(ApiError::Unauthorized(reason.into()))
            }
        };
        ready(result)
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin only".into()))
        }
    }
}
