use crate::{
    api::{account, attendance, dashboard, mail, upload},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::{json_error_handler, query_error_handler},
};
use actix_files::Files;
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, guard, middleware::from_fn, web};
use serde_json::json;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are both non-zero");
    Governor::new(&cfg)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let public_limiter = Arc::new(build_limiter(config.rate_public_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Malformed bodies and query strings get the same JSON error shape as handlers.
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));

    cfg.service(web::resource("/health").route(web::get().to(health)));

    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Everything under the prefix carries an optional identity; handlers that
    // extract `AuthUser` reject anonymous callers.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            // POST /accounts is open registration, limited like other public routes
            .service(
                web::resource("/accounts")
                    .guard(guard::Post())
                    .wrap(public_limiter.clone())
                    .route(web::post().to(account::create_account)),
            )
            .service(
                web::resource("/accounts")
                    .route(web::get().to(account::list_accounts))
                    .route(web::delete().to(account::delete_account)),
            )
            .service(
                web::resource("/attendance")
                    .route(web::get().to(attendance::attendance_overview))
                    .route(web::post().to(attendance::record_attendance)),
            )
            .service(
                web::resource("/mail")
                    .route(web::get().to(mail::list_mail))
                    .route(web::post().to(mail::create_mail))
                    .route(web::delete().to(mail::delete_mail)),
            )
            .service(
                web::resource("/upload")
                    .wrap(public_limiter)
                    .route(web::post().to(upload::upload_file)),
            )
            .service(
                web::resource("/dashboard/summary").route(web::get().to(dashboard::summary)),
            ),
    );

    cfg.service(Files::new(upload::UPLOADS_MOUNT, config.upload_dir.clone()));
}
