#![allow(dead_code)]

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use actix_web::{
    test::TestRequest,
    web::{Data, ServiceConfig},
};
use office_desk::{
    api::account::seed_admin,
    config::Config,
    db::{MemoryStore, OfficeStore},
    routes,
};
use serde_json::Value;
use tempfile::TempDir;

pub const PASSWORD: &str = "s3cret!";

/// Sends a request built from a `TestRequest` and returns the status and the
/// decoded JSON body (`Null` for empty or non-JSON bodies).
#[macro_export]
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body = actix_web::test::read_body(resp).await;
        let json: serde_json::Value =
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }};
}

/// Logs in with the shared test password and returns the bearer token.
#[macro_export]
macro_rules! log_in {
    ($app:expr, $email:expr) => {{
        let (status, body) = $crate::send!(
            $app,
            $crate::common::post(
                "/auth/login",
                serde_json::json!({ "email": $email, "password": $crate::common::PASSWORD }),
                None,
            )
        );
        assert_eq!(status, actix_web::http::StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }};
}

/// Registers a staff account over the public endpoint and returns its token.
#[macro_export]
macro_rules! sign_up {
    ($app:expr, $email:expr) => {{
        let (status, _) = $crate::send!(
            $app,
            $crate::common::post(
                "/api/accounts",
                serde_json::json!({
                    "email": $email,
                    "password": $crate::common::PASSWORD,
                    "full_name": "Test User",
                }),
                None,
            )
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED);
        $crate::log_in!($app, $email)
    }};
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub config: Config,
    uploads: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = Config {
            server_addr: "127.0.0.1:0".into(),
            database_url: None,
            jwt_secret: "integration-secret".into(),
            access_token_ttl: 3600,
            rate_login_per_min: 1000,
            rate_public_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            admin_email: None,
            admin_password: None,
            upload_dir: uploads.path().to_path_buf(),
            max_upload_bytes: 1024,
            log_dir: PathBuf::from("logs"),
            log_level: tracing::Level::DEBUG,
        };

        Self {
            store: Arc::new(MemoryStore::new()),
            config,
            uploads,
        }
    }

    pub fn configure(&self, cfg: &mut ServiceConfig) {
        let store: Arc<dyn OfficeStore> = self.store.clone();
        cfg.app_data(Data::from(store))
            .app_data(Data::new(self.config.clone()));
        routes::configure(cfg, &self.config);
    }

    /// Admins cannot be created anonymously, so tests put one straight into
    /// the store the way startup seeding does.
    pub async fn seed_admin(&self, email: &str) {
        assert!(seed_admin(self.store.as_ref(), email, PASSWORD).await.unwrap());
    }

    pub fn upload_root(&self) -> &std::path::Path {
        self.uploads.path()
    }
}

fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40_000))
}

fn with_auth(req: TestRequest, token: Option<&str>) -> TestRequest {
    let req = req.peer_addr(peer());
    match token {
        Some(t) => req.insert_header(("Authorization", format!("Bearer {t}"))),
        None => req,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> TestRequest {
    with_auth(TestRequest::get().uri(uri), token)
}

pub fn delete(uri: &str, token: Option<&str>) -> TestRequest {
    with_auth(TestRequest::delete().uri(uri), token)
}

pub fn post(uri: &str, body: Value, token: Option<&str>) -> TestRequest {
    with_auth(TestRequest::post().uri(uri).set_json(body), token)
}

pub const BOUNDARY: &str = "office-desk-boundary";

/// Hand-built `multipart/form-data` body; `file` is `(filename, bytes)`.
pub fn multipart(folder: Option<&str>, file: Option<(&str, &[u8])>) -> TestRequest {
    let mut body = Vec::new();
    if let Some(folder) = folder {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"folder\"\r\n\r\n{folder}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    TestRequest::post()
        .uri("/api/upload")
        .peer_addr(peer())
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}
