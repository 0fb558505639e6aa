#[macro_use]
mod common;

use actix_web::{App, http::StatusCode, test};
use serde_json::json;

use common::TestContext;
use office_desk::db::OfficeStore;

#[actix_web::test]
async fn health_is_public() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let (status, body) = send!(app, common::get("/health", None));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn account_registration_and_login() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let (status, body) = send!(
        app,
        common::post(
            "/api/accounts",
            json!({
                "email": "Siti@Office.Local",
                "password": common::PASSWORD,
                "full_name": "Siti Rahma",
                "position": "Secretary"
            }),
            None,
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "siti@office.local");
    assert_eq!(body["user"]["role"], "staff");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    // Same address in a different case is still a duplicate.
    let (status, body) = send!(
        app,
        common::post(
            "/api/accounts",
            json!({ "email": "siti@office.local", "password": "other" }),
            None,
        )
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");
    assert_eq!(body["code"], "DUPLICATE");

    let (status, body) = send!(
        app,
        common::post(
            "/api/accounts",
            json!({ "email": "not-an-email", "password": "x" }),
            None,
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send!(
        app,
        common::post(
            "/auth/login",
            json!({ "email": "siti@office.local", "password": "wrong" }),
            None,
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send!(
        app,
        common::post(
            "/auth/login",
            json!({ "email": " SITI@office.local ", "password": common::PASSWORD }),
            None,
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = send!(app, common::get("/api/me", Some(&token)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "siti@office.local");
    assert_eq!(body["role"], "staff");
}

#[actix_web::test]
async fn protected_routes_need_a_valid_token() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let (status, body) = send!(app, common::get("/api/accounts", None));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send!(app, common::get("/api/accounts", Some("garbage")));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(app, common::get("/api/dashboard/summary", None));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(
        app,
        common::post("/api/attendance", json!({ "action": "check_in" }), None)
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn account_deletion_is_admin_only() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    ctx.seed_admin("admin@office.local").await;
    let admin = log_in!(app, "admin@office.local");
    let staff = sign_up!(app, "staff@office.local");

    let (status, accounts) = send!(app, common::get("/api/accounts", Some(&admin)));
    assert_eq!(status, StatusCode::OK);
    let accounts = accounts.as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    // Newest first.
    assert_eq!(accounts[0]["email"], "staff@office.local");
    let staff_id = accounts[0]["id"].as_u64().unwrap();
    let admin_id = accounts[1]["id"].as_u64().unwrap();

    let (status, _) = send!(
        app,
        common::delete(&format!("/api/accounts?id={admin_id}"), Some(&staff))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(app, common::delete("/api/accounts", Some(&admin)));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing ID");

    let (status, _) = send!(app, common::delete("/api/accounts?id=9999", Some(&admin)));
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Staff has an attendance record now, so the account cannot go.
    let (status, _) = send!(
        app,
        common::post("/api/attendance", json!({ "action": "check_in" }), Some(&staff))
    );
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send!(
        app,
        common::delete(&format!("/api/accounts?id={staff_id}"), Some(&admin))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Account has dependent records");

    let (status, body) = send!(
        app,
        common::post(
            "/api/accounts",
            json!({ "email": "temp@office.local", "password": "x" }),
            None,
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    let temp_id = body["user"]["id"].as_u64().unwrap();

    let (status, body) = send!(
        app,
        common::delete(&format!("/api/accounts?id={temp_id}"), Some(&admin))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(ctx.store.list_accounts().await.unwrap().len(), 2);
}

#[actix_web::test]
async fn attendance_day_over_http() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let token = sign_up!(app, "u1@office.local");
    let other = sign_up!(app, "u2@office.local");

    let (status, body) = send!(app, common::get("/api/attendance", Some(&token)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "not_checked_in");
    assert!(body["today"].is_null());

    let (status, record) = send!(
        app,
        common::post(
            "/api/attendance",
            json!({ "action": "check_in", "notes": "on site" }),
            Some(&token),
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["state"], "checked_in");
    assert_eq!(record["status"], "Hadir");
    assert_eq!(record["notes"], "on site");
    assert!(record["check_out"].is_null());
    let id = record["id"].as_u64().unwrap();

    let (status, body) = send!(
        app,
        common::post("/api/attendance", json!({ "action": "check_in" }), Some(&token))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already checked in today");

    let (status, _) = send!(
        app,
        common::post(
            "/api/attendance",
            json!({ "action": "check_out", "id": id }),
            Some(&other),
        )
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, closed) = send!(
        app,
        common::post(
            "/api/attendance",
            json!({ "action": "check_out", "id": id }),
            Some(&token),
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["state"], "checked_out");
    assert_eq!(closed["check_in"], record["check_in"]);
    assert!(closed["check_out"].is_string());

    let (status, body) = send!(
        app,
        common::post(
            "/api/attendance",
            json!({ "action": "check_out", "id": id }),
            Some(&token),
        )
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already checked out");

    let (status, body) = send!(
        app,
        common::post("/api/attendance", json!({ "action": "nap" }), Some(&token))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send!(app, common::get("/api/attendance", Some(&token)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "checked_out");
    assert_eq!(body["today"]["id"], id);
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn mail_registers_over_http() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let token = sign_up!(app, "clerk@office.local");

    let (status, inbound) = send!(
        app,
        common::post(
            "/api/mail",
            json!({
                "type": "masuk",
                "nomor_surat": "001/SM/I/2024",
                "pengirim": "Dinas Pendidikan",
                "perihal": "Undangan rapat",
                "tanggal_terima": "2024-01-01"
            }),
            Some(&token),
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(inbound["type"], "masuk");
    assert_eq!(inbound["nomor_surat"], "001/SM/I/2024");
    assert_eq!(inbound["tanggal_terima"], "2024-01-01T00:00:00");
    assert!(inbound["file_url"].is_null());

    let (status, outbound) = send!(
        app,
        common::post(
            "/api/mail",
            json!({
                "type": "outgoing",
                "nomor_surat": "002/SK/I/2024",
                "penerima": "Kantor Kecamatan",
                "perihal": "Laporan bulanan",
                "tanggal_kirim": "2024-01-02T10:30",
                "file_url": "/uploads/surat-keluar/1_laporan.pdf"
            }),
            Some(&token),
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outbound["type"], "keluar");
    assert_eq!(outbound["file_url"], "/uploads/surat-keluar/1_laporan.pdf");

    let (status, body) = send!(
        app,
        common::post(
            "/api/mail",
            json!({
                "type": "masuk",
                "nomor_surat": " ",
                "pengirim": "X",
                "perihal": "Y",
                "tanggal_terima": "2024-01-01"
            }),
            Some(&token),
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing field: nomor_surat");

    let (status, _) = send!(
        app,
        common::post(
            "/api/mail",
            json!({
                "type": "masuk",
                "nomor_surat": "003",
                "pengirim": "X",
                "perihal": "Y",
                "tanggal_terima": "yesterday"
            }),
            Some(&token),
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = send!(app, common::get("/api/mail?type=masuk", Some(&token)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["pengirim"], "Dinas Pendidikan");

    let (status, body) = send!(app, common::get("/api/mail", Some(&token)));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing type");

    let (status, _) = send!(app, common::get("/api/mail?type=spam", Some(&token)));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let inbound_id = inbound["id"].as_u64().unwrap();
    let (status, body) = send!(
        app,
        common::delete(&format!("/api/mail?id={inbound_id}"), Some(&token))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing fields");

    let (status, _) = send!(
        app,
        common::delete("/api/mail?id=9999&type=masuk", Some(&token))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        common::delete(&format!("/api/mail?id={inbound_id}&type=masuk"), Some(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, list) = send!(app, common::get("/api/mail?type=masuk", Some(&token)));
    assert!(list.as_array().unwrap().is_empty());
    let (_, list) = send!(app, common::get("/api/mail?type=keluar", Some(&token)));
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn dashboard_counts_everything() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let token = sign_up!(app, "a@office.local");
    sign_up!(app, "b@office.local");
    ctx.seed_admin("c@office.local").await;

    let (status, summary) = send!(app, common::get("/api/dashboard/summary", Some(&token)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        summary,
        json!({ "employees": 3, "incoming": 0, "outgoing": 0, "attendance_today": 0 })
    );

    send!(
        app,
        common::post(
            "/api/mail",
            json!({
                "type": "keluar",
                "nomor_surat": "010",
                "penerima": "Bupati",
                "perihal": "Laporan",
                "tanggal_kirim": "2024-03-01"
            }),
            Some(&token),
        )
    );
    send!(
        app,
        common::post("/api/attendance", json!({ "action": "check_in" }), Some(&token))
    );

    let (_, summary) = send!(app, common::get("/api/dashboard/summary", Some(&token)));
    assert_eq!(summary["employees"], 3);
    assert_eq!(summary["incoming"], 0);
    assert_eq!(summary["outgoing"], 1);
    assert_eq!(summary["attendance_today"], 1);
}

#[actix_web::test]
async fn uploads_are_stored_and_served() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let (status, body) = send!(
        app,
        common::multipart(Some("surat-masuk"), Some(("scan 1.pdf", b"%PDF-1.4")))
    );
    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/surat-masuk/"));
    assert!(url.ends_with("_scan_1.pdf"));

    let file_name = url.rsplit('/').next().unwrap();
    let stored = std::fs::read(ctx.upload_root().join("surat-masuk").join(file_name)).unwrap();
    assert_eq!(stored, b"%PDF-1.4");

    let resp = test::call_service(&app, common::get(&url, None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await.as_ref(), b"%PDF-1.4");
}

#[actix_web::test]
async fn upload_rejections() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let (status, body) = send!(app, common::multipart(Some("misc"), None));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file received");

    // The test config caps uploads at 1 KiB.
    let big = vec![b'x'; 2048];
    let (status, body) = send!(app, common::multipart(None, Some(("big.bin", &big))));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn only_admins_create_admins() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    ctx.seed_admin("admin@office.local").await;
    let admin = log_in!(app, "admin@office.local");
    let staff = sign_up!(app, "staff@office.local");

    let escalation = json!({
        "email": "evil@office.local",
        "password": "x",
        "role": "admin"
    });

    let (status, body) = send!(app, common::post("/api/accounts", escalation.clone(), None));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only an admin can create admin accounts");

    let (status, _) = send!(
        app,
        common::post("/api/accounts", escalation.clone(), Some(&staff))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        ctx.store
            .find_credentials("evil@office.local")
            .await
            .unwrap()
            .is_none()
    );

    let (status, body) = send!(
        app,
        common::post(
            "/api/accounts",
            json!({ "email": "deputy@office.local", "password": "x", "role": "admin" }),
            Some(&admin),
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");

    // An explicit staff role stays open to anyone.
    let (status, body) = send!(
        app,
        common::post(
            "/api/accounts",
            json!({ "email": "clerk@office.local", "password": "x", "role": "staff" }),
            None,
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "staff");
}

#[actix_web::test]
async fn stale_token_only_matters_where_identity_is_needed() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let (status, _) = send!(
        app,
        common::post(
            "/api/accounts",
            json!({ "email": "new@office.local", "password": "x" }),
            Some("expired.or.forged"),
        )
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send!(
        app,
        common::multipart(None, Some(("note.txt", b"hi")))
            .insert_header(("Authorization", "Bearer expired.or.forged"))
    );
    assert_eq!(status, StatusCode::OK);
    assert!(body["url"].as_str().unwrap().ends_with("_note.txt"));

    let (status, body) = send!(app, common::get("/api/accounts", Some("expired.or.forged")));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}
