use crate::api::account::CreateAccount;
use crate::api::attendance::{AttendanceAction, AttendanceOverview, AttendanceResponse};
use crate::api::mail::CreateMail;
use crate::api::upload::UploadResponse;
use crate::auth::auth::AuthUser;
use crate::error::ErrorBody;
use crate::model::account::Account;
use crate::model::mail::{InboundMail, MailDirection, OutboundMail};
use crate::model::role::Role;
use crate::model::summary::Summary;
use crate::models::{LoginReqDto, LoginResponse};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Office Desk API",
        version = "1.0.0",
        description = r#"
## Office Administration API

Back office for a small government or company office.

### 🔹 Key Features
- **Accounts**
  - Register staff accounts, list them, remove them (admin)
- **Mail Registers**
  - Record, list and delete incoming (`masuk`) and outgoing (`keluar`) mail
- **Attendance**
  - One record per person per day: check in, then check out once
- **Dashboard**
  - Headline counts for the landing page
- **Uploads**
  - Store scanned letters and photos under `/uploads`

### 🔐 Security
Most endpoints require a **JWT Bearer** token from `POST /auth/login`.
Deleting accounts is restricted to the **admin** role.

### 📦 Response Format
Errors are returned as `{"error": "...", "code": "..."}`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::me,

        crate::api::account::create_account,
        crate::api::account::list_accounts,
        crate::api::account::delete_account,

        crate::api::attendance::record_attendance,
        crate::api::attendance::attendance_overview,

        crate::api::mail::create_mail,
        crate::api::mail::list_mail,
        crate::api::mail::delete_mail,

        crate::api::upload::upload_file,

        crate::api::dashboard::summary
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            AuthUser,
            ErrorBody,
            Role,
            Account,
            CreateAccount,
            AttendanceAction,
            AttendanceResponse,
            AttendanceOverview,
            MailDirection,
            CreateMail,
            InboundMail,
            OutboundMail,
            UploadResponse,
            Summary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and identity APIs"),
        (name = "Accounts", description = "Account directory APIs"),
        (name = "Attendance", description = "Daily attendance APIs"),
        (name = "Mail", description = "Incoming and outgoing mail register APIs"),
        (name = "Upload", description = "File upload API"),
        (name = "Dashboard", description = "Summary counts"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
