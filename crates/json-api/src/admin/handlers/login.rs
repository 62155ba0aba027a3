//! Admin Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{admin::into_status_error, extensions::*, state::State};

/// Admin Login Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Admin Session Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    /// Bearer token for the admin routes
    pub token: String,

    /// RFC 3339 expiry of the session
    pub expires_at: String,
}

/// Admin Login Handler
///
/// Exchanges the operator credentials for a bearer session token.
#[endpoint(
    tags("admin"),
    summary = "Admin Login",
    responses(
        (status_code = StatusCode::OK, description = "Session issued"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid credentials"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin login disabled"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<LoginResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let session = state
        .app
        .admin
        .login(&request.username, &request.password)
        .await
        .map_err(into_status_error)?;

    info!(username = %request.username, "admin logged in");

    Ok(Json(LoginResponse {
        token: session.token.as_str().to_owned(),
        expires_at: session.expires_at.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use wakatv_app::admin::{AdminAuthError, AdminSession, MockAdminAuthService, token::SessionToken};

    use crate::test_helpers::TestApp;

    use super::*;

    fn make_service(admin: MockAdminAuthService) -> Service {
        TestApp {
            admin,
            ..TestApp::new()
        }
        .service(Router::with_path("admin/login").post(handler))
    }

    #[tokio::test]
    async fn valid_credentials_return_token() -> TestResult {
        let token = SessionToken::generate();
        let expected = token.as_str().to_owned();

        let mut admin = MockAdminAuthService::new();

        admin
            .expect_login()
            .once()
            .withf(|username, password| username == "admin" && password == "hunter2")
            .return_once(move |_, _| {
                Ok(AdminSession {
                    token,
                    expires_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::post("http://example.com/admin/login")
            .json(&json!({ "username": "admin", "password": "hunter2" }))
            .send(&make_service(admin))
            .await;

        let body: LoginResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.token, expected);
        assert_eq!(body.expires_at, "1970-01-01T00:00:00Z");

        Ok(())
    }

    #[tokio::test]
    async fn wrong_credentials_return_401() -> TestResult {
        let mut admin = MockAdminAuthService::new();

        admin
            .expect_login()
            .once()
            .return_once(|_, _| Err(AdminAuthError::InvalidCredentials));

        let res = TestClient::post("http://example.com/admin/login")
            .json(&json!({ "username": "admin", "password": "nope" }))
            .send(&make_service(admin))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn disabled_login_returns_403() -> TestResult {
        let mut admin = MockAdminAuthService::new();

        admin
            .expect_login()
            .once()
            .return_once(|_, _| Err(AdminAuthError::LoginDisabled));

        let res = TestClient::post("http://example.com/admin/login")
            .json(&json!({ "username": "admin", "password": "" }))
            .send(&make_service(admin))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_returns_400() -> TestResult {
        let mut admin = MockAdminAuthService::new();

        admin.expect_login().never();

        let res = TestClient::post("http://example.com/admin/login")
            .json(&json!({ "username": "admin" }))
            .send(&make_service(admin))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
