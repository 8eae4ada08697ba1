//! Request/response DTOs and the success envelope.
//!
//! Create/update bodies deserialize straight into the domain command types
//! (`CreateStore`, `UpdateProduct`, ...); only requests with no domain
//! counterpart and views that must hide fields are defined here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_auth::{Role, User};
use storefront_core::{CategoryId, StoreId, UserId};
use storefront_infra::CascadeReport;
use storefront_sales::OrderStatus;

#[derive(Debug, Serialize)]
struct Envelope<T> {
    ok: bool,
    data: T,
}

/// `200 {"ok": true, "data": ...}`
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(Envelope { ok: true, data })).into_response()
}

/// `201 {"ok": true, "data": ...}`
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(Envelope { ok: true, data })).into_response()
}

/// Public view of an account: no password hash, no recovery token.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub role: Role,
    pub image_url: Option<String>,
    pub active: bool,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            fname: user.fname.clone(),
            lname: user.lname.clone(),
            email: user.email.clone(),
            role: user.role,
            image_url: user.image_url.clone(),
            active: user.lifecycle.active,
            enabled: user.lifecycle.enabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CascadeView {
    pub store_id: Option<StoreId>,
    pub products_modified: u64,
    pub coupons_modified: u64,
}

impl From<CascadeReport> for CascadeView {
    fn from(report: CascadeReport) -> Self {
        Self {
            store_id: report.store_id,
            products_modified: report.products.modified,
            coupons_modified: report.coupons.modified,
        }
    }
}

/// Login by username or email.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecoverTokenRequest {
    #[serde(alias = "username", alias = "email")]
    pub login: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoverTokenView {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryChangeRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub store_id: Option<StoreId>,
    pub category_id: Option<CategoryId>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreQuery {
    /// `true`: only stores still waiting for approval.
    #[serde(default)]
    pub pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_auth::RegisterUser;

    #[test]
    fn user_view_hides_credentials() {
        let mut user = User::register(
            RegisterUser {
                username: "shopper01".into(),
                fname: "Ana".into(),
                lname: "Rojas".into(),
                password: "correct-horse".into(),
                email: "ana@example.cl".into(),
                image_url: None,
            },
            Utc::now(),
        )
        .unwrap();
        user.recover_token = Some("secret-token".into());

        let json = serde_json::to_string(&UserView::from(&user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"role\":\"CLIENT_ROLE\""));
    }

    #[test]
    fn login_accepts_username_or_email_keys() {
        let a: LoginRequest = serde_json::from_str(r#"{"username":"shopper01","password":"x"}"#).unwrap();
        let b: LoginRequest = serde_json::from_str(r#"{"email":"ana@example.cl","password":"x"}"#).unwrap();
        assert_eq!(a.login, "shopper01");
        assert_eq!(b.login, "ana@example.cl");
    }
}
