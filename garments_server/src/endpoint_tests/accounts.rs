use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use garments_engine::{
    db_types::{AccountId, AccountStatus, Role},
    AccountApi,
};
use serde_json::{json, Value};

use super::{helpers::*, mocks::MockStore};
use crate::routes::{AccountsRoute, MyAccountRoute, UpdateAccountRoute};

#[actix_web::test]
async fn fetch_my_account() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/users/me");
    let (status, body) = secure_request(req, &valid_token("buyer@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::OK);
    let account: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(account["email"], "buyer@example.com");
    assert_eq!(account["role"], "buyer");
    assert_eq!(account["status"], "approved");
}

#[actix_web::test]
async fn suspended_accounts_still_see_themselves() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/users/me");
    let (status, body) = secure_request(req, &valid_token("suspended@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::OK);
    let account: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(account["status"], "suspended");
}

#[actix_web::test]
async fn my_account_requires_a_registered_identity() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/users/me");
    let (status, _) = secure_request(req, &valid_token("ghost@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_lists_accounts() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/users?search=example&role=manager&limit=10");
    let (status, body) = secure_request(req, &valid_token("admin@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::OK);
    let accounts: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(accounts.as_array().map(|a| a.len()), Some(1));
    assert_eq!(accounts[0]["email"], "manager@example.com");
}

#[actix_web::test]
async fn managers_cannot_list_accounts() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/users");
    let (status, body) = secure_request(req, &valid_token("manager@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Access denied. This action requires the admin role","kind":"forbidden"}"#);
}

#[actix_web::test]
async fn admin_suspends_a_manager() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::patch().uri("/users/2").set_json(json!({"status": "suspended"}));
    let (status, body) = secure_request(req, &valid_token("admin@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::OK);
    let account: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(account["id"], 2);
    assert_eq!(account["role"], "manager");
    assert_eq!(account["status"], "suspended");
}

#[actix_web::test]
async fn promoting_a_buyer() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::patch().uri("/users/1").set_json(json!({"role": "manager", "status": "approved"}));
    let (status, body) = secure_request(req, &valid_token("admin@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::OK);
    let account: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(account["role"], "manager");
}

#[actix_web::test]
async fn empty_account_updates_are_rejected() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::patch().uri("/users/1").set_json(json!({}));
    let (status, body) = secure_request(req, &valid_token("admin@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"Invalid account data: The account update contains no changes","kind":"invalid_input"}"#
    );
}

#[actix_web::test]
async fn updating_a_missing_account() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::patch().uri("/users/99").set_json(json!({"role": "admin"}));
    let (status, body) = secure_request(req, &valid_token("admin@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["kind"], "not_found");
}

#[actix_web::test]
async fn buyers_cannot_change_roles() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::patch().uri("/users/1").set_json(json!({"role": "admin"}));
    let (status, _) = secure_request(req, &valid_token("buyer@example.com"), configure_directory).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn configure_directory(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store.expect_fetch_account_by_email().returning(|email| {
        let account = match email {
            "buyer@example.com" => Some(buyer()),
            "manager@example.com" => Some(manager()),
            "admin@example.com" => Some(admin()),
            "suspended@example.com" => {
                Some(account(4, "suspended@example.com", Role::Manager, AccountStatus::Suspended))
            },
            _ => None,
        };
        Ok(account)
    });
    store.expect_search_accounts().returning(|query| {
        assert_eq!(query.search.as_deref(), Some("example"));
        assert_eq!(query.role, Some(Role::Manager));
        assert_eq!(query.limit, Some(10));
        Ok(vec![manager()])
    });
    store.expect_update_account().returning(|id, update| {
        let mut stored = match id {
            AccountId(1) => buyer(),
            AccountId(2) => manager(),
            _ => return Ok(None),
        };
        if let Some(role) = update.role {
            stored.role = role;
        }
        if let Some(status) = update.status {
            stored.status = status;
        }
        Ok(Some(stored))
    });
    cfg.app_data(web::Data::new(AccountApi::new(store)))
        .service(MyAccountRoute::<MockStore>::new())
        .service(AccountsRoute::<MockStore>::new())
        .service(UpdateAccountRoute::<MockStore>::new());
}
