use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use garments_engine::AccountApi;
use log::*;
use serde_json::{json, Value};
use tari_jwt::{
    jwt_compact::{AlgorithmExt, UntrustedToken},
    Ristretto256,
};

use super::{helpers::*, mocks::MockStore};
use crate::{
    auth::{JwtClaims, ACCESS_TOKEN_NAME},
    routes::{health, LoginRoute, LogoutRoute, RegisterRoute},
};

#[actix_web::test]
async fn health_check() {
    let app = test::init_service(App::new().service(health)).await;
    let res = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn register_new_buyer() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"email": "new@example.com", "name": "New Buyer"}));
    let (status, body) = public_request(req, configure_registration).await;
    assert_eq!(status, StatusCode::OK);
    let account: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(account["email"], "new@example.com");
    assert_eq!(account["role"], "buyer");
    assert_eq!(account["status"], "pending");
}

#[actix_web::test]
async fn register_rejects_malformed_email() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/auth/register").set_json(json!({"email": "not-an-email"}));
    let (status, body) = public_request(req, configure_registration).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"Invalid account data: 'not-an-email' is not a valid email address","kind":"invalid_input"}"#
    );
}

#[actix_web::test]
async fn register_without_email_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/auth/register").set_json(json!({"name": "Nobody"}));
    let (status, body) = public_request(req, configure_registration).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["kind"], "invalid_input");
}

#[actix_web::test]
async fn login_with_registered_email() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/auth/login").set_json(json!({"email": "buyer@example.com"}));
    let app = App::new().configure(configure_login);
    let app = test::init_service(app).await;
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == ACCESS_TOKEN_NAME)
        .expect("login sets the credential cookie");
    assert_eq!(cookie.http_only(), Some(true));
    let token = cookie.value().to_string();
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["access_token"], token.as_str());
    assert_eq!(body["account"]["role"], "buyer");

    let claims = validate_token(&token);
    assert_eq!(claims.email, "buyer@example.com");
}

#[actix_web::test]
async fn login_with_unknown_email() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/auth/login").set_json(json!({"email": "stranger@example.com"}));
    let (status, body) = public_request(req, configure_login).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        r#"{"error":"Authentication Error. No account is registered for stranger@example.com.","kind":"unauthorized"}"#
    );
}

#[actix_web::test]
async fn logout_clears_the_cookie() {
    let _ = env_logger::try_init().ok();
    let app = App::new().app_data(web::Data::new(token_issuer())).service(LogoutRoute::new());
    let app = test::init_service(app).await;
    let res = test::call_service(&app, TestRequest::post().uri("/auth/logout").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == ACCESS_TOKEN_NAME)
        .expect("logout overwrites the credential cookie");
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
}

fn validate_token(token: &str) -> JwtClaims {
    let config = get_auth_config();
    let token = UntrustedToken::new(token).unwrap();
    let token = Ristretto256.validator::<JwtClaims>(&config.jwt_verification_key).validate(&token).unwrap();
    info!("Validated token: {:?}", token.claims());
    token.claims().custom.clone()
}

fn configure_registration(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store.expect_upsert_account().returning(|new_account| {
        let status = new_account.initial_status();
        let mut stored = account(10, &new_account.email, new_account.role, status);
        stored.name = new_account.name;
        Ok(stored)
    });
    cfg.app_data(web::Data::new(AccountApi::new(store))).service(RegisterRoute::<MockStore>::new());
}

fn configure_login(cfg: &mut ServiceConfig) {
    cfg.app_data(accounts_knowing(Some(buyer())))
        .app_data(web::Data::new(token_issuer()))
        .service(LoginRoute::<MockStore>::new());
}

