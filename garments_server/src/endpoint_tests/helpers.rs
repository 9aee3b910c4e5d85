use actix_jwt_auth_middleware::AuthenticationService;
use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
    HttpResponse,
};
use chrono::{DateTime, Days, TimeZone, Utc};
use garments_engine::{
    db_types::{Account, AccountId, AccountStatus, Order, OrderId, OrderStatusType, Product, ProductId, Role},
    AccountApi,
};
use gt_common::{Cents, Secret};
use log::debug;
use sqlx::types::Json;
use tari_jwt::{
    jwt_compact::{AlgorithmExt, Claims, Header},
    tari_crypto::{
        keys::PublicKey,
        ristretto::{RistrettoPublicKey, RistrettoSecretKey},
        tari_utilities::hex::Hex,
    },
    Ristretto256,
    Ristretto256SigningKey,
    Ristretto256VerifyingKey,
};

use super::mocks::MockStore;
use crate::{
    auth::{build_gt_authority, JwtClaims, TokenIssuer, ACCESS_TOKEN_NAME},
    config::{AuthConfig, SessionConfig},
    server::configure_extractors,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this key anywhere.
pub fn get_auth_config() -> AuthConfig {
    let sk = RistrettoSecretKey::from_hex("925842e11914fdd0c9a2ab8a38dac9de57b3e392372cde1661b1a84b1d8e430e").unwrap();
    let pk = RistrettoPublicKey::from_secret_key(&sk);
    AuthConfig {
        jwt_signing_key: Secret::new(Ristretto256SigningKey(sk)),
        jwt_verification_key: Ristretto256VerifyingKey(pk),
    }
}

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(&get_auth_config(), SessionConfig::default()).unwrap()
}

pub fn issue_token(email: &str, expiry: DateTime<Utc>) -> String {
    let config = get_auth_config();
    let header = Header::empty().with_token_type("JWT");
    let signer = Ristretto256 {};
    let mut claims = Claims::<JwtClaims>::new(JwtClaims::new(email));
    claims.expiration = Some(expiry);
    signer.token(&header, &claims, config.jwt_signing_key.reveal()).expect("Failed to sign token")
}

pub fn valid_token(email: &str) -> String {
    issue_token(email, Utc::now() + Days::new(1))
}

/// Sends a request through an app that is wrapped in the JWT middleware, the same way the `/api/secure` scope is.
/// An empty `token` sends no credential at all.
pub async fn secure_request(
    req: TestRequest,
    token: &str,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let req = if token.is_empty() { req } else { req.insert_header((ACCESS_TOKEN_NAME, token)) };
    let authority = build_gt_authority(&get_auth_config()).unwrap();
    let app =
        App::new().wrap(AuthenticationService::new(authority)).configure(configure_extractors).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(e) => e.error_response(),
    };
    into_parts(res)
}

/// Sends a request to routes that need no credential.
pub async fn public_request(req: TestRequest, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().configure(configure_extractors).configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await.into_parts().1.map_into_boxed_body();
    into_parts(res)
}

fn into_parts(res: HttpResponse) -> (StatusCode, String) {
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

/// An account API that knows exactly one account (or none).
pub fn accounts_knowing(caller: Option<Account>) -> web::Data<AccountApi<MockStore>> {
    let mut store = MockStore::new();
    store.expect_fetch_account_by_email().returning(move |email| Ok(caller.clone().filter(|a| a.email == email)));
    web::Data::new(AccountApi::new(store))
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 17, 9, 30, 0).unwrap()
}

pub fn account(id: i64, email: &str, role: Role, status: AccountStatus) -> Account {
    Account {
        id: AccountId(id),
        email: email.to_string(),
        name: email.split('@').next().unwrap_or_default().to_string(),
        photo_url: None,
        role,
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn buyer() -> Account {
    account(1, "buyer@example.com", Role::Buyer, AccountStatus::Approved)
}

pub fn manager() -> Account {
    account(2, "manager@example.com", Role::Manager, AccountStatus::Approved)
}

pub fn admin() -> Account {
    account(3, "admin@example.com", Role::Admin, AccountStatus::Approved)
}

pub fn product(id: i64, quantity: i64) -> Product {
    Product {
        id: ProductId(id),
        name: "Denim jacket".to_string(),
        description: "Stonewashed, unisex".to_string(),
        category: "jackets".to_string(),
        price: Cents::from(4_500),
        quantity,
        minimum_order: 1,
        images: Json(vec!["https://img.example.com/jacket.png".to_string()]),
        payment_options: Some("cash on delivery".to_string()),
        show_on_home: true,
        rating: None,
        location: Some("Dhaka".to_string()),
        created_by: "manager@example.com".to_string(),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn order(id: i64, quantity: i64, status: OrderStatusType) -> Order {
    Order {
        id: OrderId(id),
        product_id: ProductId(7),
        product_name: "Denim jacket".to_string(),
        quantity,
        unit_price: Cents::from(4_500),
        total_price: Cents::from(4_500) * quantity,
        user_email: "buyer@example.com".to_string(),
        status,
        delivery_address: Some("12 Road 4, Dhanmondi".to_string()),
        contact_number: None,
        notes: None,
        created_at: timestamp(),
        updated_at: timestamp(),
        tracking: vec![],
    }
}
