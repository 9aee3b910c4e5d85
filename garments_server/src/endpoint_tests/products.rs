use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use garments_engine::{
    db_types::{Account, AccountStatus, ProductId, Role},
    product_objects::{ProductSort, SortOrder},
    AccountApi,
    CatalogApi,
    CatalogApiError,
    InventoryError,
    OrderFlowApi,
};
use serde_json::{json, Value};

use super::{helpers::*, mocks::MockStore};
use crate::routes::{
    CreateProductRoute,
    DeleteProductRoute,
    HomeProductsRoute,
    ProductByIdRoute,
    ProductsRoute,
    RestockProductRoute,
    UpdateProductRoute,
};

//----------------------------------------------   Public catalog  ----------------------------------------------------

#[actix_web::test]
async fn list_products_with_filters() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/products?category=jackets&search=denim&sort=price&order=asc&limit=5");
    let (status, body) = public_request(req, configure_public_catalog).await;
    assert_eq!(status, StatusCode::OK);
    let products: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(products.as_array().map(|a| a.len()), Some(1));
    assert_eq!(products[0]["price"], 4500);
}

#[actix_web::test]
async fn list_products_rejects_unknown_sort_keys() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/products?sort=popularity");
    let (status, body) = public_request(req, configure_public_catalog).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["kind"], "invalid_input");
}

#[actix_web::test]
async fn home_page_products() {
    let _ = env_logger::try_init().ok();
    let (status, body) = public_request(TestRequest::get().uri("/products/home"), configure_public_catalog).await;
    assert_eq!(status, StatusCode::OK);
    let products: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(products.as_array().map(|a| a.len()), Some(2));
}

#[actix_web::test]
async fn fetch_product_by_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = public_request(TestRequest::get().uri("/products/7"), configure_public_catalog).await;
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["id"], 7);
    assert_eq!(product["created_by"], "manager@example.com");
}

#[actix_web::test]
async fn fetch_missing_product() {
    let _ = env_logger::try_init().ok();
    let (status, body) = public_request(TestRequest::get().uri("/products/99"), configure_public_catalog).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. product#99 does not exist","kind":"not_found"}"#);
}

fn configure_public_catalog(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store.expect_search_products().returning(|query| {
        if query.show_on_home == Some(true) {
            return Ok(vec![product(7, 10), product(8, 3)]);
        }
        assert_eq!(query.category.as_deref(), Some("jackets"));
        assert_eq!(query.search.as_deref(), Some("denim"));
        assert_eq!(query.sort, Some(ProductSort::Price));
        assert_eq!(query.order, Some(SortOrder::Asc));
        assert_eq!(query.limit, Some(5));
        Ok(vec![product(7, 10)])
    });
    store.expect_fetch_product().returning(|id| Ok((id == ProductId(7)).then(|| product(7, 10))));
    cfg.app_data(web::Data::new(CatalogApi::new(store)))
        .service(ProductsRoute::<MockStore>::new())
        .service(HomeProductsRoute::<MockStore>::new())
        .service(ProductByIdRoute::<MockStore>::new());
}

//----------------------------------------------   Managed catalog  ----------------------------------------------------

#[actix_web::test]
async fn manager_publishes_a_product() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/products")
        .set_json(json!({"name": "Denim jacket", "price": 4500, "quantity": 20, "category": "jackets"}));
    let (status, body) = secure_request(req, &valid_token("manager@example.com"), configure_managed_catalog).await;
    assert_eq!(status, StatusCode::CREATED);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["created_by"], "manager@example.com");
    assert_eq!(product["quantity"], 20);
}

#[actix_web::test]
async fn buyer_cannot_publish_products() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/products").set_json(json!({"name": "Scarf", "price": 900, "quantity": 4}));
    let (status, body) = secure_request(req, &valid_token("buyer@example.com"), configure_managed_catalog).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Access denied. This action requires the manager role","kind":"forbidden"}"#);
}

#[actix_web::test]
async fn suspended_manager_cannot_publish_products() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/products").set_json(json!({"name": "Scarf", "price": 900, "quantity": 4}));
    let (status, body) =
        secure_request(req, &valid_token("suspended@example.com"), configure_managed_catalog).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Access denied. The account has been suspended","kind":"forbidden"}"#);
}

#[actix_web::test]
async fn publishing_without_credentials_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/products").set_json(json!({"name": "Scarf", "price": 900, "quantity": 4}));
    let (status, _) = secure_request(req, "", configure_managed_catalog).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn negative_price_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/products").set_json(json!({"name": "Scarf", "price": -1, "quantity": 4}));
    let (status, body) = secure_request(req, &valid_token("manager@example.com"), configure_managed_catalog).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["kind"], "invalid_input");
}

#[actix_web::test]
async fn any_account_may_edit_a_product() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::patch().uri("/products/7").set_json(json!({"price": 3900, "show_on_home": false}));
    let (status, body) = secure_request(req, &valid_token("buyer@example.com"), configure_managed_catalog).await;
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["price"], 3900);
    assert_eq!(product["show_on_home"], false);
}

#[actix_web::test]
async fn stock_cannot_be_edited_directly() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::patch().uri("/products/7").set_json(json!({"quantity": 1000}));
    let (status, body) = secure_request(req, &valid_token("manager@example.com"), configure_managed_catalog).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["kind"], "invalid_input");
    assert!(body["error"].as_str().unwrap().contains("quantity"), "{body}");
}

#[actix_web::test]
async fn products_with_open_orders_cannot_be_deleted() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::delete().uri("/products/7");
    let (status, body) = secure_request(req, &valid_token("manager@example.com"), configure_managed_catalog).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        r#"{"error":"Product product#7 cannot be deleted while it has 2 open order(s)","kind":"conflict"}"#
    );
}

#[actix_web::test]
async fn delete_product_without_orders() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::delete().uri("/products/8");
    let (status, body) = secure_request(req, &valid_token("buyer@example.com"), configure_managed_catalog).await;
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["id"], 8);
}

fn configure_managed_catalog(cfg: &mut ServiceConfig) {
    let mut accounts = MockStore::new();
    accounts.expect_fetch_account_by_email().returning(|email| {
        let account = match email {
            "manager@example.com" => Some(manager()),
            "buyer@example.com" => Some(buyer()),
            "suspended@example.com" => {
                Some(account(4, "suspended@example.com", Role::Manager, AccountStatus::Suspended))
            },
            _ => None,
        };
        Ok(account)
    });
    let mut store = MockStore::new();
    store.expect_insert_product().returning(|new_product, created_by| {
        let mut stored = product(9, new_product.quantity);
        stored.name = new_product.name;
        stored.price = new_product.price;
        stored.created_by = created_by.to_string();
        Ok(stored)
    });
    store.expect_update_product().returning(|id, update| {
        let mut stored = product(id.value(), 10);
        if let Some(price) = update.price {
            stored.price = price;
        }
        if let Some(show) = update.show_on_home {
            stored.show_on_home = show;
        }
        Ok(Some(stored))
    });
    store.expect_delete_product().returning(|id| match id.value() {
        7 => Err(CatalogApiError::ProductHasOpenOrders { product_id: id, open_orders: 2 }),
        _ => Ok(product(id.value(), 0)),
    });
    cfg.app_data(web::Data::new(AccountApi::new(accounts)))
        .app_data(web::Data::new(CatalogApi::new(store)))
        .service(CreateProductRoute::<MockStore>::new())
        .service(UpdateProductRoute::<MockStore>::new())
        .service(DeleteProductRoute::<MockStore>::new());
}

//----------------------------------------------   Restocking  ----------------------------------------------------

#[actix_web::test]
async fn manager_restocks_a_product() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/products/7/restock").set_json(json!({"amount": 15}));
    let (status, body) =
        secure_request(req, &valid_token("manager@example.com"), configure_restock(Some(manager()))).await;
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["quantity"], 25);
}

#[actix_web::test]
async fn buyers_cannot_restock() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/products/7/restock").set_json(json!({"amount": 15}));
    let (status, _) = secure_request(req, &valid_token("buyer@example.com"), configure_restock(Some(buyer()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn restock_by_a_non_positive_amount() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/products/7/restock").set_json(json!({"amount": 0}));
    let (status, body) =
        secure_request(req, &valid_token("manager@example.com"), configure_restock(Some(manager()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["kind"], "invalid_quantity");
}

#[actix_web::test]
async fn restock_missing_product() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/products/99/restock").set_json(json!({"amount": 1}));
    let (status, _) =
        secure_request(req, &valid_token("manager@example.com"), configure_restock(Some(manager()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_restock(caller: Option<Account>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let mut store = MockStore::new();
        store.expect_restock_product().returning(|id, amount| match id.value() {
            7 => Ok(product(7, 10 + amount)),
            _ => Err(InventoryError::ProductNotFound(id)),
        });
        cfg.app_data(accounts_knowing(caller))
            .app_data(web::Data::new(OrderFlowApi::new(store)))
            .service(RestockProductRoute::<MockStore>::new());
    }
}
