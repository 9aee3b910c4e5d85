//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate function. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here is async and only awaits on the engine APIs,
//! which in turn await on the connection pool.
//!
//! Routes that carry a `where guard <Action>` clause must be mounted inside the JWT-protected scope. The guard
//! middleware re-reads the caller's account on every request and hands it to the handler as `web::ReqData<Account>`.
use actix_web::{get, web, HttpResponse, Responder};
use garments_engine::{
    account_objects::AccountQueryFilter,
    db_types::{
        Account,
        AccountId,
        AccountUpdate,
        NewAccount,
        NewProduct,
        NewTrackingEvent,
        OrderId,
        ProductId,
        ProductUpdate,
    },
    order_objects::OrderQueryFilter,
    product_objects::ProductQueryFilter,
    AccountApi,
    AccountManagement,
    CatalogApi,
    CatalogManagement,
    InventoryManagement,
    OrderFlowApi,
    ReportingApi,
    ReportingStore,
};
use log::*;

use crate::{
    auth::TokenIssuer,
    data_objects::{JsonResponse, LoginRequest, LoginResponse, OrderRequest, RestockRequest, StatusUpdate},
    errors::{AuthError, ServerError},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
            impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal where guard $action:ident) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: garments_engine::AccountManagement + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name)
                    .wrap($crate::middleware::GuardMiddlewareFactory::<A>::new(
                        garments_engine::guard::Action::$action,
                    ));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where guard $action:ident) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ garments_engine::AccountManagement + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::GuardMiddlewareFactory::<A>::new(
                        garments_engine::guard::Action::$action,
                    ));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/auth/register" impl AccountManagement);
/// Registers a new account, or refreshes the name and photo of an existing one.
///
/// Registration never changes the role or status of an existing account. New administrators are approved straight
/// away; everyone else starts out as `pending`.
pub async fn register<A: AccountManagement>(
    body: web::Json<NewAccount>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let account = body.into_inner();
    debug!("💻️ POST register for {}", account.email);
    let account = api.register(account).await?;
    Ok(HttpResponse::Ok().json(account))
}

route!(login => Post "/auth/login" impl AccountManagement);
/// Route handler for the login endpoint
///
/// Issues an access token for a registered account. The token is returned in the body and set in the
/// `gt_access_token` cookie. The account's role and status are not baked into the token; they are checked afresh on
/// every request.
pub async fn login<A: AccountManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AccountApi<A>>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { email } = body.into_inner();
    let email = email.trim().to_string();
    trace!("💻️ Received login request for {email}");
    let account = api.account_by_email(&email).await?.ok_or_else(|| {
        debug!("💻️ Login attempt for unregistered email {email}");
        AuthError::AccountNotFound(email.clone())
    })?;
    let access_token = issuer.issue_token(&account.email, None)?;
    let cookie = issuer.access_cookie(access_token.clone());
    info!("💻️ {} logged in", account.email);
    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse { success: true, access_token, account }))
}

route!(logout => Post "/auth/logout");
pub async fn logout(issuer: web::Data<TokenIssuer>) -> impl Responder {
    trace!("💻️ Received logout request");
    HttpResponse::Ok().cookie(issuer.removal_cookie()).json(JsonResponse::success("Logged out"))
}

//----------------------------------------------   Catalog (public)  --------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
/// Lists products. Supports `category`, `search`, `show_on_home`, `sort` (`created_at`, `price`, `name`),
/// `order` (`asc`, `desc`), `limit` and `offset` query parameters.
pub async fn products<A: CatalogManagement>(
    query: web::Query<ProductQueryFilter>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    debug!("💻️ GET products [{query:?}]");
    let products = api.search_products(query).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(home_products => Get "/products/home" impl CatalogManagement);
pub async fn home_products<A: CatalogManagement>(api: web::Data<CatalogApi<A>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET home products");
    let products = api.home_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl CatalogManagement);
pub async fn product_by_id<A: CatalogManagement>(
    path: web::Path<ProductId>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET {id}");
    let product =
        api.product_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("{id} does not exist")))?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Catalog (managed)  --------------------------------------------------
route!(create_product => Post "/products" impl CatalogManagement where guard CreateProduct);
/// Publishes a new product. Only managers whose accounts have not been suspended may do this.
pub async fn create_product<A: CatalogManagement>(
    account: web::ReqData<Account>,
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    debug!("💻️ POST product '{}' by {}", product.name, account.email);
    let product = api.create_product(product, &account.email).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Patch "/products/{id}" impl CatalogManagement where guard EditProduct);
/// Edits a product. Stock levels cannot be edited here; use the restock endpoint, or place and cancel orders.
pub async fn update_product<A: CatalogManagement>(
    account: web::ReqData<Account>,
    path: web::Path<ProductId>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PATCH {id} by {}", account.email);
    let product = api.update_product(id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl CatalogManagement where guard DeleteProduct);
/// Deletes a product. Products that still have orders which are not cancelled cannot be deleted (409).
pub async fn delete_product<A: CatalogManagement>(
    account: web::ReqData<Account>,
    path: web::Path<ProductId>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    info!("💻️ DELETE {id} by {}", account.email);
    let product = api.delete_product(id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(restock_product => Post "/products/{id}/restock" impl InventoryManagement where guard RestockProduct);
pub async fn restock_product<A: InventoryManagement>(
    account: web::ReqData<Account>,
    path: web::Path<ProductId>,
    body: web::Json<RestockRequest>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let RestockRequest { amount } = body.into_inner();
    debug!("💻️ POST restock {id} by {amount} from {}", account.email);
    let product = api.restock_product(id, amount).await?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Accounts  ----------------------------------------------------
route!(my_account => Get "/users/me" where guard ReadOwnAccount);
pub async fn my_account(account: web::ReqData<Account>) -> impl Responder {
    trace!("💻️ GET my_account for {}", account.email);
    HttpResponse::Ok().json(account.into_inner())
}

route!(accounts => Get "/users" impl AccountManagement where guard ListAccounts);
/// Lists accounts. `search` matches name or email, case-insensitively. `role`, `status`, `limit` and `offset` are also
/// supported.
pub async fn accounts<A: AccountManagement>(
    query: web::Query<AccountQueryFilter>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    debug!("💻️ GET accounts [{query:?}]");
    let accounts = api.search_accounts(query).await?;
    Ok(HttpResponse::Ok().json(accounts))
}

route!(update_account => Patch "/users/{id}" impl AccountManagement where guard UpdateAccount);
/// Changes an account's role, status or name.
pub async fn update_account<A: AccountManagement>(
    admin: web::ReqData<Account>,
    path: web::Path<AccountId>,
    body: web::Json<AccountUpdate>,
    api: web::Data<AccountApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let update = body.into_inner();
    info!("💻️ PATCH account {id} by {}: {update:?}", admin.email);
    let account = api.update_account(id, update).await?;
    Ok(HttpResponse::Ok().json(account))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl InventoryManagement where guard PlaceOrder);
/// Places an order for the authenticated caller.
///
/// Fails with a 404 if the product does not exist, or a 400 if the quantity is invalid or exceeds the available stock.
pub async fn place_order<A: InventoryManagement>(
    account: web::ReqData<Account>,
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order = body.into_inner().into_new_order(&account.email);
    debug!("💻️ POST order for {} x {} by {}", order.quantity, order.product_id, account.email);
    let order = api.place_order(order).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(orders => Get "/orders" impl InventoryManagement where guard ReadOrders);
/// Lists orders. Supports `status`, `user_email`, `product_id`, `limit` and `offset` query parameters.
pub async fn orders<A: InventoryManagement>(
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    debug!("💻️ GET orders [{query:?}]");
    let orders = api.search_orders(query).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl InventoryManagement where guard ReadOrders);
pub async fn order_by_id<A: InventoryManagement>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET {id}");
    let order = api.order_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("{id} does not exist")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Patch "/orders/{id}" impl InventoryManagement where guard UpdateOrderStatus);
/// Moves an order to a new status. The first move to `cancelled` returns the ordered quantity to the product's stock;
/// repeating it changes nothing. Orders cannot leave `cancelled`.
pub async fn update_order_status<A: InventoryManagement>(
    account: web::ReqData<Account>,
    path: web::Path<OrderId>,
    body: web::Json<StatusUpdate>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let StatusUpdate { status } = body.into_inner();
    info!("💻️ PATCH {id} to {status} by {}", account.email);
    let order = api.update_order_status(id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(append_tracking => Patch "/orders/{id}/tracking" impl InventoryManagement where guard AppendTracking);
pub async fn append_tracking<A: InventoryManagement>(
    account: web::ReqData<Account>,
    path: web::Path<OrderId>,
    body: web::Json<NewTrackingEvent>,
    api: web::Data<OrderFlowApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let event = body.into_inner();
    debug!("💻️ PATCH tracking for {id} by {}: {}", account.email, event.status);
    let order = api.append_tracking_event(id, event).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Analytics  ----------------------------------------------------
route!(analytics => Get "/analytics" impl ReportingStore where guard ViewAnalytics);
/// The analytics dashboard. This endpoint never fails because of the store: sections that could not be computed are
/// zeroed and the report is flagged as `degraded`.
pub async fn analytics<A: ReportingStore>(api: web::Data<ReportingApi<A>>) -> impl Responder {
    trace!("💻️ GET analytics");
    let report = api.analytics().await;
    HttpResponse::Ok().json(report)
}
