use std::time::Duration;

use actix_jwt_auth_middleware::use_jwt::UseJWTOnApp;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, web::ServiceConfig, App, HttpServer};
use garments_engine::{AccountApi, CatalogApi, OrderFlowApi, ReportingApi, SqliteDatabase};
use log::*;

use crate::{
    auth::{build_gt_authority, TokenIssuer},
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        AccountsRoute,
        AnalyticsRoute,
        AppendTrackingRoute,
        CreateProductRoute,
        DeleteProductRoute,
        HomeProductsRoute,
        LoginRoute,
        LogoutRoute,
        MyAccountRoute,
        OrderByIdRoute,
        OrdersRoute,
        PlaceOrderRoute,
        ProductByIdRoute,
        ProductsRoute,
        RegisterRoute,
        RestockProductRoute,
        UpdateAccountRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    info!("🗄️ Connected to {} and brought the schema up to date", config.database_url);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let issuer = web::Data::new(TokenIssuer::new(&config.auth, config.session)?);
    let authority = build_gt_authority(&config.auth)?;
    let max_retries = config.max_retries;
    let srv = HttpServer::new(move || {
        let accounts_api = AccountApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let orders_api = OrderFlowApi::new(db.clone()).with_max_retries(max_retries);
        let reporting_api = ReportingApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("gt::access_log"))
            .configure(configure_extractors)
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(reporting_api))
            .app_data(issuer.clone());
        // Routes that require authentication. The guard middleware on each route takes care of authorization.
        let secure_scope = web::scope("/api/secure")
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(RestockProductRoute::<SqliteDatabase>::new())
            .service(MyAccountRoute::<SqliteDatabase>::new())
            .service(AccountsRoute::<SqliteDatabase>::new())
            .service(UpdateAccountRoute::<SqliteDatabase>::new())
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(OrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(AppendTrackingRoute::<SqliteDatabase>::new())
            .service(AnalyticsRoute::<SqliteDatabase>::new());
        let public_scope = web::scope("/api")
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(LogoutRoute::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(HomeProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new());
        app.use_jwt(authority.clone(), secure_scope).service(health).service(public_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed bodies, paths and queries are answered with the same JSON error shape as every other failure.
pub fn configure_extractors(cfg: &mut ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default().error_handler(|err, _req| ServerError::InvalidRequestPath(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, _req| ServerError::InvalidRequestQuery(err.to_string()).into()),
    );
}
