//! Authorization guard middleware.
//! This middleware can be placed on any route inside the JWT-protected scope.
//!
//! It reads the email from the verified JWT claims, fetches the caller's account afresh from the account directory
//! and asks [`garments_engine::guard::decide`] whether the account may perform the route's [`Action`]. Allowed
//! requests continue with the [`Account`] stored in the request extensions, so handlers can pick it up with
//! `web::ReqData<Account>`. Denied requests get a 401 (no verified identity) or a 403 (everything else).

use std::{marker::PhantomData, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use garments_engine::{
    db_types::Account,
    guard::{authorize, decide, Action, Caller, Decision},
    AccountApi,
    AccountManagement,
};
use log::*;

use crate::{auth::JwtClaims, errors::ServerError};

pub struct GuardMiddlewareFactory<A> {
    action: Action,
    _backend: PhantomData<fn() -> A>,
}

impl<A> GuardMiddlewareFactory<A> {
    pub fn new(action: Action) -> Self {
        GuardMiddlewareFactory { action, _backend: PhantomData }
    }
}

impl<S, B, A> Transform<S, ServiceRequest> for GuardMiddlewareFactory<A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: AccountManagement + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = GuardMiddlewareService<S, A>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(GuardMiddlewareService { action: self.action, service: Rc::new(service), _backend: PhantomData })
    }
}

pub struct GuardMiddlewareService<S, A> {
    action: Action,
    service: Rc<S>,
    _backend: PhantomData<fn() -> A>,
}

impl<S, B, A> Service<ServiceRequest> for GuardMiddlewareService<S, A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: AccountManagement + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let action = self.action;
        Box::pin(async move {
            let email = req.extensions().get::<JwtClaims>().map(|claims| claims.email.clone());
            let Some(email) = email else {
                warn!("🛡️ No JWT claims found in request extensions for {action}");
                let decision = authorize(Caller::Anonymous, action);
                return match decision {
                    Decision::Allow => service.call(req).await,
                    Decision::Deny(reason) => Err(ServerError::from(reason).into()),
                };
            };
            let api = req.app_data::<web::Data<AccountApi<A>>>().cloned().ok_or_else(|| {
                error!("🛡️ The account API has not been registered with the application");
                ServerError::Unspecified("Account directory is not configured".into())
            })?;
            let account: Option<Account> = api.account_by_email(&email).await.map_err(ServerError::from)?;
            match decide(account.as_ref(), action) {
                Decision::Allow => {
                    trace!("🛡️ {email} may perform {action}");
                    if let Some(account) = account {
                        req.extensions_mut().insert(account);
                    }
                    service.call(req).await
                },
                Decision::Deny(reason) => {
                    debug!("🛡️ {email} may not perform {action}. {reason}");
                    Err(ServerError::from(reason).into())
                },
            }
        })
    }
}
