//! Issuing and verifying the bearer credential.
//!
//! The credential is a Ristretto256-signed JWT that binds a request to an account email, nothing more. Roles and
//! statuses are deliberately left out of the claims: the guard middleware re-reads the account on every request, so
//! a role change or suspension takes effect immediately rather than when the token expires.
//!
//! The token is accepted from the `gt_access_token` cookie (set on login) or from a header of the same name.
use std::time::Duration;

use actix_jwt_auth_middleware::{Authority, FromRequest, TokenSigner};
use actix_web::{
    cookie::{time, Cookie, SameSite},
    error::Error as ActixWebError,
    Handler,
};
use log::debug;
use serde::{Deserialize, Serialize};
use tari_jwt::{jwt_compact::Header, Ristretto256, Ristretto256SigningKey};

use crate::{
    config::{AuthConfig, SessionConfig},
    errors::AuthError,
};

pub const ACCESS_TOKEN_NAME: &str = "gt_access_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRequest)]
pub struct JwtClaims {
    pub email: String,
}

impl JwtClaims {
    pub fn new<S: Into<String>>(email: S) -> Self {
        Self { email: email.into() }
    }
}

fn build_jwt_signer(jwt_signing_key: Ristretto256SigningKey) -> Result<TokenSigner<JwtClaims, Ristretto256>, AuthError> {
    let header = Header::empty().with_token_type("JWT");
    TokenSigner::new()
        .signing_key(jwt_signing_key)
        .algorithm(Ristretto256)
        .header(header)
        .access_token_name(ACCESS_TOKEN_NAME)
        .build()
        .map_err(|e| AuthError::CouldNotIssueToken(format!("Failed to build token signer. {e}")))
}

pub fn build_gt_authority(
    auth_config: &AuthConfig,
) -> Result<Authority<JwtClaims, Ristretto256, impl Handler<(), Output = Result<(), ActixWebError>>, ()>, AuthError> {
    let token_signer = build_jwt_signer(auth_config.jwt_signing_key.reveal().clone())?;
    Authority::<JwtClaims, Ristretto256, _, _>::new()
        .refresh_authorizer(|| async { Ok(()) })
        .enable_header_tokens(true)
        .algorithm(Ristretto256)
        .verifying_key(auth_config.jwt_verification_key.clone())
        .token_signer(Some(token_signer))
        .build()
        .map_err(|e| AuthError::CouldNotIssueToken(format!("Failed to build authority. {e}")))
}

/// Signs access tokens and wraps them in the credential cookie.
pub struct TokenIssuer {
    signer: TokenSigner<JwtClaims, Ristretto256>,
    session: SessionConfig,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig, session: SessionConfig) -> Result<Self, AuthError> {
        let signer = build_jwt_signer(config.jwt_signing_key.reveal().clone())?;
        Ok(Self { signer, session })
    }

    /// Issue a new access token for the given email.
    /// This method DOES NOT check that an account exists for the email. This must be done prior to calling
    /// `issue_token`.
    pub fn issue_token(&self, email: &str, duration: Option<Duration>) -> Result<String, AuthError> {
        let claims = JwtClaims::new(email);
        let duration = duration.unwrap_or(self.session.token_lifetime);
        let token = self
            .signer
            .create_signed_token(&claims, duration)
            .map_err(|e| AuthError::CouldNotIssueToken(format!("{e:?}")))?;
        debug!("🔑️ Issued access token for {email}, valid for {}s", duration.as_secs());
        Ok(token)
    }

    pub fn access_cookie(&self, token: String) -> Cookie<'static> {
        let max_age = time::Duration::seconds(self.session.token_lifetime.as_secs() as i64);
        self.cookie(token).max_age(max_age).finish()
    }

    /// A cookie that tells the browser to forget the credential.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.cookie(String::new()).finish();
        cookie.make_removal();
        cookie
    }

    fn cookie(&self, value: String) -> actix_web::cookie::CookieBuilder<'static> {
        let same_site = if self.session.secure_cookies { SameSite::None } else { SameSite::Strict };
        Cookie::build(ACCESS_TOKEN_NAME, value)
            .path("/")
            .http_only(true)
            .secure(self.session.secure_cookies)
            .same_site(same_site)
    }
}
