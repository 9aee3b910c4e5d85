use std::{env, io::Write, time::Duration};

use garments_engine::DEFAULT_MAX_RETRIES;
use gt_common::{
    helpers::{parse_boolean_flag, parse_number_or},
    Secret,
};
use log::*;
use rand::thread_rng;
use serde_json::json;
use tari_jwt::{
    tari_crypto::{
        keys::PublicKey,
        ristretto::{RistrettoPublicKey, RistrettoSecretKey},
        tari_utilities::hex::Hex,
    },
    Ristretto256SigningKey,
    Ristretto256VerifyingKey,
};
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_GT_HOST: &str = "127.0.0.1";
const DEFAULT_GT_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/garments.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
/// Seven days
const DEFAULT_TOKEN_LIFETIME_HOURS: u64 = 168;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// How many times a contended order placement, status change or restock is retried before giving up with a
    /// conflict.
    pub max_retries: u32,
    pub auth: AuthConfig,
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GT_HOST.to_string(),
            port: DEFAULT_GT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            max_retries: DEFAULT_MAX_RETRIES,
            auth: AuthConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("GT_HOST").ok().unwrap_or_else(|| DEFAULT_GT_HOST.into());
        let port = number_from_env("GT_PORT", DEFAULT_GT_PORT);
        let database_url = env::var("GT_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ GT_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections = number_from_env("GT_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let max_retries = number_from_env("GT_MAX_RETRIES", DEFAULT_MAX_RETRIES);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let session = SessionConfig::from_env_or_default();
        Self { host, port, database_url, db_max_connections, max_retries, auth, session }
    }
}

fn number_from_env<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    parse_number_or(env::var(name).ok(), default).unwrap_or_else(|e| {
        error!("🪛️ Invalid configuration value for {name}. {e} Using the default, {default}, instead.");
        default
    })
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// This is the secret key used to sign JWTs. It must be in hex format and be a valid Ristretto secret key.
    pub jwt_signing_key: Secret<Ristretto256SigningKey>,
    /// This is the public key used to verify JWTs. It must be in hex format and be a valid Ristretto public key.
    /// It must be the public key corresponding to the `jwt_signing_key`.
    pub jwt_verification_key: Ristretto256VerifyingKey,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT signing key has not been set. I'm using a random value for this session. Every credential \
             issued by this instance becomes invalid when it restarts. 🚨️🚨️🚨️"
        );
        let mut rng = thread_rng();
        let (sk, pk) = RistrettoPublicKey::random_keypair(&mut rng);
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({
                    "jwt_signing_key": sk.to_hex(),
                    "jwt_verification_key": pk.to_hex(),
                })
                .to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT keys for this session were written to {}. Set GT_JWT_SIGNING_KEY and \
                         GT_JWT_VERIFICATION_KEY in production instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT signing key to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT signing key.");
            },
        }
        Self {
            jwt_signing_key: Secret::new(Ristretto256SigningKey(sk)),
            jwt_verification_key: Ristretto256VerifyingKey(pk),
        }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let jwt_sk_hex = env::var("GT_JWT_SIGNING_KEY")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [GT_JWT_SIGNING_KEY]")))?;
        let jwt_pk_hex = env::var("GT_JWT_VERIFICATION_KEY")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [GT_JWT_VERIFICATION_KEY]")))?;
        Self::from_hex(&jwt_sk_hex, &jwt_pk_hex)
    }

    /// Builds the configuration from a hex-encoded key pair, checking that the two halves belong together.
    pub fn from_hex(signing_key: &str, verification_key: &str) -> Result<Self, ServerError> {
        let sk = RistrettoSecretKey::from_hex(signing_key)
            .map_err(|e| ServerError::ConfigurationError(format!("Invalid signing key in GT_JWT_SIGNING_KEY: {e}")))?;
        let expected = RistrettoPublicKey::from_secret_key(&sk);
        let vk = RistrettoPublicKey::from_hex(verification_key).map_err(|e| {
            ServerError::ConfigurationError(format!("Invalid verification key in GT_JWT_VERIFICATION_KEY: {e}"))
        })?;
        if vk != expected {
            return Err(ServerError::ConfigurationError(
                "The verification key does not match the signing key. Check your configuration.".to_string(),
            ));
        }
        Ok(Self {
            jwt_signing_key: Secret::new(Ristretto256SigningKey(sk)),
            jwt_verification_key: Ristretto256VerifyingKey(vk),
        })
    }
}

//-------------------------------------------------  SessionConfig  ----------------------------------------------------
/// How long issued credentials live, and how the credential cookie is marked.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub token_lifetime: Duration,
    /// When true, the credential cookie is marked `Secure` with `SameSite=None`. Otherwise it is `SameSite=Strict`,
    /// which is what you want for local development over plain HTTP.
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { token_lifetime: Duration::from_secs(DEFAULT_TOKEN_LIFETIME_HOURS * 3600), secure_cookies: false }
    }
}

impl SessionConfig {
    pub fn from_env_or_default() -> Self {
        let hours = number_from_env("GT_TOKEN_LIFETIME_HOURS", DEFAULT_TOKEN_LIFETIME_HOURS);
        let hours = if hours == 0 {
            warn!("🪛️ GT_TOKEN_LIFETIME_HOURS cannot be zero. Using {DEFAULT_TOKEN_LIFETIME_HOURS} hours instead.");
            DEFAULT_TOKEN_LIFETIME_HOURS
        } else {
            hours
        };
        let secure_cookies = parse_boolean_flag(env::var("GT_SECURE_COOKIES").ok(), false);
        if !secure_cookies {
            info!("🪛️ Credential cookies are not marked as secure. Set GT_SECURE_COOKIES=1 when serving over HTTPS.");
        }
        Self { token_lifetime: Duration::from_secs(hours * 3600), secure_cookies }
    }
}
