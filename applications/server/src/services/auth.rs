/// Authentication service - JWT issuance, verification and revocation
use crate::{
    config::JwtConfig,
    error::{Result, ServerError},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use libra_core::{CatalogStore, HumanDuration, LibraError};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Map a case-insensitive method name to a supported algorithm
///
/// `ES512` is not offered by the JWT backend and yields `None` like any
/// other unknown name.
pub fn signing_method_canonical(name: &str) -> Option<Algorithm> {
    let algorithm = match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Algorithm::HS256,
        "HS384" => Algorithm::HS384,
        "HS512" => Algorithm::HS512,
        "RS256" => Algorithm::RS256,
        "RS384" => Algorithm::RS384,
        "RS512" => Algorithm::RS512,
        "PS256" => Algorithm::PS256,
        "PS384" => Algorithm::PS384,
        "PS512" => Algorithm::PS512,
        "ES256" => Algorithm::ES256,
        "ES384" => Algorithm::ES384,
        "EDDSA" => Algorithm::EdDSA,
        _ => return None,
    };
    Some(algorithm)
}

/// Key bytes from a literal, or from the file named after a `file:` prefix
pub fn load_key_material(raw: &str) -> Result<Vec<u8>> {
    let Some(path) = raw.strip_prefix("file:") else {
        return Ok(raw.as_bytes().to_vec());
    };

    let mut path = PathBuf::from(path);
    if path.is_relative() {
        path = std::env::current_dir()?.join(path);
    }
    std::fs::read(&path).map_err(|e| {
        ServerError::Config(format!("cannot read key file {}: {}", path.display(), e))
    })
}

/// Hash a password with bcrypt at the default cost
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(ServerError::from)
}

/// Verify a password; always false for an empty password or hash
///
/// Accounts created through a federated provider have no password, so an
/// empty submission must never match them.
pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    if password.is_empty() || hash.is_empty() {
        return Ok(false);
    }
    bcrypt::verify(password, hash).map_err(ServerError::from)
}

#[derive(Clone)]
pub struct AuthService {
    catalog: Arc<dyn CatalogStore>,
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiration: Duration,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("algorithm", &self.algorithm)
            .field("access_token_expiration", &self.access_token_expiration)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        algorithm: Algorithm,
        encoding_key: EncodingKey,
        decoding_key: DecodingKey,
        access_token_expiration: HumanDuration,
    ) -> Self {
        Self {
            catalog,
            algorithm,
            encoding_key,
            decoding_key,
            access_token_expiration: access_token_expiration.as_duration(),
        }
    }

    /// HS256 with a shared secret
    pub fn with_secret(
        catalog: Arc<dyn CatalogStore>,
        secret: &str,
        access_token_expiration: HumanDuration,
    ) -> Self {
        Self::new(
            catalog,
            Algorithm::HS256,
            EncodingKey::from_secret(secret.as_bytes()),
            DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiration,
        )
    }

    /// Build from `[auth.jwt]`; bad keys or methods are configuration errors
    pub fn from_config(config: &JwtConfig, catalog: Arc<dyn CatalogStore>) -> Result<Self> {
        let algorithm = signing_method_canonical(&config.signing_method).ok_or_else(|| {
            ServerError::Config(format!(
                "unknown signing method {:?}",
                config.signing_method
            ))
        })?;

        let signing = load_key_material(&config.signing_key)?;
        let key_error =
            |e: jsonwebtoken::errors::Error| ServerError::Config(format!("invalid JWT key: {e}"));

        let (encoding_key, decoding_key) = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => (
                EncodingKey::from_secret(&signing),
                DecodingKey::from_secret(&signing),
            ),
            asymmetric => {
                if config.verification_key.is_empty() {
                    return Err(ServerError::Config(format!(
                        "auth.jwt.verification_key is required for {asymmetric:?}"
                    )));
                }
                let verification = load_key_material(&config.verification_key)?;
                match asymmetric {
                    Algorithm::ES256 | Algorithm::ES384 => (
                        EncodingKey::from_ec_pem(&signing).map_err(key_error)?,
                        DecodingKey::from_ec_pem(&verification).map_err(key_error)?,
                    ),
                    Algorithm::EdDSA => (
                        EncodingKey::from_ed_pem(&signing).map_err(key_error)?,
                        DecodingKey::from_ed_pem(&verification).map_err(key_error)?,
                    ),
                    _ => (
                        EncodingKey::from_rsa_pem(&signing).map_err(key_error)?,
                        DecodingKey::from_rsa_pem(&verification).map_err(key_error)?,
                    ),
                }
            }
        };

        Ok(Self::new(
            catalog,
            algorithm,
            encoding_key,
            decoding_key,
            config.access_token_expiration,
        ))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign a token for `user_id` valid from now until the access expiration
    pub fn issue_token(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.access_token_expiration).timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(ServerError::from)
    }

    /// Check the signature and time claims
    fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Decode and reject blacklisted tokens
    pub async fn verify_token(&self, token: &str) -> Result<Claims> {
        let claims = self.decode(token)?;
        if self.catalog.is_token_blacklisted(token).await? {
            return Err(LibraError::Invalidated.into());
        }
        Ok(claims)
    }

    /// Blacklist `token` until it would have expired anyway
    pub async fn revoke(&self, token: &str) -> Result<()> {
        let claims = self.decode(token)?;
        let expiration = DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or_else(|| {
            ServerError::Libra(LibraError::invalid_input("token expiration out of range"))
        })?;

        self.catalog.blacklist_token(token, expiration).await?;
        tracing::debug!(user_id = %claims.user_id, "token revoked");
        Ok(())
    }

    /// Drop blacklist entries that expired on their own
    pub async fn clean_expired_tokens(&self) -> Result<()> {
        self.catalog.clean_expired_tokens().await?;
        Ok(())
    }
}
