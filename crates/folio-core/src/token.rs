//! Session token issuing and verification
//!
//! Tokens are HS256 JWTs signed with a process-wide secret. Verification is
//! self-contained: it checks the signature and expiry and never touches the
//! principal store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use folio_types::{Principal, PrincipalId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::{CoreConfig, CoreError};

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (principal ID)
    pub sub: String,
    /// Identity key of the principal
    pub email: String,
    /// Issued at timestamp (seconds)
    pub iat: i64,
    /// Expiration timestamp (seconds)
    pub exp: i64,
}

impl TokenClaims {
    /// Expired once `now` reaches `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Get the principal ID
    pub fn principal_id(&self) -> Option<PrincipalId> {
        PrincipalId::parse(&self.sub).ok()
    }
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer.
    ///
    /// # Errors
    /// Returns a configuration error if the secret is shorter than
    /// [`CoreConfig::MIN_SECRET_LENGTH`] bytes or the lifetime is zero.
    pub fn new(secret: impl AsRef<[u8]>, lifetime: Duration) -> Result<Self, CoreError> {
        let secret = secret.as_ref();
        if secret.len() < CoreConfig::MIN_SECRET_LENGTH {
            return Err(CoreError::Configuration(format!(
                "token secret must be at least {} bytes",
                CoreConfig::MIN_SECRET_LENGTH
            )));
        }
        let lifetime_secs = i64::try_from(lifetime.as_secs())
            .map_err(|_| CoreError::Configuration("token lifetime too large".to_string()))?;
        if lifetime_secs == 0 {
            return Err(CoreError::Configuration(
                "token lifetime must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime_secs,
            clock: Arc::new(SystemClock),
        })
    }

    /// Create an issuer from core config
    pub fn from_config(config: &CoreConfig) -> Result<Self, CoreError> {
        Self::new(&config.token_secret, config.token_lifetime)
    }

    /// Use a different clock for issuance and expiry checks
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sign a token for a principal
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, CoreError> {
        let iat = self.clock.now().timestamp();
        let exp = iat + self.lifetime_secs;
        let claims = TokenClaims {
            sub: principal.id.to_string(),
            email: principal.email.clone(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(
            |e| {
                tracing::error!("Failed to sign token: {}", e);
                CoreError::Internal("failed to sign token".to_string())
            },
        )?;

        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| CoreError::Internal("token expiry out of range".to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, CoreError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock, with no leeway
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                CoreError::Unauthenticated
            })?
            .claims;

        if claims.is_expired_at(self.clock.now()) {
            tracing::debug!(exp = claims.exp, "Token expired");
            return Err(CoreError::Unauthenticated);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}
