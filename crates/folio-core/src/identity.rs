//! Identity store - registration and credential checks for principals

use std::sync::Arc;

use folio_db::{CreatePrincipal, PrincipalRepository, PrincipalRow};
use folio_types::{Principal, PrincipalId, ValidationError};
use uuid::Uuid;

use crate::crypto::CredentialHasher;
use crate::CoreError;

/// Minimum secret length accepted at registration
pub const MIN_SECRET_CHARS: usize = 6;

/// Durable registry of principals
pub struct IdentityStore<P: PrincipalRepository + ?Sized> {
    repo: Arc<P>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<P: PrincipalRepository + ?Sized> Clone for IdentityStore<P> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<P: PrincipalRepository + ?Sized> IdentityStore<P> {
    pub fn new(repo: Arc<P>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Register a new principal.
    ///
    /// The secret is hashed before it reaches the repository.
    pub async fn register(
        &self,
        identity_key: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Principal, CoreError> {
        let identity_key = identity_key.trim();
        let display_name = display_name.trim();
        validate_registration(identity_key, secret, display_name)?;

        if self.repo.find_by_email(identity_key).await?.is_some() {
            tracing::debug!(identity_key, "Identity key already registered");
            return Err(CoreError::Conflict);
        }

        let password_hash = self.hash(secret).await?;

        // A concurrent registration can still win the race; the unique
        // constraint turns that into Conflict.
        let row = self
            .repo
            .create(CreatePrincipal {
                id: Uuid::new_v4(),
                email: identity_key.to_string(),
                password_hash,
                name: display_name.to_string(),
            })
            .await?;

        tracing::info!(principal_id = %row.id, "Registered principal");
        Ok(row.into_principal())
    }

    /// Look up a principal by identity key
    pub async fn find_by_identity_key(
        &self,
        identity_key: &str,
    ) -> Result<Option<Principal>, CoreError> {
        Ok(self
            .repo
            .find_by_email(identity_key.trim())
            .await?
            .map(PrincipalRow::into_principal))
    }

    /// Look up a principal by ID
    pub async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, CoreError> {
        Ok(self
            .repo
            .find_by_id(id.0)
            .await?
            .map(PrincipalRow::into_principal))
    }

    /// Check an identity key and secret pair.
    ///
    /// An unknown key and a wrong secret fail the same way.
    pub async fn verify_credentials(
        &self,
        identity_key: &str,
        secret: &str,
    ) -> Result<Principal, CoreError> {
        let Some(row) = self.repo.find_by_email(identity_key.trim()).await? else {
            tracing::debug!("Login for unknown identity key");
            return Err(CoreError::Unauthenticated);
        };

        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_owned();
        let hash = row.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&secret, &hash))
            .await
            .map_err(|e| CoreError::Internal(format!("hash task failed: {e}")))??;

        if !matches {
            tracing::debug!(principal_id = %row.id, "Login with wrong secret");
            return Err(CoreError::Unauthenticated);
        }

        Ok(row.into_principal())
    }

    async fn hash(&self, secret: &str) -> Result<String, CoreError> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| CoreError::Internal(format!("hash task failed: {e}")))?
    }
}

fn validate_registration(
    identity_key: &str,
    secret: &str,
    display_name: &str,
) -> Result<(), ValidationError> {
    if !is_email_shaped(identity_key) {
        return Err(ValidationError::new("email must be a valid email address"));
    }
    if secret.chars().count() < MIN_SECRET_CHARS {
        return Err(ValidationError::new(format!(
            "password must be at least {MIN_SECRET_CHARS} characters"
        )));
    }
    if display_name.is_empty() {
        return Err(ValidationError::new("name must not be empty"));
    }
    Ok(())
}

/// `local@domain.tld`, no whitespace, exactly one `@`
fn is_email_shaped(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
