//! Authorization gate
//!
//! Resolves a bearer token to a live principal and checks article ownership.
//! Every protected call walks the same states:
//!
//! ```text
//! NoToken          -> Unauthenticated
//! TokenPresent     -> Verify
//! VerifyFailed     -> Unauthenticated
//! VerifyOk         -> ResolvePrincipal
//! PrincipalMissing -> Unauthenticated
//! PrincipalFound   -> Authorized(AuthContext)
//! ```

use folio_db::PrincipalRepository;
use folio_types::{Principal, PrincipalId};

use crate::identity::IdentityStore;
use crate::token::TokenIssuer;
use crate::CoreError;

/// The authenticated caller, passed explicitly into mutating calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub principal_id: PrincipalId,
    pub email: String,
    pub name: String,
}

impl From<Principal> for AuthContext {
    fn from(principal: Principal) -> Self {
        Self {
            principal_id: principal.id,
            email: principal.email,
            name: principal.name,
        }
    }
}

/// Fail with [`CoreError::Forbidden`] unless `ctx` is `owner_id`
pub fn ensure_owner(ctx: &AuthContext, owner_id: PrincipalId) -> Result<(), CoreError> {
    if ctx.principal_id == owner_id {
        Ok(())
    } else {
        tracing::debug!(
            caller = %ctx.principal_id,
            owner = %owner_id,
            "Ownership check failed"
        );
        Err(CoreError::Forbidden)
    }
}

/// Turns bearer tokens into [`AuthContext`]s
pub struct AuthorizationGate<P: PrincipalRepository + ?Sized> {
    tokens: TokenIssuer,
    identities: IdentityStore<P>,
}

impl<P: PrincipalRepository + ?Sized> Clone for AuthorizationGate<P> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens.clone(),
            identities: self.identities.clone(),
        }
    }
}

impl<P: PrincipalRepository + ?Sized> AuthorizationGate<P> {
    pub fn new(tokens: TokenIssuer, identities: IdentityStore<P>) -> Self {
        Self { tokens, identities }
    }

    /// Authorize a request carrying an optional bearer token.
    ///
    /// The principal is re-resolved on every call, so a token outliving its
    /// principal is rejected.
    pub async fn authorize(&self, bearer: Option<&str>) -> Result<AuthContext, CoreError> {
        let token = match bearer.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(CoreError::Unauthenticated),
        };

        let claims = self.tokens.verify(token)?;
        let principal_id = claims.principal_id().ok_or_else(|| {
            tracing::debug!(sub = %claims.sub, "Token subject is not a principal id");
            CoreError::Unauthenticated
        })?;

        match self.identities.find_by_id(principal_id).await? {
            Some(principal) => Ok(principal.into()),
            None => {
                tracing::debug!(%principal_id, "Token principal no longer exists");
                Err(CoreError::Unauthenticated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(id: PrincipalId) -> AuthContext {
        AuthContext {
            principal_id: id,
            email: "a@x.com".to_string(),
            name: "Ann".to_string(),
        }
    }

    #[test]
    fn test_owner_passes() {
        let id = PrincipalId::new();
        assert!(ensure_owner(&ctx(id), id).is_ok());
    }

    #[test]
    fn test_non_owner_forbidden() {
        let result = ensure_owner(&ctx(PrincipalId::new()), PrincipalId::new());
        assert_eq!(result, Err(CoreError::Forbidden));
    }
}
