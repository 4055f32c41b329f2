//! Calling identity and the authorization rules built on it.
//!
//! Services never look identity up on their own: every call receives an
//! `Option<&Principal>` that the boundary resolved from the bearer token.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::entities::user::UserRole;
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub role: UserRole,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::Author | UserRole::Reader => false,
        }
    }

    pub fn can_author(&self) -> bool {
        match self.role {
            UserRole::Author | UserRole::Admin => true,
            UserRole::Reader => false,
        }
    }
}

/// Fails with `Unauthenticated` when there is no caller.
pub fn require_principal(identity: Option<&Principal>) -> ServiceResult<&Principal> {
    identity.ok_or_else(ServiceError::unauthenticated)
}

/// Boundary gate for endpoints restricted to AUTHOR and ADMIN.
pub fn require_author(identity: Option<&Principal>) -> ServiceResult<&Principal> {
    let principal = require_principal(identity)?;
    if !principal.can_author() {
        tracing::warn!("User {} ({:?}) tried an author-only action", principal.username, principal.role);
        return Err(ServiceError::forbidden("ACCESS_DENIED", "Only authors and admins can do this"));
    }
    Ok(principal)
}

/// Boundary gate for endpoints restricted to ADMIN.
pub fn require_admin(identity: Option<&Principal>) -> ServiceResult<&Principal> {
    let principal = require_principal(identity)?;
    if !principal.is_admin() {
        tracing::warn!("User {} ({:?}) tried an admin-only action", principal.username, principal.role);
        return Err(ServiceError::forbidden("ACCESS_DENIED", "Only admins can do this"));
    }
    Ok(principal)
}

/// Article rule: the author, or any ADMIN.
pub fn ensure_article_owner(identity: Option<&Principal>, author_username: &str) -> ServiceResult<()> {
    let principal = require_principal(identity)?;
    if principal.is_admin() || principal.username == author_username {
        return Ok(());
    }
    tracing::warn!("User {} denied on article owned by {}", principal.username, author_username);
    Err(ServiceError::forbidden(
        "ACCESS_DENIED",
        "You don't have permission to modify this article",
    ))
}

/// Comment rule: the comment's own author only. ADMIN gets no override here.
pub fn ensure_comment_owner(identity: Option<&Principal>, author_username: &str) -> ServiceResult<()> {
    let principal = require_principal(identity)?;
    if principal.username == author_username {
        return Ok(());
    }
    tracing::warn!("User {} denied on comment owned by {}", principal.username, author_username);
    Err(ServiceError::forbidden(
        "ACCESS_DENIED",
        "You can only modify your own comments",
    ))
}

/// Extractor for the principal the identity middleware attached, if any.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<Principal>);

impl Identity {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Identity(parts.extensions.get::<Principal>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn who(username: &str, role: UserRole) -> Principal {
        Principal { username: username.to_string(), role }
    }

    #[test]
    fn article_owner_and_admin_may_mutate() {
        let alice = who("alice", UserRole::Author);
        let root = who("root", UserRole::Admin);
        assert!(ensure_article_owner(Some(&alice), "alice").is_ok());
        assert!(ensure_article_owner(Some(&root), "alice").is_ok());
    }

    #[test]
    fn other_users_are_forbidden_on_articles() {
        for role in [UserRole::Author, UserRole::Reader] {
            let bob = who("bob", role);
            let err = ensure_article_owner(Some(&bob), "alice").unwrap_err();
            assert!(matches!(err, ServiceError::Forbidden { .. }));
        }
    }

    #[test]
    fn missing_identity_is_unauthenticated_not_forbidden() {
        let err = ensure_article_owner(None, "alice").unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated { .. }));
        let err = ensure_comment_owner(None, "alice").unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated { .. }));
    }

    #[test]
    fn admins_do_not_override_comment_ownership() {
        let root = who("root", UserRole::Admin);
        let err = ensure_comment_owner(Some(&root), "alice").unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { .. }));
        assert!(ensure_comment_owner(Some(&who("alice", UserRole::Reader)), "alice").is_ok());
    }

    #[test]
    fn role_gates() {
        let reader = who("r", UserRole::Reader);
        let author = who("a", UserRole::Author);
        let admin = who("x", UserRole::Admin);

        assert!(require_author(Some(&reader)).is_err());
        assert!(require_author(Some(&author)).is_ok());
        assert!(require_author(Some(&admin)).is_ok());

        assert!(require_admin(Some(&author)).is_err());
        assert!(require_admin(Some(&admin)).is_ok());
        assert!(matches!(require_admin(None), Err(ServiceError::Unauthenticated { .. })));
    }
}
