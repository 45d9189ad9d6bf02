//! Port exposing the signed-in user, if any.
//!
//! Authentication itself happens elsewhere; the core only asks who is
//! signed in right now.

use std::sync::{PoisonError, RwLock};

use crate::domain::UserId;

/// Capability answering "who is the current user".
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    /// Identifier of the signed-in user, or `None` for anonymous access.
    fn current_user(&self) -> Option<UserId>;
}

/// Session-scoped identity updated by the hosting sign-in flow.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    user: RwLock<Option<UserId>>,
}

impl SessionIdentity {
    /// Start without a signed-in user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Start with `user_id` signed in.
    pub fn signed_in(user_id: UserId) -> Self {
        Self {
            user: RwLock::new(Some(user_id)),
        }
    }

    /// Record a successful sign-in.
    pub fn sign_in(&self, user_id: UserId) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id);
    }

    /// Forget the signed-in user.
    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
