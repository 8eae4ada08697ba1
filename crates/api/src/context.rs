use storefront_auth::{Role, User};
use storefront_core::UserId;

/// Principal context for a request: the authenticated, live user.
///
/// Loaded from storage by the auth middleware on every request, so role and
/// lifecycle changes apply immediately instead of when the token expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user: User,
}

impl PrincipalContext {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}
