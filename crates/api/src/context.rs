use partsdesk_auth::Role;
use partsdesk_core::UserId;

/// Authenticated actor for a request, derived from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    user_id: UserId,
    roles: Vec<Role>,
}

impl ActorContext {
    pub fn new(user_id: UserId, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == name)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}
