use std::future::Future;

use crate::types::UserId;

/// Result of running a handler behind the gate
#[derive(Debug, PartialEq, Eq)]
pub enum Gated<T> {
    Allowed(T),
    Refused,
}

/// Restricts wrapped handlers to the single configured operator.
///
/// Identities are compared as strings. With no operator configured every caller is refused.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    admin_id: Option<String>,
}

impl AdminGate {
    pub fn new(admin_id: Option<String>) -> Self {
        Self {
            admin_id: admin_id.map(|id| id.trim().to_string()),
        }
    }

    pub fn is_admin(&self, caller: UserId) -> bool {
        self.admin_id
            .as_deref()
            .is_some_and(|admin| admin == caller.to_string())
    }

    /// Run `handler` only for the operator; anyone else gets `Gated::Refused`
    pub async fn guard<F, Fut, T>(&self, caller: UserId, handler: F) -> Gated<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if self.is_admin(caller) {
            Gated::Allowed(handler().await)
        } else {
            tracing::warn!("Refused gated command from {}", caller);
            Gated::Refused
        }
    }
}
