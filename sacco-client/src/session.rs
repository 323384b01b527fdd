//! Auth gate
//!
//! [`SessionHandle`] is the one authoritative answer to "who is logged in".
//! It is cheap to clone and every view-model holds the same handle, so a 401
//! seen anywhere logs the whole client out.

use std::sync::Arc;

use parking_lot::RwLock;
use shared::client::LoginRequest;
use shared::models::User;
use shared::permissions::{Capability, has_permission};

use crate::backend::Backend;
use crate::{ClientError, ClientResult};

pub const EMPTY_CREDENTIALS_MESSAGE: &str = "Please enter both username and password";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Session as the client currently knows it
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// `/auth/me` has not answered yet
    Checking,
    Anonymous,
    Authenticated(User),
}

/// What a protected view may render
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    /// Still checking; render nothing protected
    Pending,
    /// Render the blocking "access denied" state and send the visitor to login
    Denied,
    Granted(User),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

#[derive(Debug, Clone)]
pub struct SessionHandle {
    state: Arc<RwLock<AuthState>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(AuthState::Checking)),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn user(&self) -> Option<User> {
        match &*self.state.read() {
            AuthState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.read(), AuthState::Authenticated(_))
    }

    /// Capability check for the logged-in user; false when anonymous
    pub fn can(&self, capability: Capability) -> bool {
        match &*self.state.read() {
            AuthState::Authenticated(user) => has_permission(user.role, capability),
            _ => false,
        }
    }

    /// Gate for any authenticated view
    pub fn guard(&self) -> Access {
        match &*self.state.read() {
            AuthState::Checking => Access::Pending,
            AuthState::Anonymous => Access::Denied,
            AuthState::Authenticated(user) => Access::Granted(user.clone()),
        }
    }

    /// Gate for a view that also needs `capability`
    pub fn guard_capability(&self, capability: Capability) -> Access {
        match self.guard() {
            Access::Granted(user) if !has_permission(user.role, capability) => Access::Denied,
            access => access,
        }
    }

    /// Ask the server who we are. Any failure means anonymous, silently.
    pub async fn check<B: Backend + ?Sized>(&self, backend: &B) -> AuthState {
        let next = match backend.me().await {
            Ok(user) => AuthState::Authenticated(user),
            Err(e) => {
                tracing::debug!(error = %e, "No active session");
                AuthState::Anonymous
            }
        };
        *self.state.write() = next.clone();
        next
    }

    /// Blank fields fail locally without a request
    pub async fn login<B: Backend + ?Sized>(
        &self,
        backend: &B,
        username: &str,
        password: &str,
    ) -> ClientResult<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(EMPTY_CREDENTIALS_MESSAGE.to_string()));
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = backend.login(&request).await?;
        tracing::info!(username = %response.user.username, "Logged in");
        *self.state.write() = AuthState::Authenticated(response.user.clone());
        Ok(response.user)
    }

    /// Best-effort server logout; local state is cleared regardless
    pub async fn logout<B: Backend + ?Sized>(&self, backend: &B) {
        if let Err(e) = backend.logout().await {
            tracing::warn!(error = %e, "Logout request failed, clearing session locally");
        }
        self.clear();
    }

    /// Drop the local session, e.g. after a 401
    pub fn clear(&self) {
        *self.state.write() = AuthState::Anonymous;
    }
}

/// Banner text for a failed login
pub fn login_error_message(err: &ClientError) -> String {
    match err {
        ClientError::Validation(message) => message.clone(),
        other => other
            .server_message()
            .unwrap_or(LOGIN_FAILED_MESSAGE)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_messages_prefer_server_text() {
        let err = ClientError::Unauthorized("Invalid username or password".into());
        assert_eq!(login_error_message(&err), "Invalid username or password");
        assert_eq!(
            login_error_message(&ClientError::Network("timeout".into())),
            LOGIN_FAILED_MESSAGE
        );
        assert_eq!(
            login_error_message(&ClientError::Validation(EMPTY_CREDENTIALS_MESSAGE.into())),
            EMPTY_CREDENTIALS_MESSAGE
        );
    }

    #[test]
    fn new_handle_withholds_access_until_checked() {
        let session = SessionHandle::new();
        assert_eq!(session.guard(), Access::Pending);
        assert!(!session.can(Capability::ManageMembers));

        session.clear();
        assert_eq!(session.guard(), Access::Denied);
    }

    #[test]
    fn clones_share_state() {
        let session = SessionHandle::new();
        let other = session.clone();
        other.clear();
        assert_eq!(session.state(), AuthState::Anonymous);
    }
}
