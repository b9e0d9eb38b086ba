//! # Session State
//!
//! [`AuthStore`] owns who is signed in. It is created by the dashboard
//! system and handed to the route loaders; nothing reads it through a global.

pub mod loader;

pub use loader::*;

use crate::model::UserProfile;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    /// True until the first loader has resolved the session.
    pub is_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }
}

/// Cloneable handle to the session state.
#[derive(Clone)]
pub struct AuthStore {
    state: watch::Sender<AuthState>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { state }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    /// Records a verified session.
    pub fn sign_in(&self, user: UserProfile) {
        debug!(user_id = %user.id, role = ?user.role, "Session stored");
        self.state.send_replace(AuthState {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        });
    }

    /// Forgets the session. The store is no longer loading afterwards.
    pub fn clear(&self) {
        debug!("Session cleared");
        self.state.send_replace(AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
        });
    }
}
