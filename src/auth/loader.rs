//! Route loaders: the gate every page passes before it renders.

use super::AuthStore;
use crate::api::AdminApi;
use crate::model::UserProfile;
use tracing::{info, instrument, warn};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// What the router should do after a loader ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderOutcome {
    Proceed,
    Redirect(String),
}

impl LoaderOutcome {
    fn redirect(to: impl Into<String>) -> Self {
        LoaderOutcome::Redirect(to.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    /// Pages for signed-out visitors (the login page).
    Public,
    /// Dashboard pages.
    Authenticated,
}

pub fn route_group(path: &str) -> RouteGroup {
    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    if path.trim_end_matches('/') == LOGIN_PATH {
        RouteGroup::Public
    } else {
        RouteGroup::Authenticated
    }
}

/// Why a profile may not use the dashboard, as the login page's `error` value.
fn denial(user: &UserProfile) -> Option<&'static str> {
    if user.is_banned() {
        Some("banned")
    } else if !user.role.has_admin_access() || !user.is_active() {
        Some("unauthorized")
    } else {
        None
    }
}

async fn end_session(api: &dyn AdminApi, store: &AuthStore) {
    if let Err(e) = api.logout().await {
        warn!(error = %e, "Logout failed");
    }
    store.clear();
}

/// Gate for dashboard pages.
///
/// The profile is fetched on every call, so a ban or a role change takes
/// effect on the next navigation even when the store already holds a user.
#[instrument(skip_all)]
pub async fn auth_loader(api: &dyn AdminApi, store: &AuthStore) -> LoaderOutcome {
    match api.profile().await {
        Ok(user) => match denial(&user) {
            Some(reason) => {
                warn!(user_id = %user.id, reason, "Access denied");
                end_session(api, store).await;
                LoaderOutcome::redirect(format!("{LOGIN_PATH}?error={reason}"))
            }
            None => {
                store.sign_in(user);
                LoaderOutcome::Proceed
            }
        },
        Err(e) => {
            warn!(error = %e, "Profile fetch failed");
            store.clear();
            LoaderOutcome::redirect(LOGIN_PATH)
        }
    }
}

/// Gate for the login page: a live session is sent home.
#[instrument(skip_all)]
pub async fn non_auth_loader(api: &dyn AdminApi, store: &AuthStore) -> LoaderOutcome {
    let state = store.state();
    if state.is_authenticated && !state.is_loading {
        return LoaderOutcome::redirect(HOME_PATH);
    }

    match api.profile().await {
        Ok(user) => match denial(&user) {
            Some(reason) => {
                info!(user_id = %user.id, reason, "Session may not use the dashboard");
                end_session(api, store).await;
                LoaderOutcome::Proceed
            }
            None => {
                store.sign_in(user);
                LoaderOutcome::redirect(HOME_PATH)
            }
        },
        Err(e) => {
            info!(error = %e, "No session");
            store.clear();
            LoaderOutcome::Proceed
        }
    }
}

/// Runs the loader of the group `path` belongs to.
pub async fn run_loader(path: &str, api: &dyn AdminApi, store: &AuthStore) -> LoaderOutcome {
    match route_group(path) {
        RouteGroup::Public => non_auth_loader(api, store).await,
        RouteGroup::Authenticated => auth_loader(api, store).await,
    }
}
