//! Route guards: decide whether a protected view may render.

use crate::config::RouteConfig;
use crate::navigation::Navigator;
use crate::session::{Role, SessionState, SessionStore};

/// Outcome of evaluating a guard against a session snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not settled yet; show a neutral placeholder, do not redirect.
    Pending,
    Redirect(String),
    Allow,
}

/// What a guarded render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<V> {
    Placeholder,
    Redirected(String),
    Rendered(V),
}

impl<V> Guarded<V> {
    pub fn rendered(self) -> Option<V> {
        match self {
            Self::Rendered(view) => Some(view),
            _ => None,
        }
    }
}

pub trait RouteGuard {
    fn decide(&self, state: &SessionState) -> GuardDecision;

    /// Evaluate against the store, navigate on redirect, and build the view
    /// only when allowed.
    fn render<V>(
        &self,
        store: &SessionStore,
        navigator: &dyn Navigator,
        view: impl FnOnce() -> V,
    ) -> Guarded<V> {
        match self.decide(&store.get()) {
            GuardDecision::Pending => Guarded::Placeholder,
            GuardDecision::Redirect(path) => {
                navigator.navigate(&path);
                Guarded::Redirected(path)
            }
            GuardDecision::Allow => Guarded::Rendered(view()),
        }
    }
}

/// Lets through authenticated accounts with a verified email.
#[derive(Debug, Clone)]
pub struct RequireAuthenticated {
    routes: RouteConfig,
}

impl RequireAuthenticated {
    pub fn new(routes: RouteConfig) -> Self {
        Self { routes }
    }
}

impl RouteGuard for RequireAuthenticated {
    fn decide(&self, state: &SessionState) -> GuardDecision {
        if state.loading {
            GuardDecision::Pending
        } else if !state.authenticated {
            GuardDecision::Redirect(self.routes.login.clone())
        } else if !state.login_flow_completed {
            // mid-login: role and verification are not known yet
            GuardDecision::Pending
        } else if !state.email_verified {
            GuardDecision::Redirect(self.routes.verify_email.clone())
        } else {
            GuardDecision::Allow
        }
    }
}

/// [`RequireAuthenticated`] plus an exact role match. Any other role, or
/// none, is sent to login.
#[derive(Debug, Clone)]
pub struct RequireRole {
    role: Role,
    authenticated: RequireAuthenticated,
}

impl RequireRole {
    pub fn new(role: Role, routes: RouteConfig) -> Self {
        Self {
            role,
            authenticated: RequireAuthenticated::new(routes),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl RouteGuard for RequireRole {
    fn decide(&self, state: &SessionState) -> GuardDecision {
        match self.authenticated.decide(state) {
            GuardDecision::Allow if state.role != Some(self.role) => {
                GuardDecision::Redirect(self.authenticated.routes.login.clone())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::HistoryNavigator;

    fn settled(role: Option<Role>, email_verified: bool) -> SessionState {
        SessionState {
            authenticated: true,
            email_verified,
            role,
            loading: false,
            login_flow_completed: true,
        }
    }

    fn anonymous() -> SessionState {
        SessionState {
            loading: false,
            ..SessionState::default()
        }
    }

    #[test]
    fn loading_never_redirects() {
        let guard = RequireRole::new(Role::SystemAdmin, RouteConfig::default());
        let state = SessionState::default();
        assert_eq!(guard.decide(&state), GuardDecision::Pending);
        assert_eq!(
            RequireAuthenticated::new(RouteConfig::default()).decide(&state),
            GuardDecision::Pending
        );
    }

    #[test]
    fn anonymous_goes_to_login() {
        let guard = RequireAuthenticated::new(RouteConfig::default());
        assert_eq!(
            guard.decide(&anonymous()),
            GuardDecision::Redirect("/login".to_string())
        );
    }

    #[test]
    fn unverified_goes_to_verify_email() {
        let guard = RequireAuthenticated::new(RouteConfig::default());
        assert_eq!(
            guard.decide(&settled(Some(Role::User), false)),
            GuardDecision::Redirect("/verify-email".to_string())
        );
    }

    #[test]
    fn mid_login_waits() {
        let guard = RequireAuthenticated::new(RouteConfig::default());
        let mut state = settled(None, false);
        state.login_flow_completed = false;
        assert_eq!(guard.decide(&state), GuardDecision::Pending);
    }

    #[test]
    fn verified_account_is_allowed() {
        let guard = RequireAuthenticated::new(RouteConfig::default());
        assert_eq!(
            guard.decide(&settled(Some(Role::User), true)),
            GuardDecision::Allow
        );
    }

    #[test]
    fn role_guard_fails_closed() {
        let guard = RequireRole::new(Role::SystemAdmin, RouteConfig::default());
        let login = GuardDecision::Redirect("/login".to_string());

        assert_eq!(guard.decide(&settled(Some(Role::Admin), true)), login);
        assert_eq!(guard.decide(&settled(None, true)), login);
        assert_eq!(guard.decide(&anonymous()), login);
        assert_eq!(
            guard.decide(&settled(Some(Role::SystemAdmin), true)),
            GuardDecision::Allow
        );
    }

    #[test]
    fn render_navigates_on_redirect_and_builds_view_on_allow() {
        let store = SessionStore::new();
        let navigator = HistoryNavigator::new("/admin");
        let guard = RequireRole::new(Role::SystemAdmin, RouteConfig::default());

        assert_eq!(
            guard.render(&store, &navigator, || "admin page"),
            Guarded::Placeholder
        );

        store.set_loading(false);
        assert_eq!(
            guard.render(&store, &navigator, || "admin page"),
            Guarded::Redirected("/login".to_string())
        );
        assert_eq!(navigator.current_path(), "/login");

        store.set_authenticated(true);
        store.set_role(Some(Role::SystemAdmin));
        store.set_email_verified(true);
        store.set_login_flow_completed(true);
        let rendered = guard.render(&store, &navigator, || "admin page");
        assert_eq!(rendered.rendered(), Some("admin page"));
    }
}
