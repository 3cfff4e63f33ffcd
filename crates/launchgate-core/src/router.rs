//! Page router collaborator.
//!
//! The gate mounts this once unlocked. Resolution is pure: given a route,
//! the persisted reveal state, and an authentication check, it names the
//! view a renderer should mount. The router neither implements nor
//! validates authentication; it only withholds the admin view until the
//! supplied check says "authenticated".

use serde::{Deserialize, Serialize};

use crate::reveal::RevealState;

/// Externally supplied authentication check for the admin view.
pub trait AuthCheck {
    fn is_authenticated(&self) -> bool;
}

/// Fixed-answer check, for tests and headless tooling.
#[derive(Debug, Clone, Copy)]
pub struct StaticAuth(pub bool);

impl AuthCheck for StaticAuth {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

/// Named routes of the live site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    Register,
    Login,
    Admin,
}

impl Route {
    /// Parse a URL path. Trailing slashes are tolerated.
    pub fn parse(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" | "/" => Some(Route::Home),
            "/register" => Some(Route::Register),
            "/login" => Some(Route::Login),
            "/admin" => Some(Route::Admin),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Register => "/register",
            Route::Login => "/login",
            Route::Admin => "/admin",
        }
    }
}

/// Marketing sections of the landing page, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    About,
    Events,
    Schedule,
    Gallery,
    Faq,
    Contact,
}

impl Section {
    pub const LANDING_ORDER: [Section; 7] = [
        Section::Hero,
        Section::About,
        Section::Events,
        Section::Schedule,
        Section::Gallery,
        Section::Faq,
        Section::Contact,
    ];
}

/// What a renderer should mount for a resolved route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Landing { sections: Vec<Section> },
    RegistrationForm,
    RegistrationClosed,
    Login,
    Admin,
    Redirect { to: Route },
}

/// Stateless route resolution over the reveal state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRouter;

impl PageRouter {
    pub fn resolve(route: Route, state: RevealState, auth: &dyn AuthCheck) -> View {
        match route {
            Route::Home => View::Landing {
                sections: Section::LANDING_ORDER.to_vec(),
            },
            Route::Register => {
                if state.registration_open {
                    View::RegistrationForm
                } else {
                    View::RegistrationClosed
                }
            }
            Route::Login => View::Login,
            Route::Admin => {
                if auth.is_authenticated() {
                    View::Admin
                } else {
                    View::Redirect { to: Route::Login }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live() -> RevealState {
        RevealState {
            revealed: true,
            registration_open: true,
        }
    }

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse(""), Some(Route::Home));
        assert_eq!(Route::parse("/register"), Some(Route::Register));
        assert_eq!(Route::parse("/register/"), Some(Route::Register));
        assert_eq!(Route::parse("/admin"), Some(Route::Admin));
        assert_eq!(Route::parse("/unknown"), None);
    }

    #[test]
    fn home_mounts_all_sections_in_order() {
        let view = PageRouter::resolve(Route::Home, live(), &StaticAuth(false));
        match view {
            View::Landing { sections } => {
                assert_eq!(sections, Section::LANDING_ORDER.to_vec());
                assert_eq!(sections[0], Section::Hero);
            }
            other => panic!("expected Landing, got {other:?}"),
        }
    }

    #[test]
    fn register_is_gated_by_registration_flag() {
        let open = PageRouter::resolve(Route::Register, live(), &StaticAuth(false));
        assert_eq!(open, View::RegistrationForm);

        let closed_state = RevealState {
            revealed: true,
            registration_open: false,
        };
        let closed = PageRouter::resolve(Route::Register, closed_state, &StaticAuth(false));
        assert_eq!(closed, View::RegistrationClosed);
    }

    #[test]
    fn admin_redirects_unauthenticated_to_login() {
        let denied = PageRouter::resolve(Route::Admin, live(), &StaticAuth(false));
        assert_eq!(denied, View::Redirect { to: Route::Login });

        let granted = PageRouter::resolve(Route::Admin, live(), &StaticAuth(true));
        assert_eq!(granted, View::Admin);
    }
}
