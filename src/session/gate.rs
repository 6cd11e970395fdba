use std::fmt;
use std::str::FromStr;

use super::store::SessionStore;

/// Views the application can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Home => "/home",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Home)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        match id.trim_start_matches('/') {
            "" | "login" => Ok(Route::Login),
            "home" => Ok(Route::Home),
            other => Err(UnknownRoute(other.to_string())),
        }
    }
}

/// Decides whether a route may be entered given the current session.
pub struct NavigationGate<'a> {
    session: &'a SessionStore,
}

impl<'a> NavigationGate<'a> {
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    pub fn can_enter(&self, route: Route) -> bool {
        !route.is_protected() || self.session.is_authenticated()
    }

    /// Unknown route ids are never enterable.
    pub fn can_enter_id(&self, id: &str) -> bool {
        id.parse::<Route>()
            .map(|route| self.can_enter(route))
            .unwrap_or(false)
    }

    /// The route to actually display: the requested one, or the login entry.
    pub fn resolve(&self, route: Route) -> Route {
        if self.can_enter(route) {
            route
        } else {
            log::debug!("Redirecting {route} to {}", Route::Login);
            Route::Login
        }
    }
}
