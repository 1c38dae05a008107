//! Client route table and auth guard

use crate::models::SessionState;

/// Client-side pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    NewLibrary,
    BookIndex,
    NewBook,
}

impl Route {
    /// Map a client path to a page
    pub fn parse(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" | "/" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/library/new" => Some(Route::NewLibrary),
            "/books" => Some(Route::BookIndex),
            "/books/new" => Some(Route::NewBook),
            _ => None,
        }
    }

    /// Everything except the login and signup pages requires a session
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login | Route::Signup)
    }
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Page(Route),
    RedirectToLogin,
    NotFound,
}

/// Resolve a path against the current session state.
///
/// The auth check reads the state passed in at navigation time, never a
/// cached flag, so a logout elsewhere in the UI takes effect on the very
/// next navigation.
pub fn resolve(path: &str, state: &SessionState) -> Resolution {
    match Route::parse(path) {
        None => Resolution::NotFound,
        Some(route) if route.requires_auth() && !state.is_authenticated() => {
            Resolution::RedirectToLogin
        }
        Some(route) => Resolution::Page(route),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn logged_in() -> SessionState {
        SessionState {
            user: Some(User {
                id: 1,
                username: "reader".to_string(),
                email: None,
            }),
            libraries: vec![],
            books: vec![],
        }
    }

    #[test]
    fn protected_routes_redirect_when_anonymous() {
        let state = SessionState::anonymous();
        for path in ["/", "/library/new", "/books", "/books/new"] {
            assert_eq!(resolve(path, &state), Resolution::RedirectToLogin, "{}", path);
        }
    }

    #[test]
    fn login_and_signup_stay_reachable_when_anonymous() {
        let state = SessionState::anonymous();
        assert_eq!(resolve("/login", &state), Resolution::Page(Route::Login));
        assert_eq!(resolve("/signup", &state), Resolution::Page(Route::Signup));
    }

    #[test]
    fn protected_routes_resolve_when_logged_in() {
        let state = logged_in();
        assert_eq!(resolve("/", &state), Resolution::Page(Route::Home));
        assert_eq!(resolve("/books", &state), Resolution::Page(Route::BookIndex));
    }

    #[test]
    fn guard_reflects_logout_on_next_navigation() {
        let state = logged_in();
        assert_eq!(resolve("/books", &state), Resolution::Page(Route::BookIndex));
        let state = state.logged_out();
        assert_eq!(resolve("/books", &state), Resolution::RedirectToLogin);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(resolve("/profile", &logged_in()), Resolution::NotFound);
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        assert_eq!(resolve("/books/", &logged_in()), Resolution::Page(Route::BookIndex));
    }
}
