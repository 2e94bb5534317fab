//! Route authorization decisions.
//!
//! Pure functions over session state; no I/O and no knowledge of screens.
//! The router maps the decision to an actual render/redirect.

/// What the router should do with a requested screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session state is still settling; render a neutral placeholder
    /// without committing to a screen.
    Placeholder,

    /// No session; send the user to the entry (login) screen.
    RedirectToLogin,

    /// Session present but lacking the required role; send to the
    /// application root.
    RedirectToRoot,

    /// Render the requested screen.
    Render,
}

/// Decide a protected route.
///
/// `has_role` is only consulted when `required_role` is given; routes
/// without a role requirement still demand *some* session.
pub fn resolve_protected(
    loading: bool,
    logged_in: bool,
    has_role: bool,
    required_role: Option<&str>,
) -> RouteDecision {
    if loading {
        return RouteDecision::Placeholder;
    }
    if !logged_in {
        return RouteDecision::RedirectToLogin;
    }
    if required_role.is_some() && !has_role {
        return RouteDecision::RedirectToRoot;
    }
    RouteDecision::Render
}

/// Decide a login/registration route: an already-authenticated user is
/// bounced back to the root instead of re-entering the flow.
pub fn resolve_pre_auth(loading: bool, logged_in: bool) -> RouteDecision {
    if loading {
        return RouteDecision::Placeholder;
    }
    if logged_in {
        return RouteDecision::RedirectToRoot;
    }
    RouteDecision::Render
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_always_renders_placeholder() {
        for logged_in in [false, true] {
            for has_role in [false, true] {
                for required in [None, Some("TEACHER")] {
                    assert_eq!(
                        resolve_protected(true, logged_in, has_role, required),
                        RouteDecision::Placeholder,
                    );
                }
            }
        }
        assert_eq!(resolve_pre_auth(true, true), RouteDecision::Placeholder);
    }

    #[test]
    fn anonymous_user_is_sent_to_login() {
        assert_eq!(
            resolve_protected(false, false, false, Some("TEACHER")),
            RouteDecision::RedirectToLogin,
        );
        // Role-agnostic routes still require a session.
        assert_eq!(
            resolve_protected(false, false, false, None),
            RouteDecision::RedirectToLogin,
        );
    }

    #[test]
    fn wrong_role_is_sent_to_root() {
        assert_eq!(
            resolve_protected(false, true, false, Some("TEACHER")),
            RouteDecision::RedirectToRoot,
        );
    }

    #[test]
    fn matching_role_renders() {
        assert_eq!(
            resolve_protected(false, true, true, Some("TEACHER")),
            RouteDecision::Render,
        );
        assert_eq!(
            resolve_protected(false, true, false, None),
            RouteDecision::Render,
        );
    }

    #[test]
    fn pre_auth_bounces_authenticated_users() {
        assert_eq!(resolve_pre_auth(false, true), RouteDecision::RedirectToRoot);
        assert_eq!(resolve_pre_auth(false, false), RouteDecision::Render);
    }
}
