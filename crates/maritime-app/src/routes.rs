//! Route resolution for the dashboard shell.
//!
//! `/` serves the operation tracker. `/tracker` serves the same view behind
//! the session gate. Anything else redirects home.

use serde::Serialize;

/// Session supplied by the authentication provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    OperationTracker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Render(View),
    Redirect(&'static str),
}

pub const HOME: &str = "/";

const PROTECTED: &[(&str, View)] = &[("/tracker", View::OperationTracker)];

/// Resolve a request path for the given session.
pub fn resolve(path: &str, session: Session) -> Resolution {
    let path = match path.trim_end_matches('/') {
        "" => HOME,
        trimmed => trimmed,
    };

    if path == HOME {
        return Resolution::Render(View::OperationTracker);
    }

    match PROTECTED.iter().find(|(route, _)| *route == path) {
        Some(&(_, view)) if session.authenticated => Resolution::Render(view),
        _ => Resolution::Redirect(HOME),
    }
}
