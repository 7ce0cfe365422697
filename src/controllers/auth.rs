//! Auth screen controller
//!
//! Combined login/registration form: a mode toggle, the field values, and
//! the error banner. Submission delegates to the session store and reports
//! where a successful exchange should navigate.

use std::sync::Arc;

use crate::services::SessionStore;

/// Which form the auth screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Where to navigate after a successful exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Public listing, after login
    Home,
    /// Management screen, after registration
    Admin,
}

/// View state for the auth screen
pub struct AuthFlowController {
    session: Arc<SessionStore>,
    mode: AuthMode,
    pub name: String,
    pub email: String,
    pub password: String,
    error: Option<String>,
}

impl AuthFlowController {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            mode: AuthMode::Login,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            error: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switch between login and registration, dropping any stale error.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.error = None;
    }

    /// Submit the active form. Returns the navigation target on success;
    /// on failure the error banner is set and `None` returned.
    pub async fn submit(&mut self) -> Option<Destination> {
        let outcome = match self.mode {
            AuthMode::Login => self.session.login(&self.email, &self.password).await,
            AuthMode::Register => {
                self.session
                    .register(&self.name, &self.email, &self.password)
                    .await
            }
        };
        if outcome.success {
            self.error = None;
            Some(match self.mode {
                AuthMode::Login => Destination::Home,
                AuthMode::Register => Destination::Admin,
            })
        } else {
            self.error = Some(outcome.message);
            None
        }
    }
}
