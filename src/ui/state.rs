use crate::common::{NetworkCommand, Theme, ValidationError};
use crate::session::Route;

/// Contents and status of the login form.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    /// Builds the login command, or records why the form cannot be sent.
    pub fn submit(&mut self, expires_in_mins: u32) -> Option<NetworkCommand> {
        if self.submitting {
            return None;
        }
        self.error = None;

        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            self.error = Some(ValidationError::MissingCredentials.to_string());
            return None;
        }

        self.submitting = true;
        Some(NetworkCommand::Login {
            username: self.username.clone(),
            password: self.password.clone(),
            expires_in_mins: Some(expires_in_mins),
        })
    }

    pub fn succeeded(&mut self) {
        self.submitting = false;
        self.password.clear();
        self.error = None;
    }

    pub fn failed(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }
}

/// View-local state that is not owned by a core component.
pub struct AppState {
    pub route: Route,
    pub login: LoginForm,
    pub chat_open: bool,
    pub chat_input: String,
    /// Why the last send did not go out; the draft stays in `chat_input`.
    pub chat_error: Option<String>,
    pub theme: Theme,
}

impl AppState {
    pub fn new(route: Route, theme: Theme) -> Self {
        Self {
            route,
            login: LoginForm::default(),
            chat_open: false,
            chat_input: String::new(),
            chat_error: None,
            theme,
        }
    }

    /// Hides the chat panel and forgets its draft.
    pub fn close_chat(&mut self) {
        self.chat_open = false;
        self.chat_input.clear();
        self.chat_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_block_submission() {
        let mut form = LoginForm {
            username: "alice".into(),
            ..LoginForm::default()
        };
        assert!(form.submit(30).is_none());
        assert_eq!(
            form.error.as_deref(),
            Some("Please enter both username and password.")
        );
        assert!(!form.submitting);
    }

    #[test]
    fn submission_is_single_flight() {
        let mut form = LoginForm {
            username: " alice ".into(),
            password: "secret".into(),
            ..LoginForm::default()
        };
        match form.submit(30) {
            Some(NetworkCommand::Login {
                username,
                expires_in_mins,
                ..
            }) => {
                assert_eq!(username, " alice ");
                assert_eq!(expires_in_mins, Some(30));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(form.submit(30).is_none());

        form.failed("Invalid credentials".into());
        assert!(!form.submitting);
        assert_eq!(form.error.as_deref(), Some("Invalid credentials"));
        assert!(form.submit(30).is_some());
    }

    #[test]
    fn closing_the_chat_discards_draft_and_error() {
        let mut state = AppState::new(Route::Home, Theme::Light);
        state.chat_open = true;
        state.chat_input = "hello".into();
        state.chat_error = Some("channel is not connected (state: connecting)".into());

        state.close_chat();
        assert!(!state.chat_open);
        assert!(state.chat_input.is_empty());
        assert_eq!(state.chat_error, None);
    }
}
