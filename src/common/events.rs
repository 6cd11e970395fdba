use super::types::Credential;

/// Results the network worker reports back to the UI.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    LoggedIn(Credential),
    /// User-visible failure text.
    LoginFailed(String),
}
