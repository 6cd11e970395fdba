/// Requests the UI sends down to the network worker.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Raw form input; the worker validates and trims before sending.
    Login {
        username: String,
        password: String,
        expires_in_mins: Option<u32>,
    },
}
