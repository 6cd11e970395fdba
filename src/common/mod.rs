pub mod commands;
pub mod error;
pub mod events;
pub mod types;

pub use commands::NetworkCommand;
pub use error::{
    AuthError, AuthFailure, ChannelError, FetchError, FetchFailure, LoginError, StorageError,
    TransportError, ValidationError,
};
pub use events::NetworkEvent;
pub use types::{ChannelState, ChatMessage, Credential, FeedPage, Origin, Post, PostId, Theme};
