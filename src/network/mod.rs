pub mod api;
pub mod channel;
pub mod client;
mod transport;

pub use api::ApiClient;
pub use channel::{ChannelEvent, RealtimeChannel, Transcript};
pub use client::NetworkClient;
