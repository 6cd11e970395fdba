//! Client state layer for an authenticated post feed with a realtime chat panel.
//!
//! - [`session`]: durable credential store and the navigation gate built on it.
//! - [`network`]: REST client for login and posts, and the chat WebSocket channel.
//! - [`feed`]: pagination controller merging pages into a deduplicated feed.
//! - [`workspace`]: the home view's session, feed and chat, independent of egui.
//! - [`ui`]: the egui desktop shell wiring these together.

pub mod common;
pub mod config;
pub mod feed;
pub mod network;
pub mod session;
pub mod storage;
pub mod ui;
pub mod workspace;
