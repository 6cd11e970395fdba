pub mod gate;
pub mod store;

pub use gate::{NavigationGate, Route};
pub use store::SessionStore;
