pub mod api;
pub mod commands;
pub mod error;
pub mod node;
pub mod poller;
pub mod session;

pub use api::*;
pub use commands::*;
pub use error::*;
pub use node::*;
pub use poller::*;
pub use session::*;
