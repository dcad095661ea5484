// Library root — shared by the server binary, the terminal client and the
// integration tests.

pub mod bootstrap;
pub mod chat;
pub mod core;
pub mod llm;
pub mod reply;

#[cfg(feature = "server")]
pub mod server;

pub use bootstrap::logger;
pub use self::core::{config, error};
