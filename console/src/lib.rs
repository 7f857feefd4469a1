//! Client side of PromptHub: a typed backend client, the per-dialog registry
//! cache, cancelable task polling and the debug session driving chat and api
//! previews of a prompt.

pub mod api;
pub mod cli;
pub mod dialog;
pub mod error;
pub mod polling;
pub mod registry;
pub mod session;

pub use api::ApiClient;
pub use dialog::DebugDialog;
pub use error::{ConsoleError, Result};
