pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use config::{ApiCredential, AppConfig};
pub use crate::core::{ApiLayerVerifier, DispatchMode, EmailVerifier, Orchestrator};
pub use server::{router, AppState};
pub use utils::error::{MailprobeError, Result};
