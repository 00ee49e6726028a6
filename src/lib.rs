pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::CliConfig;
pub use core::bridge::MessageBridge;
pub use core::delivery::{DeliveryManager, LocalStore};
pub use core::loader::{BundledModule, ModuleHandle, WasmConverter};
pub use core::observer::Page;
pub use core::session::ExportSession;
pub use core::trigger::ExportTrigger;
pub use utils::error::{ExportError, Result};
