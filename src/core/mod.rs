pub mod bridge;
pub mod delivery;
pub mod loader;
pub mod observer;
pub mod session;
pub mod trigger;

pub use crate::domain::model::{ConversionRequest, ConversionResponse, DownloadArtifact};
pub use crate::domain::ports::{ArtifactStore, Converter, ModuleSource};
pub use crate::utils::error::Result;
