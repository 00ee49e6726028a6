use crate::utils::error::Result;
use async_trait::async_trait;

/// Produces converted manifest text from a serialized dashboard model.
///
/// The production implementation instantiates the bundled WASM module per
/// call; tests substitute plain functions.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, model_json: &str) -> Result<String>;
}

/// Source of the conversion module's compiled bytes.
pub trait ModuleSource: Send + Sync {
    fn fetch(&self) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Destination for delivered artifacts.
pub trait ArtifactStore: Send + Sync {
    fn exists(&self, name: &str) -> impl std::future::Future<Output = bool> + Send;
    fn write(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<std::path::PathBuf>> + Send;
}
