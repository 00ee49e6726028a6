use crate::domain::ports::{Converter, ModuleSource};
use crate::utils::error::{ExportError, Result};
use async_trait::async_trait;
use extism::{Manifest, PluginBuilder, Wasm};
use std::path::PathBuf;

/// Guest export performing the dashboard-to-manifest conversion.
pub const CONVERT_EXPORT: &str = "dashboard_to_dark";

/// Reads the conversion module from its fixed bundled path on disk.
#[derive(Debug, Clone)]
pub struct BundledModule {
    path: PathBuf,
}

impl BundledModule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModuleSource for BundledModule {
    async fn fetch(&self) -> Result<Vec<u8>> {
        tracing::debug!(path = %self.path.display(), "fetching conversion module");
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// One running instance of the conversion module.
///
/// Instantiation verifies that the conversion export is actually reachable,
/// so "module is running" and "conversion function exists" fail separately.
pub struct ModuleHandle {
    plugin: extism::Plugin,
}

impl ModuleHandle {
    pub fn instantiate(wasm_bytes: Vec<u8>) -> Result<Self> {
        let manifest = Manifest::new([Wasm::data(wasm_bytes)]);
        let plugin = PluginBuilder::new(manifest)
            .with_wasi(true)
            .build()
            .map_err(|e| ExportError::ModuleError {
                message: format!("instantiation failed: {e}"),
            })?;

        if !plugin.function_exists(CONVERT_EXPORT) {
            return Err(ExportError::MissingModuleExport {
                export: CONVERT_EXPORT,
            });
        }

        Ok(Self { plugin })
    }

    pub fn convert(&mut self, model_json: &str) -> Result<String> {
        self.plugin
            .call::<&str, String>(CONVERT_EXPORT, model_json)
            .map_err(|e| ExportError::ModuleError {
                message: format!("{CONVERT_EXPORT} call failed: {e}"),
            })
    }
}

/// [`Converter`] backed by the bundled WASM module.
///
/// Every conversion performs a full fetch-and-instantiate cycle; no module
/// instance survives across calls, so nothing leaks between conversions.
pub struct WasmConverter<M: ModuleSource> {
    source: M,
}

impl<M: ModuleSource> WasmConverter<M> {
    pub fn new(source: M) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<M: ModuleSource> Converter for WasmConverter<M> {
    async fn convert(&self, model_json: &str) -> Result<String> {
        let wasm_bytes = self.source.fetch().await?;
        let mut handle = ModuleHandle::instantiate(wasm_bytes)?;
        handle.convert(model_json)
    }
}
