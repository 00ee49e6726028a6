use crate::utils::validation::{validate_path, validate_url, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "dark-export")]
#[command(about = "Export a Grafana dashboard as a DARK Kubernetes manifest")]
pub struct CliConfig {
    /// Full URL of the dashboard page, e.g. https://grafana.example.com/d/<uid>/<slug>
    #[arg(long)]
    pub dashboard_url: String,

    /// Path to the bundled conversion module
    #[arg(long, default_value = "./dark.wasm")]
    pub module_path: String,

    /// Directory the exported manifest is written to
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validate_url("dashboard_url", &self.dashboard_url)?;
        validate_path("module_path", &self.module_path)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dashboard_url: &str) -> CliConfig {
        CliConfig {
            dashboard_url: dashboard_url.to_string(),
            module_path: "./dark.wasm".to_string(),
            output_path: "./output".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn test_validate_accepts_dashboard_urls() {
        assert!(config("https://grafana.example.com/d/abc/slug").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls_and_paths() {
        assert!(config("not a url").validate().is_err());

        let mut bad_path = config("https://grafana.example.com/d/abc/slug");
        bad_path.output_path = String::new();
        assert!(bad_path.validate().is_err());
    }
}
