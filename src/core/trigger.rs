use crate::core::bridge::MessageBridge;
use crate::domain::model::{ConversionResponse, DashboardLookup};
use crate::utils::error::{ExportError, Result};
use reqwest::Client;
use url::Url;

/// Dashboard UID from a Grafana dashboard URL: the second path segment of
/// `/d/<uid>/<slug>`. Absent for shorter paths.
pub fn dashboard_uid(page_url: &Url) -> Option<&str> {
    page_url
        .path_segments()
        .and_then(|mut segments| segments.nth(1))
        .filter(|uid| !uid.is_empty())
}

/// Fetches the dashboard model behind a page URL and submits it for
/// conversion through the bridge.
pub struct ExportTrigger {
    client: Client,
    bridge: MessageBridge,
}

impl ExportTrigger {
    pub fn new(bridge: MessageBridge) -> Self {
        Self {
            client: Client::new(),
            bridge,
        }
    }

    /// Run one export for the dashboard behind `page_url`.
    ///
    /// Fails before anything reaches the bridge when the UID cannot be
    /// derived or the model fetch does not produce a dashboard.
    pub async fn export(&self, page_url: &Url) -> Result<ConversionResponse> {
        let uid = dashboard_uid(page_url).ok_or_else(|| ExportError::MissingDashboardUid {
            url: page_url.to_string(),
        })?;

        tracing::debug!(uid, "exporting dashboard");
        let model = self.fetch_model(page_url, uid).await?;

        self.bridge.request(serde_json::to_string(&model)?).await
    }

    async fn fetch_model(&self, page_url: &Url, uid: &str) -> Result<serde_json::Value> {
        let endpoint = format!(
            "{}/api/dashboards/uid/{}",
            page_url.origin().ascii_serialization(),
            uid
        );

        tracing::debug!(%endpoint, "fetching dashboard model");
        let lookup: DashboardLookup = self
            .client
            .get(&endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        lookup.dashboard.ok_or(ExportError::MissingDashboardField)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid_of(url: &str) -> Option<String> {
        let url = Url::parse(url).unwrap();
        dashboard_uid(&url).map(str::to_string)
    }

    #[test]
    fn test_uid_is_second_path_segment() {
        assert_eq!(
            uid_of("https://grafana.example.com/d/abc123/my-dashboard"),
            Some("abc123".to_string())
        );
        assert_eq!(
            uid_of("https://grafana.example.com/d/xyz-9/slug?orgId=1"),
            Some("xyz-9".to_string())
        );
    }

    #[test]
    fn test_uid_absent_for_short_paths() {
        assert_eq!(uid_of("https://grafana.example.com/"), None);
        assert_eq!(uid_of("https://grafana.example.com/d"), None);
        assert_eq!(uid_of("https://grafana.example.com/d/"), None);
    }
}
