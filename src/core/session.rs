use crate::core::observer::Page;
use crate::core::trigger::ExportTrigger;
use crate::domain::model::{Control, ControlAction, ConversionResponse, Element};
use crate::utils::error::{ExportError, Result};
use url::Url;

/// Body class identifying the host application.
pub const GATE_CLASS: &str = "app-grafana";
/// Toolbar element the export affordance attaches to.
pub const TOOLBAR_CLASS: &str = "page-toolbar";

pub const EXPORT_TITLE: &str = "Export as DARK dashboard";
pub const EXPORT_ICON: &str = "dark-export";

/// Ties the page model to the export pipeline: gate check, anchor wait,
/// affordance install, and the export action itself.
pub struct ExportSession {
    page: Page,
    trigger: ExportTrigger,
}

impl ExportSession {
    pub fn new(page: Page, trigger: ExportTrigger) -> Self {
        Self { page, trigger }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Bootstrap on the host page. A no-op unless the page identifies as the
    /// host application; otherwise waits for the toolbar anchor (however
    /// long that takes) and installs the export affordance once.
    pub async fn attach(&self) -> bool {
        if !self.page.snapshot().body_has_class(GATE_CLASS) {
            tracing::debug!("page is not the host application, staying inactive");
            return false;
        }

        tracing::debug!("host application detected, waiting for toolbar");
        self.page.wait_for_element(TOOLBAR_CLASS).await;

        tracing::debug!("toolbar found, installing export control");
        self.install_export_control();
        true
    }

    /// Append the export control to the toolbar by cloning its last sibling
    /// control, inheriting host styling, then overriding title, icon and
    /// action. Idempotent: a second install leaves the toolbar unchanged.
    fn install_export_control(&self) {
        self.page.apply(|snapshot| {
            let Some(toolbar) = snapshot.query_mut(TOOLBAR_CLASS) else {
                return;
            };
            if toolbar.controls.iter().any(|c| c.title == EXPORT_TITLE) {
                return;
            }

            let mut control = toolbar.controls.last().cloned().unwrap_or(Control {
                title: String::new(),
                icon: String::new(),
                action: None,
            });
            control.title = EXPORT_TITLE.to_string();
            control.icon = EXPORT_ICON.to_string();
            control.action = Some(ControlAction::ExportDark);

            toolbar.controls.push(control);
        });
    }

    /// Run one export for the current page URL, logging failures per their
    /// severity before handing them back to the caller.
    pub async fn export(&self, page_url: &Url) -> Result<ConversionResponse> {
        match self.trigger.export(page_url).await {
            Ok(response) => {
                tracing::info!(bytes = response.result.len(), "dashboard exported");
                Ok(response)
            }
            Err(e @ ExportError::MissingDashboardUid { .. }) => {
                tracing::warn!("{e}");
                Err(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                Err(e)
            }
        }
    }
}
