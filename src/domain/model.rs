use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Action value routing a request to the conversion worker. Other actions on
/// the same channel are ignored there.
pub const CONVERT_ACTION: &str = "convert-to-k8s";

/// Fixed MIME type and suggested filename of the exported manifest.
pub const ARTIFACT_MIME: &str = "text/yaml";
pub const ARTIFACT_FILENAME: &str = "dark-dashboard.yaml";

/// One conversion request as it crosses the context boundary. The `model`
/// field carries the dashboard already serialized to JSON text; the worker
/// never inspects its shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub id: u64,
    pub action: String,
    pub data: ConversionPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionPayload {
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub success: bool,
    pub result: String,
}

/// Shape of `GET /api/dashboards/uid/{uid}`. Everything except the
/// `dashboard` field is dropped; the model itself stays opaque.
#[derive(Debug, Deserialize)]
pub struct DashboardLookup {
    pub dashboard: Option<serde_json::Value>,
}

/// Result text packaged for download. Ownership passes to the store once
/// delivery is initiated.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    pub fn yaml(result: String) -> Self {
        Self {
            filename: ARTIFACT_FILENAME.to_string(),
            mime: ARTIFACT_MIME,
            bytes: result.into_bytes(),
        }
    }
}

/// What a click on an installed control triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ExportDark,
}

/// A clickable control inside an element, e.g. a toolbar button.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub title: String,
    pub icon: String,
    pub action: Option<ControlAction>,
}

/// A page element addressed by selector classes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub classes: HashSet<String>,
    pub controls: Vec<Control>,
}

impl Element {
    pub fn new(class: &str) -> Self {
        Self {
            classes: HashSet::from([class.to_string()]),
            controls: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// Headless snapshot of the host page: body marker classes plus a flat list
/// of elements. Just enough structure for the gate check, the anchor wait
/// and the affordance install.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub body_classes: HashSet<String>,
    pub elements: Vec<Element>,
}

impl PageSnapshot {
    pub fn body_has_class(&self, class: &str) -> bool {
        self.body_classes.contains(class)
    }

    /// First element carrying the given selector class, if any.
    pub fn query(&self, class: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.has_class(class))
    }

    pub fn query_mut(&mut self, class: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.has_class(class))
    }
}
