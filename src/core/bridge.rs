use crate::core::delivery::DeliveryManager;
use crate::domain::model::{
    ConversionPayload, ConversionRequest, ConversionResponse, DownloadArtifact, CONVERT_ACTION,
};
use crate::domain::ports::{ArtifactStore, Converter};
use crate::utils::error::{ExportError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

const QUEUE_DEPTH: usize = 16;

struct Envelope {
    request: ConversionRequest,
    reply: oneshot::Sender<ConversionResponse>,
}

/// Request/response channel into the conversion worker.
///
/// Each request carries a correlation id and a dedicated oneshot reply slot,
/// so at most one response can ever reach the original invoker. The worker
/// only handles `convert-to-k8s`; envelopes with other actions are dropped
/// unanswered, leaving the channel shareable with unrelated consumers.
#[derive(Clone)]
pub struct MessageBridge {
    tx: mpsc::Sender<Envelope>,
    next_id: Arc<AtomicU64>,
}

impl MessageBridge {
    /// Start the worker task and return the sender handle. The worker stops
    /// once every handle is dropped.
    pub fn spawn<C, S>(converter: Arc<C>, delivery: Arc<DeliveryManager<S>>) -> Self
    where
        C: Converter + 'static,
        S: ArtifactStore + 'static,
    {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(run_worker(rx, converter, delivery));

        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Submit a serialized dashboard model for conversion and await the
    /// single matching response.
    pub async fn request(&self, model: String) -> Result<ConversionResponse> {
        let request = ConversionRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            action: CONVERT_ACTION.to_string(),
            data: ConversionPayload { model },
        };
        self.send(request).await
    }

    /// Lower-level entry point for arbitrary actions on the shared channel.
    pub async fn send(&self, request: ConversionRequest) -> Result<ConversionResponse> {
        let id = request.id;
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(Envelope {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ExportError::ChannelClosed)?;

        // A dropped reply slot means the worker finished without emitting a
        // response (conversion failure or unhandled action). Surface that
        // instead of hanging.
        reply_rx
            .await
            .map_err(|_| ExportError::ConversionAbandoned { id })
    }
}

async fn run_worker<C, S>(
    mut rx: mpsc::Receiver<Envelope>,
    converter: Arc<C>,
    delivery: Arc<DeliveryManager<S>>,
) where
    C: Converter + 'static,
    S: ArtifactStore + 'static,
{
    tracing::debug!("conversion worker started");

    while let Some(envelope) = rx.recv().await {
        if envelope.request.action != CONVERT_ACTION {
            tracing::debug!(
                id = envelope.request.id,
                action = %envelope.request.action,
                "ignoring unhandled action"
            );
            continue;
        }

        // Concurrent exports each get an independent handling task, and with
        // it an independent module instantiation.
        tokio::spawn(handle_conversion(
            envelope,
            Arc::clone(&converter),
            Arc::clone(&delivery),
        ));
    }

    tracing::debug!("conversion worker stopped");
}

async fn handle_conversion<C, S>(
    envelope: Envelope,
    converter: Arc<C>,
    delivery: Arc<DeliveryManager<S>>,
) where
    C: Converter,
    S: ArtifactStore,
{
    let id = envelope.request.id;
    tracing::debug!(id, "handling conversion request");

    match converter.convert(&envelope.request.data.model).await {
        Ok(result) => {
            // Download first, response second, as the original pipeline
            // ordered them. Delivery outcomes never reach the response.
            if let Err(e) = delivery.deliver(DownloadArtifact::yaml(result.clone())).await {
                tracing::error!(id, error = %e, "artifact delivery failed");
            }

            let _ = envelope.reply.send(ConversionResponse {
                success: true,
                result,
            });
        }
        Err(e) => {
            tracing::error!(id, error = %e, "conversion failed, request abandoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    use crate::core::delivery::LocalStore;

    struct IdentityConverter {
        calls: AtomicUsize,
    }

    impl IdentityConverter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Converter for IdentityConverter {
        async fn convert(&self, model_json: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(model_json.to_string())
        }
    }

    struct FailingConverter;

    #[async_trait]
    impl Converter for FailingConverter {
        async fn convert(&self, _model_json: &str) -> Result<String> {
            Err(ExportError::ModuleError {
                message: "guest trap".to_string(),
            })
        }
    }

    fn delivery(dir: &TempDir) -> Arc<DeliveryManager<LocalStore>> {
        Arc::new(DeliveryManager::new(LocalStore::new(dir.path())))
    }

    #[tokio::test]
    async fn test_round_trip_with_identity_converter() {
        let dir = TempDir::new().unwrap();
        let model = serde_json::json!({"title": "T"});
        let model_json = serde_json::to_string(&model).unwrap();

        let bridge = MessageBridge::spawn(IdentityConverter::new(), delivery(&dir));
        let response = bridge.request(model_json.clone()).await.unwrap();

        assert!(response.success);
        assert_eq!(response.result, model_json);
    }

    #[tokio::test]
    async fn test_conversion_failure_emits_no_response() {
        let dir = TempDir::new().unwrap();
        let bridge = MessageBridge::spawn(Arc::new(FailingConverter), delivery(&dir));

        let outcome = timeout(Duration::from_secs(1), bridge.request("{}".to_string())).await;

        // The await settles, but never with a response.
        match outcome.unwrap() {
            Err(ExportError::ConversionAbandoned { .. }) => {}
            other => panic!("expected abandoned request, got {:?}", other.map(|r| r.success)),
        }

        // Nothing was delivered either.
        assert!(!dir.path().join("dark-dashboard.yaml").exists());
    }

    #[tokio::test]
    async fn test_unrelated_actions_pass_through_unhandled() {
        let dir = TempDir::new().unwrap();
        let converter = IdentityConverter::new();
        let bridge = MessageBridge::spawn(Arc::clone(&converter), delivery(&dir));

        let request = ConversionRequest {
            id: 99,
            action: "ping".to_string(),
            data: ConversionPayload {
                model: String::new(),
            },
        };
        let outcome = bridge.send(request).await;

        match outcome {
            Err(ExportError::ConversionAbandoned { id: 99 }) => {}
            other => panic!("expected abandoned request, got {:?}", other.map(|r| r.success)),
        }
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_correlation_ids_are_distinct_per_request() {
        let dir = TempDir::new().unwrap();
        let bridge = MessageBridge::spawn(IdentityConverter::new(), delivery(&dir));

        let first = bridge.next_id.load(Ordering::Relaxed);
        bridge.request("{}".to_string()).await.unwrap();
        bridge.request("{}".to_string()).await.unwrap();

        assert_eq!(bridge.next_id.load(Ordering::Relaxed), first + 2);
    }

    #[tokio::test]
    async fn test_successful_conversion_also_delivers_artifact() {
        let dir = TempDir::new().unwrap();
        let bridge = MessageBridge::spawn(IdentityConverter::new(), delivery(&dir));

        bridge.request("{\"a\":1}".to_string()).await.unwrap();

        let delivered = dir.path().join("dark-dashboard.yaml");
        assert_eq!(std::fs::read_to_string(delivered).unwrap(), "{\"a\":1}");
    }
}
