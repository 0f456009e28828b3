use async_trait::async_trait;

/// Outbound "records created" event consumed by the messaging integration.
///
/// Delivery is fire-and-forget: the service invokes the notifier after the
/// owning transaction has committed, off the request path, and a failed
/// delivery is logged and dropped. Implementations must not assume they run
/// inside any transactional scope.
#[async_trait]
pub trait RecordNotifier: Send + Sync {
    async fn records_created(&self, record_uids: Vec<String>) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Default notifier that drops every event.
pub struct NoopNotifier;

#[async_trait]
impl RecordNotifier for NoopNotifier {
    async fn records_created(&self, _record_uids: Vec<String>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
