use async_trait::async_trait;

/// Best-effort sink for chat exchange logs. Implementations swallow their own failures;
/// callers never wait on the outcome.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, title: &str, input_text: &str, output_text: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotificationSink;

#[async_trait]
impl NotificationSink for NoopNotificationSink {
    async fn notify(&self, _title: &str, _input_text: &str, _output_text: &str) {}
}
