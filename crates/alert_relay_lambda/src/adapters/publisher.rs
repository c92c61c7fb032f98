/// Outbound pub/sub collaborator. One call per alert, no retries.
pub trait NotificationPublisher {
    fn publish(&self, topic_arn: &str, subject: &str, message: &str) -> Result<(), String>;
}

impl<F> NotificationPublisher for F
where
    F: Fn(&str, &str, &str) -> Result<(), String>,
{
    fn publish(&self, topic_arn: &str, subject: &str, message: &str) -> Result<(), String> {
        self(topic_arn, subject, message)
    }
}
