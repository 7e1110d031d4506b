use async_trait::async_trait;
use launchpad_application::{EntryStatusStream, WaitlistEventPublisher};
use launchpad_core::AppResult;
use launchpad_domain::EntryStatusChanged;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// In-process fan-out of entry status changes over a tokio broadcast channel.
///
/// Subscribers that fall more than `capacity` events behind skip the missed
/// events and keep receiving.
#[derive(Debug, Clone)]
pub struct BroadcastWaitlistEventPublisher {
    sender: broadcast::Sender<EntryStatusChanged>,
}

impl BroadcastWaitlistEventPublisher {
    /// Creates a publisher buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of open subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl WaitlistEventPublisher for BroadcastWaitlistEventPublisher {
    async fn publish(&self, event: EntryStatusChanged) -> AppResult<()> {
        // Send only fails when nobody is listening.
        let _ = self.sender.send(event);
        Ok(())
    }

    fn subscribe(&self) -> EntryStatusStream {
        let stream =
            BroadcastStream::new(self.sender.subscribe()).filter_map(|item| match item {
                Ok(event) => Some(event),
                Err(error) => {
                    tracing::warn!(%error, "status subscriber lagged behind");
                    None
                }
            });

        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use launchpad_application::WaitlistEventPublisher;
    use launchpad_core::AppResult;
    use launchpad_domain::{
        EntryStatusChanged, WaitlistDefinitionId, WaitlistEntryId, WaitlistEntryStatus,
    };
    use tokio_stream::StreamExt;

    use super::BroadcastWaitlistEventPublisher;

    fn event(status: WaitlistEntryStatus) -> EntryStatusChanged {
        EntryStatusChanged {
            entry_id: WaitlistEntryId::new(),
            definition_id: WaitlistDefinitionId::new(),
            email: "sub@example.com".to_owned(),
            previous_status: Some(WaitlistEntryStatus::Pending),
            status,
            changed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_ok() -> AppResult<()> {
        let publisher = BroadcastWaitlistEventPublisher::new(8);
        publisher.publish(event(WaitlistEntryStatus::Approved)).await
    }

    #[tokio::test]
    async fn every_subscriber_receives_events_in_order() -> AppResult<()> {
        let publisher = BroadcastWaitlistEventPublisher::new(8);
        let mut left = publisher.subscribe();
        let mut right = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 2);

        let first = event(WaitlistEntryStatus::Approved);
        let second = event(WaitlistEntryStatus::Rejected);
        publisher.publish(first.clone()).await?;
        publisher.publish(second.clone()).await?;

        assert_eq!(left.next().await, Some(first.clone()));
        assert_eq!(left.next().await, Some(second.clone()));
        assert_eq!(right.next().await, Some(first));
        Ok(())
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_to_retained_events() -> AppResult<()> {
        let publisher = BroadcastWaitlistEventPublisher::new(2);
        let mut stream = publisher.subscribe();

        let events: Vec<_> = (0..4)
            .map(|_| event(WaitlistEntryStatus::Approved))
            .collect();
        for item in &events {
            publisher.publish(item.clone()).await?;
        }

        assert_eq!(stream.next().await, events.get(2).cloned());
        assert_eq!(stream.next().await, events.get(3).cloned());
        Ok(())
    }

    #[tokio::test]
    async fn dropped_streams_release_their_subscription() {
        let publisher = BroadcastWaitlistEventPublisher::new(4);
        let stream = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 1);
        drop(stream);
        assert_eq!(publisher.subscriber_count(), 0);
    }
}
