use async_trait::async_trait;
use futures::stream::BoxStream;
use launchpad_core::AppResult;
use launchpad_domain::EntryStatusChanged;

/// Unbounded stream of status change events.
pub type EntryStatusStream = BoxStream<'static, EntryStatusChanged>;

/// Port for fanning out entry status changes to subscribers.
#[async_trait]
pub trait WaitlistEventPublisher: Send + Sync {
    /// Publishes one event. Having no subscribers is not an error.
    async fn publish(&self, event: EntryStatusChanged) -> AppResult<()>;

    /// Opens a stream of events published from now on.
    fn subscribe(&self) -> EntryStatusStream;
}
