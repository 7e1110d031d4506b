use futures::StreamExt;
use launchpad_core::{AppResult, Validate};
use launchpad_domain::{Actor, EntryStatusSubscriptionInput, Permission};

use crate::EntryStatusStream;

use super::WaitlistService;

impl WaitlistService {
    /// Opens a stream of entry status changes matching the filter.
    ///
    /// The permission is checked once, when the stream is opened. Organization
    /// grants only cover streams filtered to one of the organization's
    /// definitions. The stream ends when the caller drops it.
    pub async fn subscribe_status_changes(
        &self,
        actor: &Actor,
        input: EntryStatusSubscriptionInput,
    ) -> AppResult<EntryStatusStream> {
        input.validate()?;
        let permission = Permission::WaitlistEntryGetEntry;
        match input.definition_id {
            Some(definition_id) => {
                self.authorized_definition(actor, permission, definition_id)
                    .await?;
            }
            None => {
                self.authorization_service
                    .require_permission_on(actor, permission, None)
                    .await?;
            }
        }

        Ok(self
            .event_publisher
            .subscribe()
            .filter(move |event| std::future::ready(input.matches(event)))
            .boxed())
    }
}
