mod cache;
mod events;
mod repository;

pub use cache::EntrySearchCache;
pub use events::{EntryStatusStream, WaitlistEventPublisher};
pub use repository::{EntryStatusUpdate, WaitlistRepository};
