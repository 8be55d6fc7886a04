pub mod errors;
pub mod fetcher;
pub mod queue_api;
pub mod sources;

pub use errors::{ClientError, ClientResult};
pub use fetcher::{LiveSlaResponse, QueueReport, monitor_queues, monitor_queues_at};
pub use queue_api::{HttpQueueApi, QueueApi};
pub use sources::{ClaimSource, JsonFileSource};
