pub mod category;
pub mod claim;
pub mod date_utils;
pub mod envelope;
pub mod lenient;
pub mod normalize;
pub mod queue;
pub mod ratios;
pub mod regulation;

pub use category::ItemCategory;
pub use claim::{ClaimRecord, LineItem, DENIAL_NOISE_THRESHOLD};
pub use date_utils::{DateRange, format_date_label, get_month, month_key, month_label, parse_timestamp, week_key};
pub use envelope::ApiResponse;
pub use normalize::{clean_display_name, fold_diacritics, handler_key, normalize_key, resolve_first, resolve_text};
pub use queue::{PriorityClass, QueueItem, QueuePage, QueueSpec, RequestType, TrafficLight};
pub use regulation::{RegulationRecord, SlaFlag};
