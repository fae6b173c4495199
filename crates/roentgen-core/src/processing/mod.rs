pub mod cache;
pub mod engine;
pub mod messages;
pub mod worker;

pub use cache::{CacheKey, FilterCache, FilterSettings};
pub use engine::{FilterEngine, JobOutcome, Submission};
pub use messages::JobId;
pub use worker::{FilterRunner, LibraryRunner};
