//! Page acquisition: platform detection, ordered fetch fallback, durable
//! storage with local images, and throttled batch orchestration.

pub mod batch;
pub mod chain;
pub mod clock;
pub mod error;
pub mod plan;
pub mod platform;
pub mod saver;
pub mod sink;
pub mod strategies;

pub use batch::{
    clamp_concurrency, AcquisitionJob, Acquirer, BatchHandle, MAX_ATTEMPTS, MAX_CONCURRENCY,
    RETRY_STEP, STAGGER_STEP,
};
pub use chain::CrawlerChain;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CrawlerError;
pub use plan::{plan_acquisitions, DEFAULT_JOBS_PER_COMPETITOR};
pub use platform::{identify_platform, PlatformInfo, PlatformKind};
pub use saver::{directory_name, sanitize_filename, ContentSaver, SaveResult, CONTENT_FILE};
pub use sink::{
    content_hash, AcquisitionRecord, AcquisitionSink, JsonlSink, MemorySink, JOURNAL_FILE,
};
pub use strategies::{
    BrowserStrategy, CrawlResult, FetchStrategy, FirecrawlStrategy, ReaderStrategy,
    MIN_CONTENT_CHARS,
};
