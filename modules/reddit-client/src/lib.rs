pub mod error;
pub mod fetcher;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod transport;
pub mod types;

pub use error::{RedditError, Result};
pub use fetcher::{FetchOutcome, FetchPolicy, RateLimitedFetcher, SourceFetch};
pub use transport::{HttpTransport, PageTransport};
pub use types::{PageRequest, PageResponse, RedditPost, SearchListing};
