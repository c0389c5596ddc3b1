pub mod crawler;
pub mod error;
pub mod policy;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use error::CrawlError;
pub use policy::LinkPolicy;
pub use result::PageResult;
