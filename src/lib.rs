pub mod analysis;
pub mod cache;
pub mod clean;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;

pub use dataset::{Column, Dataset};
pub use error::ScrapeError;
pub use extract::RawTable;
