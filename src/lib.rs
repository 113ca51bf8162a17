pub mod calendar;
pub mod config;
pub mod districts;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod sink;
pub mod validate;

pub use config::ScraperConfig;
pub use districts::{District, DISTRICTS};
pub use extract::ReservoirRecord;
pub use pipeline::{RunSummary, Scraper};
pub use sink::{CsvSink, OutputMode};
