pub mod bootstrap;
pub mod pipeline;
pub mod report;

pub use bootstrap::{build_pipeline, run, RunOptions};
pub use pipeline::{Pipeline, SYMBOL_PAUSE};
pub use report::RunReport;
