pub mod batch;
pub mod runner;

pub use batch::Batch;
pub use runner::{CollectError, Collector};
