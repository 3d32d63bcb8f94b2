pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::args::CliConfig;
pub use config::cli::LocalStorage;

pub use app::pipelines::{FetchPipeline, MatchPipeline, MergePipeline};
pub use self::core::{etl::EtlEngine, matching::FuzzyNameMatcher, search::HttpSearchSource};
pub use utils::error::{EtlError, Result};
