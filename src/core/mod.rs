pub mod csv_io;
pub mod etl;
pub mod flatten;
pub mod matching;
pub mod merge;
pub mod normalize;
pub mod paginate;
pub mod search;
pub mod summary;

pub use crate::domain::model::{Dataset, Record, Row};
pub use crate::domain::ports::{NameMatcher, Pipeline, SearchSource, Storage};
pub use crate::utils::error::Result;
