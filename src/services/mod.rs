pub mod browse;
pub mod catalog;
pub mod projection;
pub mod random;
pub mod ratings;
pub mod recommendations;
pub mod statistics;

#[cfg(test)]
pub(crate) mod fixtures;

pub use browse::{CatalogBrowser, SearchFilter};
pub use catalog::CatalogService;
pub use projection::{CatalogIndex, Projector, UNKNOWN_AUTHOR};
pub use random::{FixedSequence, RandomSource, SeededRandom, ThreadRandom};
pub use ratings::RatingAggregator;
pub use recommendations::{Recommender, DEFAULT_LIMIT};
pub use statistics::StatisticsEngine;
