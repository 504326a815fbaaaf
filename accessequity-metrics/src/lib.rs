//! population-weighted inequality measures for access-to-facility distributions.
//!
//! every measure consumes a [`WeightedSample`], which already excludes rows with a NaN
//! value or a non-positive weight, so no function here has to re-check for an empty
//! population.
pub mod atkinson;
mod error;
pub mod gini;
pub mod kolm_pollak;
pub mod outlier;
mod report;
pub mod summary;
mod weighted_sample;

pub use error::InequalityError;
pub use kolm_pollak::KolmPollak;
pub use report::EquityReport;
pub use summary::DistributionSummary;
pub use weighted_sample::WeightedSample;
