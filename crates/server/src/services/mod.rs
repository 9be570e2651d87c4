//! Business logic services.

pub mod ranking;

pub use ranking::{OrderRankingService, RankedCandidate, RankedOrder};
