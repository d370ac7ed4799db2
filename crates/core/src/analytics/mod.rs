//! Pure analytics over the activity log.
//!
//! Everything in this module is synchronous and referentially transparent:
//! the same log and card set always produce the same output, and nothing
//! here touches storage or the network.

mod chart;
mod progress;
mod score;
mod windows;

pub use chart::{build_series, ChartBucket, ChartSeries, PromptCounts};
pub use progress::{aggregate, PhaseProgress};
pub use score::{score_series, ProgressScorePoint};
pub use windows::{compute_windows, IndependenceWindow};
