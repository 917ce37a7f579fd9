//! Split a test suite into groups of roughly equal runtime.
//!
//! Every CI runner collects the same tests, builds a [`Splitter`] from the same
//! durations file and asks it for its own group. Since the partition only
//! depends on the tests and the recorded durations, the runners agree on who
//! runs what without talking to each other.
//!
//! ```
//! use test_split::{Splitter, algorithm::Algorithm, config::SplitConfig, durations::DurationTable};
//!
//! let durations: DurationTable = [("a", 1.0), ("b", 1.0), ("c", 1.0), ("d", 3.0)]
//!     .into_iter()
//!     .collect();
//! let config = SplitConfig::new(2, 1, Algorithm::LeastDuration).unwrap();
//!
//! let items = ["a", "b", "c", "d"];
//! let selection = Splitter::new(config, durations).split(&items);
//! assert_eq!(selection.selected, [&"d"]);
//! ```

pub mod config;
pub mod durations;
pub mod error;
pub mod group;
pub mod item;

mod splitter;
pub use splitter::*;

mod strategy;
pub use strategy::*;

#[cfg(test)]
mod test_support;
