//! Summary statistics for training reports.
//!
//! ```
//! use gensnake_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
//! assert_eq!(stats.mean, 2.5);
//! assert_eq!(stats.median, 2.0);
//! ```

pub mod descriptive;
