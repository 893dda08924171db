//! Core filtering logic for hostfilter.
//!
//! Loads an inventory CSV, removes every host that already runs the
//! monitoring agent, keeps one row per remaining host, and writes the
//! result (e.g., [`pipeline::run_filter`]).

pub mod codec;
pub mod filter;
pub mod picker;
pub mod pipeline;
pub mod table;

pub use filter::{ExclusionSet, FilterOutcome, FilterStats, exclusion_set, filter_hosts};
pub use picker::{PathProvider, StaticPaths};
pub use table::{Columns, HostKey, Record, Table};
