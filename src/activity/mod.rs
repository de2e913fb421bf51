//! Activity aggregation engine
//!
//! Everything needed to turn the GitHub REST API into per-repository activity
//! counts for one user: a thin [`Client`] over the list endpoints, a pager
//! that walks them to exhaustion, a fixed-delay [`RetryPolicy`] for transient
//! failures, a [`Throttler`] bounding request fan-out, and the [`Aggregator`]
//! that ties the traversals together per window.

mod aggregator;
mod client;
mod pager;
mod records;
mod retry;
mod throttler;

pub use aggregator::Aggregator;
pub use client::Client;
pub use records::{IssueRecord, RecordKind, RepositoryActivity, SubRecord, TimeWindow, WindowReport};
pub use retry::RetryPolicy;
pub use throttler::Throttler;
