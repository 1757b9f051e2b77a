//! Run state: the resume counter and per-domain visit accounting.

mod domain_visits;
mod progress;

pub use domain_visits::DomainVisits;
pub use progress::ProgressTracker;
