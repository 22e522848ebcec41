//! Host services injected into the rest of the app.
//!
//! Each service is constructed once at startup and shared behind an `Arc`;
//! nothing in here reaches for process-global state.

mod analytics;
mod cache;
mod flags;

pub use analytics::{Analytics, AnalyticsEvent};
pub use cache::TtlCache;
pub use flags::FeatureFlags;
