//! Synthesis engine: diffing, retry policy, manager, and the pass driver.

mod diff;
mod manager;
mod retry;
mod synthesizer;

pub use diff::{SetDiff, string_set_diff};
pub use manager::{DefaultEndpointServiceManager, EndpointServiceManager};
pub use retry::retry_immediate_on_error;
pub use synthesizer::{SynthesisReport, Synthesizer};
