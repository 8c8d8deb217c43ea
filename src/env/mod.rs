//! Live environment abstractions.
//!
//! Every environment implements the [`Environment`] trait so that the
//! experience collector can interact with it uniformly.
//!
//! Included environments:
//! - **Simulated** ([`simulated`]) -- a pursuit world driven by a
//!   [`StateModel`](crate::domain::StateModel), with rewards and termination
//!   supplied by injected functions.

pub mod simulated;
pub mod traits;

// Re-export the core trait and outcome type at the module level.
pub use simulated::SimulatedEnvironment;
pub use traits::{Environment, EnvironmentOutcome};
