//! Pursuit: a stochastic grid-world and a SARS experience collector.
//!
//! An agent looks for a stationary resource while pursuers chase it. The
//! [`domain`] module models the world and its dynamics, [`env`] wraps them as
//! a steppable environment, and [`experience`] drives a behavior policy
//! through rollouts to build `(state, action, reward, next_state)` datasets.

pub mod config;
pub mod domain;
pub mod env;
pub mod experience;
