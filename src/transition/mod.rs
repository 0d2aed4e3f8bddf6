//! A Hidden-Markov-Model (HMM) matching
//! transition module that allows for
//! matching raw data to an underlying
//! network.
//!
//! Each measurement selected for matching forms a [`Layer`] of
//! [`Candidate`] positions. The [`ViterbiSolver`] finds the cheapest
//! path through the layers, and the [`MapMatcher`] turns it into a
//! [`MatchedTrace`].

pub mod candidate;
pub mod costing;
pub mod entity;
pub mod layer;
pub mod matcher;
pub mod solver;
pub mod trip;

#[cfg(test)]
mod test;

// Re-Exports
#[doc(inline)]
pub use candidate::*;
#[doc(inline)]
pub use costing::*;
#[doc(inline)]
pub use solver::*;

pub use entity::*;
pub use layer::*;
pub use matcher::*;
pub use trip::*;
