//! You may override individual costing strategies
//! in order to apply custom functionality to the
//! transition solver. See the [`Strategy`] trait.
//!
//! ## Structure
//! Strategies are joined onto the aggregate [`CostingStrategies`]
//! structure, which is then supplied to the [`MapMatcher`](crate::transition::MapMatcher).
//!
//! All costs are negative log-likelihoods: zero is certain, and larger
//! values are exponentially less likely. The solver minimises their sum.
//!
//! ### Creating your own strategy / heuristic
//!
//! Implement [`Strategy`] for your structure, with the context of the
//! heuristic you need to override. The higher-order traits, like
//! [`TransitionStrategy`], are auto-derived.
//!
//!```rust
//! use traffic_matcher::transition::{Strategy, TransitionContext};
//!
//! struct LengthOnly;
//!
//! impl<'a> Strategy<TransitionContext<'a>> for LengthOnly {
//!    type Cost = f64;
//!
//!    fn calculate(&self, context: TransitionContext<'a>) -> Option<Self::Cost> {
//!        Some(context.route.length() / 100.0)
//!    }
//! }
//! ```
//!
//! ### Default Strategies:
//! - [`DefaultTransitionCost`]: Transition Cost
//! - [`DefaultEmissionCost`]: Emission Cost

#[doc(hidden)]
pub mod default;
#[doc(hidden)]
pub mod emission;
#[doc(hidden)]
pub mod transition;

#[doc(inline)]
pub use default::*;
#[doc(inline)]
pub use emission::*;
#[doc(inline)]
pub use transition::*;

/// A costing heuristic, evaluated over some context `Ctx`.
pub trait Strategy<Ctx> {
    type Cost;

    /// Returns `None` when the context is impossible, rather than
    /// merely unlikely.
    fn calculate(&self, context: Ctx) -> Option<Self::Cost>;
}
