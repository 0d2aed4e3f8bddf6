pub mod emission {
    use crate::transition::*;

    /// Calculates the emission cost of a candidate relative
    /// to its source measurement.
    ///
    /// ## Calculation
    ///
    /// The measurement is assumed to be normally distributed about the true
    /// position, with a standard deviation of the configured `sigma_z`, or the
    /// measurement's own reported accuracy when that is larger.
    ///
    /// ```math
    /// σ = max(sigma_z, accuracy)
    /// cost(candidate) = ½ (distance / σ)²
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct DefaultEmissionCost {
        pub sigma_z: f64,
    }

    impl<'a> Strategy<EmissionContext<'a>> for DefaultEmissionCost {
        type Cost = f64;

        fn calculate(&self, context: EmissionContext<'a>) -> Option<Self::Cost> {
            let sigma = self.sigma_z.max(context.accuracy);
            Some(0.5 * (context.distance / sigma).powi(2))
        }
    }
}

pub mod transition {
    use crate::transition::*;

    /// Calculates the transition cost between two candidates.
    ///
    /// # Calculation
    ///
    /// The cost is exponentially distributed in the "surprise" of the
    /// transition, which is composed of a deviance and a turn cost.
    ///
    /// ## Deviance
    /// Defines the variability between the route length (in meters)
    /// and the great-circle distance between the two measurements.
    ///
    /// A vehicle travelling between two nearby measurements rarely takes
    /// a long detour, so routes much longer than the straight line between
    /// the measurements are unlikely.
    ///
    /// When route-based costing is disabled, the great-circle distance
    /// between the two candidates stands in for the route length.
    ///
    /// ## Turn Cost
    /// Each change of heading along the route contributes `(1 - cos Δθ) / 2`,
    /// weighted by the `turn_penalty_factor`. See [`Trip::turn_cost`].
    ///
    /// ### Total Cost
    ///
    /// ```math
    /// cost(route) = (deviance(route) + turn_penalty_factor · turn_cost(route)) / β
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct DefaultTransitionCost {
        pub beta: f64,
        pub turn_penalty_factor: f64,
        pub use_route: bool,
    }

    impl<'a> Strategy<TransitionContext<'a>> for DefaultTransitionCost {
        type Cost = f64;

        fn calculate(&self, context: TransitionContext<'a>) -> Option<Self::Cost> {
            let deviance = if self.use_route {
                context.deviance()
            } else {
                (context.candidate_distance - context.measurement_distance).abs()
            };

            let turn_cost = self.turn_penalty_factor * context.trip.turn_cost();
            Some((deviance + turn_cost) / self.beta)
        }
    }
}

pub mod costing {
    use super::{DefaultEmissionCost, DefaultTransitionCost};
    use crate::config::MatchOptions;
    use crate::transition::*;

    pub struct CostingStrategies<E = DefaultEmissionCost, T = DefaultTransitionCost>
    where
        E: EmissionStrategy,
        T: TransitionStrategy,
    {
        emission: E,
        transition: T,
    }

    impl<E, T> CostingStrategies<E, T>
    where
        E: EmissionStrategy,
        T: TransitionStrategy,
    {
        pub fn new(emission: E, transition: T) -> Self {
            Self {
                emission,
                transition,
            }
        }

        /// The emission cost of a candidate. An impossible emission
        /// has an infinite cost.
        #[inline]
        pub fn emission(&self, context: EmissionContext) -> f64 {
            self.emission.calculate(context).unwrap_or(f64::INFINITY)
        }

        /// The transition cost between two candidates, or `None`
        /// if the transition is impossible.
        #[inline]
        pub fn transition(&self, context: TransitionContext) -> Option<f64> {
            self.transition
                .calculate(context)
                .filter(|cost| cost.is_finite())
        }
    }

    impl CostingStrategies<DefaultEmissionCost, DefaultTransitionCost> {
        /// The default strategies, parameterised by the match options.
        pub fn from_options(options: &MatchOptions) -> Self {
            CostingStrategies::new(
                DefaultEmissionCost {
                    sigma_z: options.sigma_z,
                },
                DefaultTransitionCost {
                    beta: options.beta,
                    turn_penalty_factor: options.turn_penalty_factor,
                    use_route: options.route,
                },
            )
        }
    }

    impl Default for CostingStrategies<DefaultEmissionCost, DefaultTransitionCost> {
        fn default() -> Self {
            CostingStrategies::from_options(&MatchOptions::default())
        }
    }
}

#[doc(hidden)]
pub use costing::*;
#[doc(hidden)]
pub use emission::*;
#[doc(hidden)]
pub use transition::*;
