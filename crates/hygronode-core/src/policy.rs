//! Transmit decision policy.
//!
//! Once per sampling cycle the controller asks [`TransmitPolicy::evaluate`]
//! whether the radio should be woken. The policy also owns the humidifier
//! signal, which follows humidity with hysteresis: it switches on below
//! `low_threshold`, off above `high_threshold`, and holds its state in the
//! dead zone between them.
//!
//! Rules, first match wins (the cycle counter is incremented before any of
//! them run):
//!
//! 1. A pending transmit budget is spent one unit per cycle.
//! 2. A periodic heartbeat fires once the counter exceeds the interval.
//! 3. Below the low threshold: humidifier on, transmit every cycle.
//! 4. Above the high threshold: humidifier off, transmit, and arm a
//!    confirmation burst.
//! 5. Dead zone: transmit only while the humidifier is on.
//!
//! # Example
//!
//! ```
//! use hygronode_core::{Decision, PolicyConfig, TransmitPolicy, TransmitReason};
//!
//! let mut policy = TransmitPolicy::new(PolicyConfig::default().initial_budget(0));
//!
//! assert_eq!(policy.evaluate(Some(45)), Decision::Skip);
//! assert_eq!(policy.evaluate(Some(35)), Decision::Transmit(TransmitReason::BelowLow));
//! assert!(policy.humidifier_on());
//! assert_eq!(policy.evaluate(Some(45)), Decision::Transmit(TransmitReason::DeadZoneOn));
//! ```

use std::fmt;

use tracing::debug;

use hygronode_types::{MAX_HUMIDITY_PERCENT, UNKNOWN_HUMIDITY_SENTINEL};

use crate::error::{Error, Result};

/// Default humidity below which the humidifier is switched on.
pub const DEFAULT_LOW_THRESHOLD: u8 = 40;
/// Default humidity above which the humidifier is switched off.
pub const DEFAULT_HIGH_THRESHOLD: u8 = 50;
/// Default number of cycles between heartbeat transmissions.
pub const DEFAULT_PERIODIC_INTERVAL: u32 = 20;
/// Default length of the confirmation burst after switching off.
pub const DEFAULT_CONFIRMATION_COUNT: u32 = 5;
/// Default number of guaranteed transmissions after power-on.
pub const DEFAULT_INITIAL_BUDGET: u32 = 10;

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Wake the radio and broadcast the current reading.
    Transmit(TransmitReason),
    /// Leave the radio asleep this cycle.
    Skip,
}

impl Decision {
    /// Whether this decision wakes the radio.
    #[must_use]
    pub fn is_transmit(&self) -> bool {
        matches!(self, Decision::Transmit(_))
    }
}

/// Which rule produced a transmit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitReason {
    /// Boot or confirmation budget was pending.
    Budget,
    /// Heartbeat interval elapsed.
    Periodic,
    /// Humidity below the low threshold.
    BelowLow,
    /// Humidity above the high threshold.
    AboveHigh,
    /// Humidity in the dead zone with the humidifier still on.
    DeadZoneOn,
}

impl fmt::Display for TransmitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Budget => write!(f, "guaranteed transmission"),
            Self::Periodic => write!(f, "periodic heartbeat"),
            Self::BelowLow => write!(f, "humidity below low threshold"),
            Self::AboveHigh => write!(f, "humidity above high threshold"),
            Self::DeadZoneOn => write!(f, "dead zone with humidifier on"),
        }
    }
}

/// Thresholds and counts driving the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Humidity strictly below this switches the humidifier on.
    pub low_threshold: u8,
    /// Humidity strictly above this switches the humidifier off.
    pub high_threshold: u8,
    /// Heartbeat fires when the cycle counter exceeds this.
    pub periodic_interval: u32,
    /// Budget armed when humidity crosses above `high_threshold`.
    pub confirmation_count: u32,
    /// Budget at power-on.
    pub initial_budget: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            periodic_interval: DEFAULT_PERIODIC_INTERVAL,
            confirmation_count: DEFAULT_CONFIRMATION_COUNT,
            initial_budget: DEFAULT_INITIAL_BUDGET,
        }
    }
}

impl PolicyConfig {
    /// Set both humidity thresholds.
    #[must_use]
    pub fn thresholds(mut self, low: u8, high: u8) -> Self {
        self.low_threshold = low;
        self.high_threshold = high;
        self
    }

    /// Set the heartbeat interval in cycles.
    #[must_use]
    pub fn periodic_interval(mut self, cycles: u32) -> Self {
        self.periodic_interval = cycles;
        self
    }

    /// Set the confirmation burst length.
    #[must_use]
    pub fn confirmation_count(mut self, count: u32) -> Self {
        self.confirmation_count = count;
        self
    }

    /// Set the power-on budget.
    #[must_use]
    pub fn initial_budget(mut self, budget: u32) -> Self {
        self.initial_budget = budget;
        self
    }

    /// Validate the thresholds.
    ///
    /// Checks that:
    /// - `low_threshold` <= `high_threshold` <= 100
    /// - `periodic_interval` is > 0
    pub fn validate(&self) -> Result<()> {
        if self.low_threshold > self.high_threshold {
            return Err(Error::invalid_config(format!(
                "low_threshold ({}) must not exceed high_threshold ({})",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.high_threshold > MAX_HUMIDITY_PERCENT {
            return Err(Error::invalid_config(format!(
                "high_threshold ({}) must be <= {}",
                self.high_threshold, MAX_HUMIDITY_PERCENT
            )));
        }
        if self.periodic_interval == 0 {
            return Err(Error::invalid_config("periodic_interval must be > 0"));
        }
        Ok(())
    }
}

/// Duty-cycle policy state.
///
/// Owns the humidifier signal, the transmit budget and the cycle counter.
/// All three live as long as the node is powered.
#[derive(Debug, Clone)]
pub struct TransmitPolicy {
    config: PolicyConfig,
    humidifier_on: bool,
    budget: u32,
    cycle_counter: u32,
}

impl TransmitPolicy {
    /// Create the power-on state: humidifier off, budget armed.
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            budget: config.initial_budget,
            config,
            humidifier_on: false,
            cycle_counter: 0,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Current humidifier signal.
    pub fn humidifier_on(&self) -> bool {
        self.humidifier_on
    }

    /// Guaranteed transmissions still pending.
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Cycles evaluated since the last heartbeat.
    ///
    /// Normally at most `periodic_interval`; it can run past that while a
    /// budget is draining, and is reset by the first heartbeat afterwards.
    pub fn cycle_counter(&self) -> u32 {
        self.cycle_counter
    }

    /// Decide whether this cycle transmits.
    ///
    /// `humidity` is `None` until the sensor has produced a sample; an unknown
    /// value is evaluated as [`UNKNOWN_HUMIDITY_SENTINEL`], which lands above
    /// any valid high threshold.
    pub fn evaluate(&mut self, humidity: Option<u8>) -> Decision {
        self.cycle_counter = self.cycle_counter.saturating_add(1);

        let decision = self.decide(humidity.unwrap_or(UNKNOWN_HUMIDITY_SENTINEL));
        debug!(
            ?decision,
            ?humidity,
            humidifier_on = self.humidifier_on,
            budget = self.budget,
            cycle_counter = self.cycle_counter,
            "policy evaluated"
        );
        decision
    }

    fn decide(&mut self, humidity: u8) -> Decision {
        if self.budget > 0 {
            self.budget -= 1;
            return Decision::Transmit(TransmitReason::Budget);
        }

        if self.cycle_counter > self.config.periodic_interval {
            self.cycle_counter = 0;
            return Decision::Transmit(TransmitReason::Periodic);
        }

        if humidity < self.config.low_threshold {
            self.humidifier_on = true;
            Decision::Transmit(TransmitReason::BelowLow)
        } else if humidity > self.config.high_threshold {
            self.humidifier_on = false;
            // Confirmation burst for the off transition.
            self.budget = self.config.confirmation_count;
            Decision::Transmit(TransmitReason::AboveHigh)
        } else if self.humidifier_on {
            Decision::Transmit(TransmitReason::DeadZoneOn)
        } else {
            Decision::Skip
        }
    }
}

impl Default for TransmitPolicy {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn exhausted() -> TransmitPolicy {
        TransmitPolicy::new(PolicyConfig::default().initial_budget(0))
    }

    proptest! {
        #[test]
        fn below_low_switches_on(h in 0u8..40) {
            let mut policy = exhausted();
            prop_assert_eq!(policy.evaluate(Some(h)), Decision::Transmit(TransmitReason::BelowLow));
            prop_assert!(policy.humidifier_on());
        }

        #[test]
        fn above_high_switches_off_and_arms_burst(h in 51u8..=100, was_on in any::<bool>()) {
            let mut policy = exhausted();
            if was_on {
                policy.evaluate(Some(0));
            }
            prop_assert_eq!(
                policy.evaluate(Some(h)),
                Decision::Transmit(TransmitReason::AboveHigh)
            );
            prop_assert!(!policy.humidifier_on());
            prop_assert_eq!(policy.budget(), 5);
        }

        #[test]
        fn dead_zone_skips_when_off(h in 40u8..=50) {
            let mut policy = exhausted();
            prop_assert_eq!(policy.evaluate(Some(h)), Decision::Skip);
        }

        /// The budget drops by exactly one on every evaluation that finds it
        /// positive, and the counter either grows by one or is reset by a
        /// heartbeat.
        #[test]
        fn budget_and_counter_evolve_monotonically(
            readings in proptest::collection::vec(proptest::option::of(0u8..=100), 1..200),
        ) {
            let mut policy = TransmitPolicy::default();
            for h in readings {
                let budget_before = policy.budget();
                let counter_before = policy.cycle_counter();
                let decision = policy.evaluate(h);

                if budget_before > 0 {
                    prop_assert_eq!(decision, Decision::Transmit(TransmitReason::Budget));
                    prop_assert_eq!(policy.budget(), budget_before - 1);
                }

                if decision == Decision::Transmit(TransmitReason::Periodic) {
                    prop_assert_eq!(policy.cycle_counter(), 0);
                } else {
                    prop_assert_eq!(policy.cycle_counter(), counter_before + 1);
                }
            }
        }
    }
}
