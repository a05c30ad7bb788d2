use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{Indicator, IndicatorConfig, InvariantViolation, Price};

/// Configuration for the Exponential Moving Average ([`Ema`])
/// indicator.
///
/// # Example
///
/// ```
/// use quantedge_signals::{EmaConfig, IndicatorConfig};
/// use std::num::NonZero;
///
/// let config = EmaConfig::new(NonZero::new(21).unwrap());
/// assert_eq!(config.length(), 21);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    length: usize,
}

impl IndicatorConfig for EmaConfig {
    #[inline]
    fn new(length: NonZero<usize>) -> Self {
        Self {
            length: length.get(),
        }
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmaConfig({})", self.length)
    }
}

#[derive(Clone, Debug)]
enum EmaPhase {
    Seeding { sum: Price, seen: usize },
    Live { current: Price },
}

/// Exponential Moving Average (EMA).
///
/// Uses the standard smoothing factor `α = 2 / (length + 1)`, fixed at
/// construction. Each value is computed as:
///
/// ```text
/// EMA = α × close + (1 − α) × prev_EMA
/// ```
///
/// The first `length` closes are summed to compute an SMA seed value,
/// emitted on the `length`-th update. After seeding, the EMA runs with
/// O(1) constant memory per tick via a single fused multiply-add. Gaps in
/// the input do not reset the recurrence.
///
/// # Example
///
/// ```
/// use quantedge_signals::{Ema, EmaConfig, IndicatorConfig};
/// use std::num::NonZero;
///
/// let mut ema = Ema::new(EmaConfig::new(NonZero::new(3).unwrap()));
///
/// // Seeding phase
/// assert_eq!(ema.update(2.0).unwrap(), None);
/// assert_eq!(ema.update(4.0).unwrap(), None);
///
/// // SMA seed = (2 + 4 + 6) / 3 = 4.0
/// assert_eq!(ema.update(6.0).unwrap(), Some(4.0));
///
/// // EMA(3) α = 0.5: 8 × 0.5 + 4 × 0.5 = 6.0
/// assert_eq!(ema.update(8.0).unwrap(), Some(6.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    alpha: f64,
    length: f64,
    phase: EmaPhase,
}

impl Indicator for Ema {
    type Config = EmaConfig;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            #[allow(clippy::cast_precision_loss)]
            alpha: 2.0 / (config.length + 1) as f64,
            #[allow(clippy::cast_precision_loss)]
            length: config.length as f64,
            phase: EmaPhase::Seeding { sum: 0.0, seen: 0 },
        }
    }

    #[inline]
    fn update(&mut self, close: Price) -> Result<Option<Price>, InvariantViolation> {
        let next = match &mut self.phase {
            EmaPhase::Seeding { sum, seen } => {
                *sum += close;
                *seen += 1;

                if *seen < self.config.length {
                    return Ok(None);
                }

                *sum / self.length
            }
            EmaPhase::Live { current } => self.alpha.mul_add(close - *current, *current),
        };

        if !next.is_finite() {
            return Err(InvariantViolation {
                indicator: "EMA",
                value: next,
            });
        }

        self.phase = EmaPhase::Live { current: next };

        Ok(Some(next))
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        match self.phase {
            EmaPhase::Live { current } => Some(current),
            EmaPhase::Seeding { .. } => None,
        }
    }

    fn reset(&mut self) {
        self.phase = EmaPhase::Seeding { sum: 0.0, seen: 0 };
    }
}

impl Ema {
    /// Smoothing factor `2 / (length + 1)`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({})", self.config.length)
    }
}
