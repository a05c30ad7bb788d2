use std::{fmt::Display, num::NonZero};

use crate::{Indicator, IndicatorConfig, InvariantViolation, Price};

/// Configuration for the Relative Strength Index ([`Rsi`])
/// indicator.
///
/// RSI uses Wilder's smoothing, which has infinite memory: the
/// SMA seed (first `length` price changes) influences all
/// subsequent values. Output begins at update `length + 1`.
///
/// # Example
///
/// ```
/// use quantedge_signals::{IndicatorConfig, RsiConfig};
/// use std::num::NonZero;
///
/// let config = RsiConfig::new(NonZero::new(14).unwrap());
/// assert_eq!(config.length(), 14);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RsiConfig {
    length: usize,
}

impl IndicatorConfig for RsiConfig {
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

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({})", self.length)
    }
}

#[derive(Clone, Copy, Debug)]
enum RsiPhase {
    Seeding {
        sum_gain: f64,
        sum_loss: f64,
        seen_changes: usize,
    },
    Active {
        avg_gain: f64,
        avg_loss: f64,
    },
}

/// Relative Strength Index (RSI) with Wilder's smoothing.
///
/// Measures the speed and magnitude of recent price changes on
/// a 0–100 scale.
///
/// The first `length` price changes are averaged with a simple
/// mean (SMA seed). After seeding, gains and losses are smoothed
/// with Wilder's method:
///
/// ```text
/// avg_gain = (prev_avg_gain × (length − 1) + gain) / length
/// avg_loss = (prev_avg_loss × (length − 1) + loss) / length
/// RSI      = 100 − 100 / (1 + avg_gain / avg_loss)
/// ```
///
/// RSI is 100 when `avg_loss` is zero and `avg_gain` positive, and 50 when
/// both are zero. A value outside `[0, 100]` is reported as an
/// [`InvariantViolation`], never clamped.
///
/// # Example
///
/// ```
/// use quantedge_signals::{IndicatorConfig, Rsi, RsiConfig};
/// use std::num::NonZero;
///
/// let mut rsi = Rsi::new(RsiConfig::new(NonZero::new(3).unwrap()));
///
/// // Seeding: need 3 price changes (4 closes)
/// assert_eq!(rsi.update(10.0).unwrap(), None);
/// assert_eq!(rsi.update(12.0).unwrap(), None);
/// assert_eq!(rsi.update(11.0).unwrap(), None);
///
/// // changes = +2, −1, +2 → avg_gain=4/3, avg_loss=1/3 → RSI=80
/// let value = rsi.update(13.0).unwrap().unwrap();
/// assert!((value - 80.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    prev_close: Option<Price>,
    phase: RsiPhase,
    current: Option<Price>,
    length_reciprocal: f64,
    length_minus_one: f64,
}

impl Indicator for Rsi {
    type Config = RsiConfig;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            prev_close: None,
            phase: Self::seeding(),
            current: None,
            #[allow(clippy::cast_precision_loss)]
            length_reciprocal: 1.0 / config.length() as f64,
            #[allow(clippy::cast_precision_loss)]
            length_minus_one: (config.length() - 1) as f64,
        }
    }

    #[inline]
    fn update(&mut self, close: Price) -> Result<Option<Price>, InvariantViolation> {
        let Some(prev_close) = self.prev_close else {
            self.prev_close = Some(close);
            return Ok(None);
        };

        let (gain, loss) = Self::gain_and_loss(prev_close, close);

        let (phase, value) = match self.phase {
            RsiPhase::Seeding {
                sum_gain,
                sum_loss,
                seen_changes,
            } => {
                let sum_gain = sum_gain + gain;
                let sum_loss = sum_loss + loss;
                let seen_changes = seen_changes + 1;

                if seen_changes < self.config.length {
                    self.prev_close = Some(close);
                    self.phase = RsiPhase::Seeding {
                        sum_gain,
                        sum_loss,
                        seen_changes,
                    };
                    return Ok(None);
                }

                let avg_gain = sum_gain * self.length_reciprocal;
                let avg_loss = sum_loss * self.length_reciprocal;

                (
                    RsiPhase::Active { avg_gain, avg_loss },
                    Self::rsi_from_averages(avg_gain, avg_loss),
                )
            }

            RsiPhase::Active { avg_gain, avg_loss } => {
                let avg_gain =
                    avg_gain.mul_add(self.length_minus_one, gain) * self.length_reciprocal;
                let avg_loss =
                    avg_loss.mul_add(self.length_minus_one, loss) * self.length_reciprocal;

                (
                    RsiPhase::Active { avg_gain, avg_loss },
                    Self::rsi_from_averages(avg_gain, avg_loss),
                )
            }
        };

        // State only advances once the value is known to be in range.
        if !(0.0..=100.0).contains(&value) {
            return Err(InvariantViolation {
                indicator: "RSI",
                value,
            });
        }

        self.prev_close = Some(close);
        self.phase = phase;
        self.current = Some(value);

        Ok(self.current)
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.phase = Self::seeding();
        self.current = None;
    }
}

impl Rsi {
    fn seeding() -> RsiPhase {
        RsiPhase::Seeding {
            sum_gain: 0.0,
            sum_loss: 0.0,
            seen_changes: 0,
        }
    }

    #[inline]
    fn gain_and_loss(prev_close: Price, close: Price) -> (Price, Price) {
        let change = close - prev_close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        (gain, loss)
    }

    /// `100 − 100 / (1 + RS)`, written as `100 × gain / (gain + loss)` so a
    /// zero loss needs no special case.
    #[inline]
    fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        let sum = avg_gain + avg_loss;
        if sum == 0.0 {
            50.0
        } else {
            100.0 * avg_gain / sum
        }
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({})", self.config.length)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{bar, nz};

    fn rsi(length: usize) -> Rsi {
        Rsi::new(RsiConfig::new(nz(length)))
    }

    /// Returns a seeded RSI(3) after closes 10, 12, 11, 13.
    fn seeded_rsi3() -> Rsi {
        let mut rsi = rsi(3);
        for close in [10.0, 12.0, 11.0, 13.0] {
            rsi.update(close).unwrap();
        }
        rsi
    }

    mod seeding {
        use super::*;

        #[test]
        fn none_until_length_plus_one_closes() {
            let mut rsi = rsi(3);
            assert_eq!(rsi.update(10.0), Ok(None));
            assert_eq!(rsi.update(12.0), Ok(None));
            assert_eq!(rsi.update(11.0), Ok(None));
            assert!(rsi.update(13.0).unwrap().is_some());
        }

        #[test]
        fn first_value_uses_simple_averages() {
            // changes = +2, −1, +2 → avg_gain=4/3, avg_loss=1/3 → RSI=80
            let rsi = seeded_rsi3();
            assert!((rsi.value().unwrap() - 80.0).abs() < 1e-9);
        }

        #[test]
        fn length_one_emits_on_second_close() {
            let mut rsi = rsi(1);
            assert_eq!(rsi.update(10.0), Ok(None));
            assert_eq!(rsi.update(11.0), Ok(Some(100.0)));
            assert_eq!(rsi.update(9.0), Ok(Some(0.0)));
        }
    }

    mod wilder {
        use super::*;

        #[test]
        fn smooths_after_seed() {
            // seed: avg_gain=4/3, avg_loss=1/3
            // close 12: change −1
            // avg_gain = (4/3 × 2 + 0) / 3 = 8/9
            // avg_loss = (1/3 × 2 + 1) / 3 = 5/9
            // RSI = 100 × (8/9) / (13/9) = 800/13
            let mut rsi = seeded_rsi3();
            let value = rsi.update(12.0).unwrap().unwrap();
            assert!((value - 800.0 / 13.0).abs() < 1e-9);
        }

        #[test]
        fn matches_textbook_formula() {
            let closes = [
                44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89,
                46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
            ];
            let mut rsi = rsi(14);
            let mut avg_gain = 0.0;
            let mut avg_loss = 0.0;

            for (i, pair) in closes.windows(2).enumerate() {
                let change: f64 = pair[1] - pair[0];
                let (gain, loss) = (change.max(0.0), (-change).max(0.0));
                if i < 14 {
                    avg_gain += gain / 14.0;
                    avg_loss += loss / 14.0;
                } else {
                    avg_gain = (avg_gain * 13.0 + gain) / 14.0;
                    avg_loss = (avg_loss * 13.0 + loss) / 14.0;
                }
            }
            for close in closes {
                rsi.update(close).unwrap();
            }

            let expected = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
            assert!((rsi.value().unwrap() - expected).abs() < 1e-9);
        }
    }

    mod bounds {
        use super::*;

        #[test]
        fn constant_price_gives_fifty() {
            let mut rsi = rsi(4);
            for _ in 0..5 {
                rsi.update(42.0).unwrap();
            }
            assert_eq!(rsi.value(), Some(50.0));
            for _ in 0..20 {
                assert_eq!(rsi.update(42.0), Ok(Some(50.0)));
            }
        }

        #[test]
        fn monotonic_rise_gives_hundred() {
            let mut rsi = rsi(3);
            for close in [1.0, 2.0, 3.0, 4.0, 5.0] {
                rsi.update(close).unwrap();
            }
            assert_eq!(rsi.value(), Some(100.0));
        }

        #[test]
        fn monotonic_fall_gives_zero() {
            let mut rsi = rsi(3);
            for close in [5.0, 4.0, 3.0, 2.0, 1.0] {
                rsi.update(close).unwrap();
            }
            assert_eq!(rsi.value(), Some(0.0));
        }

        #[test]
        fn never_leaves_range_on_volatile_input() {
            let mut rsi = rsi(5);
            let mut close = 100.0;
            for i in 0_u32..500 {
                // Deterministic zig-zag with spikes.
                let step = f64::from(i % 7) * 3.5 - 10.0 + if i % 53 == 0 { 400.0 } else { 0.0 };
                close = f64::max(close + step, 0.01);
                if let Some(value) = rsi.update(close).unwrap() {
                    assert!((0.0..=100.0).contains(&value), "value {value} at {i}");
                }
            }
        }

        #[test]
        fn infinite_input_fails_fast() {
            // avg_gain becomes infinite, 100 × ∞ / ∞ is NaN
            let mut rsi = seeded_rsi3();
            let err = rsi.update(f64::INFINITY).unwrap_err();
            assert_eq!(err.indicator, "RSI");
            assert!(err.value.is_nan());
        }

        #[test]
        fn violation_leaves_state_untouched() {
            let mut rsi = seeded_rsi3();
            rsi.update(f64::INFINITY).unwrap_err();
            assert!((rsi.value().unwrap() - 80.0).abs() < 1e-9);

            // Continues as if the bad close never arrived.
            let value = rsi.update(12.0).unwrap().unwrap();
            assert!((value - 800.0 / 13.0).abs() < 1e-9);
        }

        #[test]
        fn violation_on_seed_leaves_state_untouched() {
            let mut rsi = rsi(3);
            for close in [10.0, 12.0, 11.0] {
                rsi.update(close).unwrap();
            }
            rsi.update(f64::INFINITY).unwrap_err();

            let value = rsi.update(13.0).unwrap().unwrap();
            assert!((value - 80.0).abs() < 1e-9);
        }
    }

    mod reset {
        use super::*;

        #[test]
        fn reseeds_from_scratch() {
            let mut rsi = seeded_rsi3();
            rsi.reset();
            assert_eq!(rsi.value(), None);
            assert_eq!(rsi.compute(&bar(10.0, 1)), Ok(None));
            assert_eq!(rsi.compute(&bar(12.0, 2)), Ok(None));
            assert_eq!(rsi.compute(&bar(11.0, 3)), Ok(None));
            assert!(rsi.compute(&bar(13.0, 4)).unwrap().is_some());
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            assert_eq!(rsi(14).to_string(), "RSI(14)");
            assert_eq!(RsiConfig::new(nz(14)).to_string(), "RsiConfig(14)");
        }
    }
}
