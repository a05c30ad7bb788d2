use crate::Price;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of an EMA crossover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossDirection {
    /// Fast EMA moved above the slow EMA.
    Bullish,
    /// Fast EMA moved below the slow EMA.
    Bearish,
}

/// A detected sign change of `fast − slow`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossover {
    pub direction: CrossDirection,
    pub fast: Price,
    pub slow: Price,
}

/// Detects sign changes in the spread between a fast and a slow EMA.
///
/// The first update on which both EMAs are live only records the baseline
/// sign; a crossover needs a previous sign to compare against.
///
/// ```text
/// prev ≤ 0, now > 0  → Bullish
/// prev ≥ 0, now < 0  → Bearish
/// ```
#[derive(Clone, Debug, Default)]
pub struct CrossoverDetector {
    prev: Option<Ordering>,
}

impl CrossoverDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the latest EMA pair. `None` for either side means that EMA is
    /// still seeding; the baseline is then cleared.
    pub fn update(&mut self, fast: Option<Price>, slow: Option<Price>) -> Option<Crossover> {
        let (Some(fast), Some(slow)) = (fast, slow) else {
            self.prev = None;
            return None;
        };

        let sign = (fast - slow).partial_cmp(&0.0)?;
        let prev = self.prev.replace(sign)?;

        let direction = match (prev, sign) {
            (Ordering::Less | Ordering::Equal, Ordering::Greater) => CrossDirection::Bullish,
            (Ordering::Greater | Ordering::Equal, Ordering::Less) => CrossDirection::Bearish,
            _ => return None,
        };

        Some(Crossover {
            direction,
            fast,
            slow,
        })
    }

    /// `true` once a baseline sign has been recorded.
    #[must_use]
    pub fn has_baseline(&self) -> bool {
        self.prev.is_some()
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directions(pairs: &[(Option<f64>, Option<f64>)]) -> Vec<Option<CrossDirection>> {
        let mut detector = CrossoverDetector::new();
        pairs
            .iter()
            .map(|&(fast, slow)| detector.update(fast, slow).map(|c| c.direction))
            .collect()
    }

    mod baseline {
        use super::*;

        #[test]
        fn silent_while_seeding() {
            let got = directions(&[(None, None), (Some(2.0), None), (None, Some(1.0))]);
            assert_eq!(got, vec![None, None, None]);
        }

        #[test]
        fn first_live_bar_only_records_sign() {
            let mut detector = CrossoverDetector::new();
            // Fast already above slow on the first live bar: no event.
            assert_eq!(detector.update(Some(11.0), Some(10.0)), None);
            assert!(detector.has_baseline());
        }

        #[test]
        fn flip_right_after_baseline_emits() {
            let got = directions(&[(Some(9.0), Some(10.0)), (Some(11.0), Some(10.0))]);
            assert_eq!(got, vec![None, Some(CrossDirection::Bullish)]);
        }
    }

    mod flips {
        use super::*;

        #[test]
        fn bullish_then_bearish() {
            let got = directions(&[
                (Some(9.0), Some(10.0)),
                (Some(10.5), Some(10.0)),
                (Some(10.6), Some(10.0)),
                (Some(9.5), Some(10.0)),
            ]);
            assert_eq!(
                got,
                vec![
                    None,
                    Some(CrossDirection::Bullish),
                    None,
                    Some(CrossDirection::Bearish)
                ]
            );
        }

        #[test]
        fn touching_zero_then_crossing_emits_once() {
            let got = directions(&[
                (Some(9.0), Some(10.0)),
                (Some(10.0), Some(10.0)),
                (Some(10.0), Some(10.0)),
                (Some(11.0), Some(10.0)),
                (Some(10.0), Some(10.0)),
                (Some(9.0), Some(10.0)),
            ]);
            assert_eq!(
                got,
                vec![
                    None,
                    None,
                    None,
                    Some(CrossDirection::Bullish),
                    None,
                    Some(CrossDirection::Bearish)
                ]
            );
        }

        #[test]
        fn carries_ema_values() {
            let mut detector = CrossoverDetector::new();
            detector.update(Some(1.0), Some(2.0));
            let cross = detector.update(Some(3.0), Some(2.5)).unwrap();
            assert_eq!(
                cross,
                Crossover {
                    direction: CrossDirection::Bullish,
                    fast: 3.0,
                    slow: 2.5
                }
            );
        }
    }

    mod reset {
        use super::*;

        #[test]
        fn clears_baseline() {
            let mut detector = CrossoverDetector::new();
            detector.update(Some(1.0), Some(2.0));
            detector.reset();
            assert!(!detector.has_baseline());
            assert_eq!(detector.update(Some(3.0), Some(2.0)), None);
        }
    }
}
