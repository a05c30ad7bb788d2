use std::{fmt::Display, num::NonZero};

use crate::{Indicator, IndicatorConfig, InvariantViolation, Ohlcv, Price};

/// Configuration for the Average True Range ([`Atr`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_signals::{AtrConfig, IndicatorConfig};
/// use std::num::NonZero;
///
/// let config = AtrConfig::new(NonZero::new(14).unwrap());
/// assert_eq!(config.length(), 14);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AtrConfig {
    length: usize,
}

impl IndicatorConfig for AtrConfig {
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

impl Display for AtrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AtrConfig({})", self.length)
    }
}

#[derive(Clone, Copy, Debug)]
enum AtrPhase {
    Seeding { sum: Price, seen: usize },
    Live { current: Price },
}

/// Average True Range (ATR) with Wilder's smoothing.
///
/// The true range of a bar needs the previous close, so the first bar only
/// records its close:
///
/// ```text
/// TR  = max(high − low, |high − prev_close|, |low − prev_close|)
/// ATR = (prev_ATR × (length − 1) + TR) / length
/// ```
///
/// The first `length` true ranges are averaged into an SMA seed, emitted
/// on update `length + 1`. A negative or non-finite value is reported as
/// an [`InvariantViolation`].
///
/// [`compute`](Indicator::compute) reads the high, low and close of the
/// bar. [`update`](Indicator::update) only has a close and treats the bar
/// as flat, so the true range is the gap from the previous close.
///
/// # Example
///
/// ```
/// use quantedge_signals::{Atr, AtrConfig, IndicatorConfig, PriceBar};
/// use std::num::NonZero;
///
/// let mut atr = Atr::new(AtrConfig::new(NonZero::new(2).unwrap()));
///
/// assert_eq!(atr.compute(&PriceBar::new(1, 10.0, 11.0, 9.0, 10.0)).unwrap(), None);
/// assert_eq!(atr.compute(&PriceBar::new(2, 10.0, 12.0, 10.0, 11.0)).unwrap(), None);
///
/// // TRs = 2, 4 → seed = 3
/// let value = atr.compute(&PriceBar::new(3, 11.0, 13.0, 9.0, 12.0)).unwrap();
/// assert_eq!(value, Some(3.0));
/// ```
#[derive(Clone, Debug)]
pub struct Atr {
    config: AtrConfig,
    prev_close: Option<Price>,
    phase: AtrPhase,
    length_reciprocal: f64,
    length_minus_one: f64,
}

impl Indicator for Atr {
    type Config = AtrConfig;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            prev_close: None,
            phase: Self::seeding(),
            #[allow(clippy::cast_precision_loss)]
            length_reciprocal: 1.0 / config.length() as f64,
            #[allow(clippy::cast_precision_loss)]
            length_minus_one: (config.length() - 1) as f64,
        }
    }

    #[inline]
    fn update(&mut self, close: Price) -> Result<Option<Price>, InvariantViolation> {
        self.step(close, close, close)
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Result<Option<Price>, InvariantViolation> {
        self.step(ohlcv.high(), ohlcv.low(), ohlcv.close())
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        match self.phase {
            AtrPhase::Live { current } => Some(current),
            AtrPhase::Seeding { .. } => None,
        }
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.phase = Self::seeding();
    }
}

impl Atr {
    fn seeding() -> AtrPhase {
        AtrPhase::Seeding { sum: 0.0, seen: 0 }
    }

    #[inline]
    fn true_range(high: Price, low: Price, prev_close: Price) -> Price {
        (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs())
    }

    fn step(
        &mut self,
        high: Price,
        low: Price,
        close: Price,
    ) -> Result<Option<Price>, InvariantViolation> {
        let Some(prev_close) = self.prev_close else {
            self.prev_close = Some(close);
            return Ok(None);
        };

        let tr = Self::true_range(high, low, prev_close);

        let value = match self.phase {
            AtrPhase::Seeding { sum, seen } => {
                let sum = sum + tr;
                let seen = seen + 1;

                if seen < self.config.length {
                    self.prev_close = Some(close);
                    self.phase = AtrPhase::Seeding { sum, seen };
                    return Ok(None);
                }

                sum * self.length_reciprocal
            }
            AtrPhase::Live { current } => {
                current.mul_add(self.length_minus_one, tr) * self.length_reciprocal
            }
        };

        if !value.is_finite() || value < 0.0 {
            return Err(InvariantViolation {
                indicator: "ATR",
                value,
            });
        }

        self.prev_close = Some(close);
        self.phase = AtrPhase::Live { current: value };

        Ok(Some(value))
    }
}

impl Display for Atr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ATR({})", self.config.length)
    }
}
