use crate::{CrossDirection, IndicatorSnapshot, Price};

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Position of an RSI value relative to the [`RsiBands`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiZone {
    Overbought,
    Neutral,
    Oversold,
}

/// Overbought and oversold RSI thresholds.
///
/// `buffer` moves both thresholds towards the middle, so a value hovering
/// just short of a threshold is already classified as beyond it.
///
/// # Example
///
/// ```
/// use quantedge_signals::{RsiBands, RsiZone};
///
/// let bands = RsiBands::default();
/// assert_eq!(bands.zone(69.5), RsiZone::Overbought);
/// assert_eq!(bands.zone(50.0), RsiZone::Neutral);
/// assert_eq!(bands.zone(31.0), RsiZone::Oversold);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RsiBands {
    pub overbought: Price,
    pub oversold: Price,
    pub buffer: Price,
}

impl Default for RsiBands {
    fn default() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
            buffer: 1.0,
        }
    }
}

impl RsiBands {
    #[must_use]
    pub fn zone(&self, rsi: Price) -> RsiZone {
        if rsi >= self.overbought - self.buffer {
            RsiZone::Overbought
        } else if rsi <= self.oversold + self.buffer {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }

    /// Thresholds inside `[0, 100]`, a non-negative buffer, and a neutral
    /// zone left between the buffered thresholds.
    pub(crate) fn is_valid(&self) -> bool {
        let finite = self.overbought.is_finite()
            && self.oversold.is_finite()
            && self.buffer.is_finite();

        finite
            && self.buffer >= 0.0
            && self.oversold >= 0.0
            && self.overbought <= 100.0
            && self.oversold + self.buffer < self.overbought - self.buffer
    }
}

/// Crossover directions that may be emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
    #[default]
    Both,
}

impl TradeDirection {
    #[must_use]
    pub fn allows(self, direction: CrossDirection) -> bool {
        match self {
            Self::Both => true,
            Self::Long => direction == CrossDirection::Bullish,
            Self::Short => direction == CrossDirection::Bearish,
        }
    }
}

/// Why a crossover was held back by the [`CrossoverFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterReason {
    /// The direction is disabled.
    Direction,
    /// ATR relative to the close is below the minimum, or ATR is not live.
    LowVolatility,
    /// Bullish while overbought, or bearish while oversold.
    RsiExtreme,
}

impl Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Direction => "direction disabled",
            Self::LowVolatility => "volatility below minimum",
            Self::RsiExtreme => "rsi in extreme zone",
        };
        f.write_str(reason)
    }
}

/// Entry gates applied to crossovers before they are emitted.
///
/// The default lets every crossover through. The gates are checked in
/// order: direction, volatility (`atr / close >= min_atr_ratio`, only when
/// the ratio is positive), and the RSI guard (only when enabled).
///
/// # Example
///
/// ```
/// use quantedge_signals::{
///     CrossDirection, CrossoverFilter, FilterReason, IndicatorSnapshot, TradeDirection,
/// };
///
/// let filter = CrossoverFilter {
///     direction: TradeDirection::Long,
///     ..CrossoverFilter::default()
/// };
/// let snapshot = IndicatorSnapshot::default();
///
/// assert_eq!(filter.check(CrossDirection::Bullish, 100.0, &snapshot), None);
/// assert_eq!(
///     filter.check(CrossDirection::Bearish, 100.0, &snapshot),
///     Some(FilterReason::Direction)
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CrossoverFilter {
    pub direction: TradeDirection,
    /// Minimum `atr / close`. Zero disables the gate.
    pub min_atr_ratio: f64,
    /// Blocks bullish crossovers in the overbought zone and bearish ones
    /// in the oversold zone.
    pub rsi_guard: bool,
    pub bands: RsiBands,
}

impl CrossoverFilter {
    /// Returns the first gate `direction` fails at, or `None` if it passes.
    #[must_use]
    pub fn check(
        &self,
        direction: CrossDirection,
        close: Price,
        indicators: &IndicatorSnapshot,
    ) -> Option<FilterReason> {
        if !self.direction.allows(direction) {
            return Some(FilterReason::Direction);
        }

        if self.min_atr_ratio > 0.0 {
            let quiet = indicators
                .atr
                .is_none_or(|atr| atr / close < self.min_atr_ratio);
            if quiet {
                return Some(FilterReason::LowVolatility);
            }
        }

        if self.rsi_guard {
            let zone = indicators.rsi.map(|rsi| self.bands.zone(rsi));
            let blocked = matches!(
                (direction, zone),
                (CrossDirection::Bullish, Some(RsiZone::Overbought))
                    | (CrossDirection::Bearish, Some(RsiZone::Oversold))
            );
            if blocked {
                return Some(FilterReason::RsiExtreme);
            }
        }

        None
    }
}
