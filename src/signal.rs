use crate::{
    CrossDirection, Crossover, Divergence, DivergenceKind, Price, PriceBar, RsiZone, SwingPoint,
    Timestamp,
};

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type of a [`SignalEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    CrossoverBullish,
    CrossoverBearish,
    DivergenceBullishRegular,
    DivergenceBearishRegular,
    DivergenceBullishHidden,
    DivergenceBearishHidden,
}

impl SignalKind {
    #[must_use]
    pub fn is_crossover(self) -> bool {
        matches!(self, Self::CrossoverBullish | Self::CrossoverBearish)
    }

    #[must_use]
    pub fn is_bullish(self) -> bool {
        matches!(
            self,
            Self::CrossoverBullish | Self::DivergenceBullishRegular | Self::DivergenceBullishHidden
        )
    }
}

impl From<CrossDirection> for SignalKind {
    fn from(direction: CrossDirection) -> Self {
        match direction {
            CrossDirection::Bullish => Self::CrossoverBullish,
            CrossDirection::Bearish => Self::CrossoverBearish,
        }
    }
}

impl From<DivergenceKind> for SignalKind {
    fn from(kind: DivergenceKind) -> Self {
        match kind {
            DivergenceKind::BullishRegular => Self::DivergenceBullishRegular,
            DivergenceKind::BearishRegular => Self::DivergenceBearishRegular,
            DivergenceKind::BullishHidden => Self::DivergenceBullishHidden,
            DivergenceKind::BearishHidden => Self::DivergenceBearishHidden,
        }
    }
}

impl Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Indicator values at the triggering bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub fast_ema: Option<Price>,
    pub slow_ema: Option<Price>,
    pub rsi: Option<Price>,
    pub atr: Option<Price>,
}

/// The two swings a divergence event compared, older first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwingPair {
    pub prior: SwingPoint,
    pub current: SwingPoint,
}

/// A classified stream transition, emitted at most once per occurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub kind: SignalKind,
    /// Timestamp of the triggering bar.
    pub timestamp: Timestamp,
    pub bar: PriceBar,
    pub indicators: IndicatorSnapshot,
    /// Zone of the RSI at a crossover. `None` for divergence events and
    /// while the RSI is seeding.
    pub rsi_zone: Option<RsiZone>,
    /// Set for divergence events only.
    pub swings: Option<SwingPair>,
}

impl SignalEvent {
    #[must_use]
    pub fn crossover(
        crossover: &Crossover,
        bar: PriceBar,
        indicators: IndicatorSnapshot,
        rsi_zone: Option<RsiZone>,
    ) -> Self {
        Self {
            kind: crossover.direction.into(),
            timestamp: bar.timestamp,
            bar,
            indicators,
            rsi_zone,
            swings: None,
        }
    }

    #[must_use]
    pub fn divergence(
        divergence: &Divergence,
        bar: PriceBar,
        indicators: IndicatorSnapshot,
    ) -> Self {
        Self {
            kind: divergence.kind.into(),
            timestamp: bar.timestamp,
            bar,
            indicators,
            rsi_zone: None,
            swings: Some(SwingPair {
                prior: divergence.prior,
                current: divergence.current,
            }),
        }
    }
}
