//! Streaming EMA crossover and RSI divergence signals for Rust.
//!
//! A [`SignalEngine`] consumes bars one at a time, updates a fast and a
//! slow [`Ema`] and an [`Rsi`] incrementally, and emits typed
//! [`SignalEvent`]s:
//!
//! - EMA crossovers, bullish or bearish, on a sign change of
//!   `fast − slow`.
//! - Regular and hidden RSI divergences between successive confirmed
//!   swing highs or swing lows.
//!
//! An [`Atr`] runs alongside for volatility. Crossovers are tagged with the
//! [`RsiZone`] they happened in and can be gated by a [`CrossoverFilter`]
//! on direction, ATR relative to price, and RSI extremes.
//!
//! Every value is `None` until enough data has been received, and no event
//! is emitted until all indicators are live. Bars with a timestamp that is
//! not strictly increasing are dropped and reported as an [`Anomaly`].
//!
//! Run one engine per instrument. [`run`] and [`spawn_instrument`] drive an
//! engine from any [`futures::Stream`] of [`PriceBar`]s into a bounded
//! [`EventQueue`].
//!
//! [`Ema`], [`Rsi`] and [`Atr`] expose [`new`](Ema::new), [`update`](Ema::update),
//! [`compute`](Ema::compute), and [`value`](Ema::value) as inherent
//! methods, so they can be used standalone without importing
//! [`Indicator`].
//!
//! # Example
//!
//! ```
//! use quantedge_signals::{PriceBar, SignalConfig, SignalEngine, SignalKind};
//!
//! let config = SignalConfig::builder()
//!     .fast_period(2)
//!     .slow_period(3)
//!     .rsi_period(2)
//!     .build()
//!     .unwrap();
//! let mut engine = SignalEngine::new(config);
//!
//! let closes = [10.0, 9.0, 8.0, 7.0, 12.0];
//! let events: Vec<_> = (1..)
//!     .zip(closes)
//!     .flat_map(|(ts, close)| engine.process(&PriceBar::flat(ts, close)).unwrap().into_events())
//!     .collect();
//!
//! assert_eq!(events[0].kind, SignalKind::CrossoverBullish);
//! assert_eq!(events[0].timestamp, 5);
//! ```

mod atr;
mod config;
mod crossover;
mod divergence;
mod ema;
mod engine;
mod error;
mod filter;
mod indicator;
mod ohlcv;
mod queue;
mod resample;
mod ring_buffer;
mod rsi;
mod runner;
mod series;
mod signal;
mod swing;

pub use crate::config::{
    MAX_CAPACITY, MAX_PERIOD, MAX_RESAMPLE_FACTOR, MAX_SWING_HISTORY, MAX_SWING_LAG, SignalConfig,
    SignalConfigBuilder,
};
pub use crate::error::{Anomaly, ConfigError, EngineError, InvariantViolation};
pub use crate::indicator::{Indicator, IndicatorConfig};
pub use crate::ohlcv::{Ohlcv, Price, PriceBar, Timestamp};
pub use crate::resample::{BarAggregator, resample};
pub use crate::series::PriceSeries;

pub use crate::atr::{Atr, AtrConfig};
pub use crate::ema::{Ema, EmaConfig};
pub use crate::rsi::{Rsi, RsiConfig};

pub use crate::crossover::{CrossDirection, Crossover, CrossoverDetector};
pub use crate::filter::{CrossoverFilter, FilterReason, RsiBands, RsiZone, TradeDirection};
pub use crate::divergence::{Divergence, DivergenceDetector, DivergenceKind};
pub use crate::swing::{SwingExtractor, SwingKind, SwingPoint, SwingSample, SwingUpdate};

pub use crate::engine::{BarOutcome, EngineState, EngineStats, SignalEngine};
pub use crate::queue::EventQueue;
pub use crate::runner::{RunExit, run, spawn_instrument};
pub use crate::signal::{IndicatorSnapshot, SignalEvent, SignalKind, SwingPair};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::update`].
            ///
            /// # Errors
            ///
            /// Same as [`Indicator::update`].
            #[inline]
            pub fn update(&mut self, close: Price) -> Result<Option<Price>, InvariantViolation> {
                <Self as Indicator>::update(self, close)
            }

            /// See [`Indicator::compute`].
            ///
            /// # Errors
            ///
            /// Same as [`Indicator::compute`].
            #[inline]
            pub fn compute(
                &mut self,
                ohlcv: &impl Ohlcv,
            ) -> Result<Option<Price>, InvariantViolation> {
                <Self as Indicator>::compute(self, ohlcv)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<Price> {
                <Self as Indicator>::value(self)
            }
        }
    };
}

impl_indicator_methods!(Ema, EmaConfig);
impl_indicator_methods!(Rsi, RsiConfig);
impl_indicator_methods!(Atr, AtrConfig);

#[cfg(test)]
mod test_util;
