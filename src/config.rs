use crate::{ConfigError, CrossoverFilter, RsiBands, TradeDirection};

use serde::Deserialize;
use std::{fmt::Display, num::NonZero};

/// Largest accepted indicator period.
pub const MAX_PERIOD: usize = 10_000;
/// Largest accepted `swing_confirmation_lag`.
pub const MAX_SWING_LAG: usize = 1_000;
/// Largest accepted `swing_history_depth`.
pub const MAX_SWING_HISTORY: usize = 10_000;
/// Largest accepted bar or event buffer capacity.
pub const MAX_CAPACITY: usize = 1 << 20;
/// Largest accepted `resample_factor`.
pub const MAX_RESAMPLE_FACTOR: usize = 1_000;

const fn non_zero(n: usize) -> NonZero<usize> {
    match NonZero::new(n) {
        Some(n) => n,
        None => panic!("default must be non-zero"),
    }
}

const DEFAULT_FAST_PERIOD: NonZero<usize> = non_zero(9);
const DEFAULT_SLOW_PERIOD: NonZero<usize> = non_zero(21);
const DEFAULT_RSI_PERIOD: NonZero<usize> = non_zero(14);
const DEFAULT_ATR_PERIOD: NonZero<usize> = non_zero(14);
const DEFAULT_SWING_LAG: NonZero<usize> = non_zero(2);
const DEFAULT_SWING_HISTORY: NonZero<usize> = non_zero(5);
const DEFAULT_BUFFER_CAPACITY: NonZero<usize> = non_zero(500);
const DEFAULT_EVENT_BUFFER_CAPACITY: NonZero<usize> = non_zero(256);
const DEFAULT_RESAMPLE_FACTOR: NonZero<usize> = non_zero(1);

/// Validated parameters of a [`SignalEngine`](crate::SignalEngine).
///
/// Built with [`SignalConfig::builder`] or parsed from TOML with
/// [`SignalConfig::from_toml`]. Invalid values are rejected before any
/// bar is processed.
///
/// | option                   | default | range            |
/// |--------------------------|---------|------------------|
/// | `fast_period`            | 9       | 1 ..= 10 000     |
/// | `slow_period`            | 21      | 1 ..= 10 000     |
/// | `rsi_period`             | 14      | 1 ..= 10 000     |
/// | `atr_period`             | 14      | 1 ..= 10 000     |
/// | `swing_confirmation_lag` | 2       | 1 ..= 1 000      |
/// | `swing_history_depth`    | 5       | 2 ..= 10 000     |
/// | `buffer_capacity`        | 500     | 1 ..= 1 048 576  |
/// | `event_buffer_capacity`  | 256     | 1 ..= 1 048 576  |
/// | `resample_factor`        | 1       | 1 ..= 1 000      |
/// | `rsi_overbought`         | 70.0    | ..= 100          |
/// | `rsi_oversold`           | 30.0    | 0 ..             |
/// | `rsi_buffer`             | 1.0     | 0 ..             |
/// | `direction`              | `both`  | `long`, `short`, `both` |
/// | `min_atr_ratio`          | 0.0     | 0 .. (0 disables) |
/// | `rsi_guard`              | `false` |                  |
///
/// The RSI bands always classify crossover events into an
/// [`RsiZone`](crate::RsiZone). `direction`, `min_atr_ratio` and
/// `rsi_guard` make up the [`CrossoverFilter`]; with the defaults every
/// crossover is emitted.
///
/// # Example
///
/// ```
/// use quantedge_signals::SignalConfig;
///
/// let config = SignalConfig::builder()
///     .fast_period(3)
///     .slow_period(5)
///     .rsi_period(4)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.slow_period().get(), 5);
/// assert_eq!(config.buffer_capacity().get(), 500);
/// ```
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct SignalConfig {
    fast_period: NonZero<usize>,
    slow_period: NonZero<usize>,
    rsi_period: NonZero<usize>,
    atr_period: NonZero<usize>,
    swing_confirmation_lag: NonZero<usize>,
    swing_history_depth: NonZero<usize>,
    buffer_capacity: NonZero<usize>,
    event_buffer_capacity: NonZero<usize>,
    resample_factor: NonZero<usize>,
    filter: CrossoverFilter,
}

impl SignalConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> SignalConfigBuilder {
        SignalConfigBuilder::default()
    }

    /// Parses a TOML document. Missing keys take their defaults; unknown
    /// keys are rejected.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed input, otherwise any error of
    /// [`SignalConfigBuilder::build`].
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str::<SignalConfigBuilder>(source)
            .map_err(|e| ConfigError::Parse(e.to_string()))?
            .build()
    }

    #[must_use]
    pub fn fast_period(&self) -> NonZero<usize> {
        self.fast_period
    }

    #[must_use]
    pub fn slow_period(&self) -> NonZero<usize> {
        self.slow_period
    }

    #[must_use]
    pub fn rsi_period(&self) -> NonZero<usize> {
        self.rsi_period
    }

    #[must_use]
    pub fn atr_period(&self) -> NonZero<usize> {
        self.atr_period
    }

    #[must_use]
    pub fn swing_confirmation_lag(&self) -> NonZero<usize> {
        self.swing_confirmation_lag
    }

    #[must_use]
    pub fn swing_history_depth(&self) -> NonZero<usize> {
        self.swing_history_depth
    }

    #[must_use]
    pub fn buffer_capacity(&self) -> NonZero<usize> {
        self.buffer_capacity
    }

    #[must_use]
    pub fn event_buffer_capacity(&self) -> NonZero<usize> {
        self.event_buffer_capacity
    }

    /// Number of input bars merged into each bar the runner feeds the
    /// engine. See [`BarAggregator`](crate::BarAggregator).
    #[must_use]
    pub fn resample_factor(&self) -> NonZero<usize> {
        self.resample_factor
    }

    #[must_use]
    pub fn rsi_bands(&self) -> RsiBands {
        self.filter.bands
    }

    #[must_use]
    pub fn crossover_filter(&self) -> CrossoverFilter {
        self.filter
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            fast_period: DEFAULT_FAST_PERIOD,
            slow_period: DEFAULT_SLOW_PERIOD,
            rsi_period: DEFAULT_RSI_PERIOD,
            atr_period: DEFAULT_ATR_PERIOD,
            swing_confirmation_lag: DEFAULT_SWING_LAG,
            swing_history_depth: DEFAULT_SWING_HISTORY,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            event_buffer_capacity: DEFAULT_EVENT_BUFFER_CAPACITY,
            resample_factor: DEFAULT_RESAMPLE_FACTOR,
            filter: CrossoverFilter::default(),
        }
    }
}

impl Display for SignalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SignalConfig(ema {}/{}, rsi {}, atr {}, lag {}, depth {})",
            self.fast_period,
            self.slow_period,
            self.rsi_period,
            self.atr_period,
            self.swing_confirmation_lag,
            self.swing_history_depth
        )
    }
}

/// Builder for [`SignalConfig`]. Starts from the defaults.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalConfigBuilder {
    fast_period: usize,
    slow_period: usize,
    rsi_period: usize,
    atr_period: usize,
    swing_confirmation_lag: usize,
    swing_history_depth: usize,
    buffer_capacity: usize,
    event_buffer_capacity: usize,
    resample_factor: usize,
    rsi_overbought: f64,
    rsi_oversold: f64,
    rsi_buffer: f64,
    direction: TradeDirection,
    min_atr_ratio: f64,
    rsi_guard: bool,
}

impl Default for SignalConfigBuilder {
    fn default() -> Self {
        let defaults = SignalConfig::default();
        let filter = defaults.filter;

        Self {
            fast_period: defaults.fast_period.get(),
            slow_period: defaults.slow_period.get(),
            rsi_period: defaults.rsi_period.get(),
            atr_period: defaults.atr_period.get(),
            swing_confirmation_lag: defaults.swing_confirmation_lag.get(),
            swing_history_depth: defaults.swing_history_depth.get(),
            buffer_capacity: defaults.buffer_capacity.get(),
            event_buffer_capacity: defaults.event_buffer_capacity.get(),
            resample_factor: defaults.resample_factor.get(),
            rsi_overbought: filter.bands.overbought,
            rsi_oversold: filter.bands.oversold,
            rsi_buffer: filter.bands.buffer,
            direction: filter.direction,
            min_atr_ratio: filter.min_atr_ratio,
            rsi_guard: filter.rsi_guard,
        }
    }
}

impl SignalConfigBuilder {
    #[must_use]
    pub fn fast_period(mut self, period: usize) -> Self {
        self.fast_period = period;
        self
    }

    #[must_use]
    pub fn slow_period(mut self, period: usize) -> Self {
        self.slow_period = period;
        self
    }

    #[must_use]
    pub fn rsi_period(mut self, period: usize) -> Self {
        self.rsi_period = period;
        self
    }

    #[must_use]
    pub fn atr_period(mut self, period: usize) -> Self {
        self.atr_period = period;
        self
    }

    #[must_use]
    pub fn swing_confirmation_lag(mut self, lag: usize) -> Self {
        self.swing_confirmation_lag = lag;
        self
    }

    #[must_use]
    pub fn swing_history_depth(mut self, depth: usize) -> Self {
        self.swing_history_depth = depth;
        self
    }

    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    #[must_use]
    pub fn event_buffer_capacity(mut self, capacity: usize) -> Self {
        self.event_buffer_capacity = capacity;
        self
    }

    #[must_use]
    pub fn resample_factor(mut self, factor: usize) -> Self {
        self.resample_factor = factor;
        self
    }

    #[must_use]
    pub fn rsi_bands(mut self, bands: RsiBands) -> Self {
        self.rsi_overbought = bands.overbought;
        self.rsi_oversold = bands.oversold;
        self.rsi_buffer = bands.buffer;
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: TradeDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn min_atr_ratio(mut self, ratio: f64) -> Self {
        self.min_atr_ratio = ratio;
        self
    }

    #[must_use]
    pub fn rsi_guard(mut self, enabled: bool) -> Self {
        self.rsi_guard = enabled;
        self
    }

    /// Validates and builds the config.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::BelowMinimum`] for zero periods, lag, factor or
    ///   capacities, and for a swing history shallower than two swings
    ///   (divergence needs a prior swing).
    /// - [`ConfigError::AboveMaximum`] for values past the `MAX_*` limits.
    /// - [`ConfigError::FastNotBelowSlow`] if `fast_period >= slow_period`.
    /// - [`ConfigError::InvalidRsiBands`] and
    ///   [`ConfigError::InvalidAtrRatio`] for unusable filter settings.
    pub fn build(self) -> Result<SignalConfig, ConfigError> {
        let fast_period = within("fast_period", self.fast_period, 1, MAX_PERIOD)?;
        let slow_period = within("slow_period", self.slow_period, 1, MAX_PERIOD)?;

        if fast_period >= slow_period {
            return Err(ConfigError::FastNotBelowSlow {
                fast: fast_period.get(),
                slow: slow_period.get(),
            });
        }

        let bands = RsiBands {
            overbought: self.rsi_overbought,
            oversold: self.rsi_oversold,
            buffer: self.rsi_buffer,
        };
        if !bands.is_valid() {
            return Err(ConfigError::InvalidRsiBands {
                oversold: bands.oversold,
                overbought: bands.overbought,
                buffer: bands.buffer,
            });
        }

        if !self.min_atr_ratio.is_finite() || self.min_atr_ratio < 0.0 {
            return Err(ConfigError::InvalidAtrRatio(self.min_atr_ratio));
        }

        Ok(SignalConfig {
            fast_period,
            slow_period,
            rsi_period: within("rsi_period", self.rsi_period, 1, MAX_PERIOD)?,
            atr_period: within("atr_period", self.atr_period, 1, MAX_PERIOD)?,
            swing_confirmation_lag: within(
                "swing_confirmation_lag",
                self.swing_confirmation_lag,
                1,
                MAX_SWING_LAG,
            )?,
            swing_history_depth: within(
                "swing_history_depth",
                self.swing_history_depth,
                2,
                MAX_SWING_HISTORY,
            )?,
            buffer_capacity: within("buffer_capacity", self.buffer_capacity, 1, MAX_CAPACITY)?,
            event_buffer_capacity: within(
                "event_buffer_capacity",
                self.event_buffer_capacity,
                1,
                MAX_CAPACITY,
            )?,
            resample_factor: within(
                "resample_factor",
                self.resample_factor,
                1,
                MAX_RESAMPLE_FACTOR,
            )?,
            filter: CrossoverFilter {
                direction: self.direction,
                min_atr_ratio: self.min_atr_ratio,
                rsi_guard: self.rsi_guard,
                bands,
            },
        })
    }
}

fn within(
    name: &'static str,
    value: usize,
    min: usize,
    max: usize,
) -> Result<NonZero<usize>, ConfigError> {
    if value > max {
        return Err(ConfigError::AboveMaximum { name, max, value });
    }

    NonZero::new(value)
        .filter(|v| v.get() >= min)
        .ok_or(ConfigError::BelowMinimum { name, min, value })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    mod defaults {
        use super::*;

        #[test]
        fn match_documented_values() {
            let config = SignalConfig::default();
            assert_eq!(config.fast_period().get(), 9);
            assert_eq!(config.slow_period().get(), 21);
            assert_eq!(config.rsi_period().get(), 14);
            assert_eq!(config.swing_confirmation_lag().get(), 2);
            assert_eq!(config.swing_history_depth().get(), 5);
            assert_eq!(config.buffer_capacity().get(), 500);
            assert_eq!(config.event_buffer_capacity().get(), 256);
            assert_eq!(config.atr_period().get(), 14);
            assert_eq!(config.resample_factor().get(), 1);
            assert_eq!(config.rsi_bands(), RsiBands::default());
            assert_eq!(config.crossover_filter(), CrossoverFilter::default());
        }

        #[test]
        fn builder_without_changes_builds_defaults() {
            assert_eq!(SignalConfig::builder().build(), Ok(SignalConfig::default()));
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn rejects_fast_not_below_slow() {
            let err = SignalConfig::builder()
                .fast_period(21)
                .slow_period(21)
                .build()
                .unwrap_err();
            assert_eq!(err, ConfigError::FastNotBelowSlow { fast: 21, slow: 21 });
        }

        #[test]
        fn rejects_zero_period() {
            let err = SignalConfig::builder().rsi_period(0).build().unwrap_err();
            assert_eq!(
                err,
                ConfigError::BelowMinimum {
                    name: "rsi_period",
                    min: 1,
                    value: 0
                }
            );
        }

        #[test]
        fn rejects_zero_capacities_and_lag() {
            assert!(SignalConfig::builder().buffer_capacity(0).build().is_err());
            assert!(SignalConfig::builder().event_buffer_capacity(0).build().is_err());
            assert!(SignalConfig::builder().swing_confirmation_lag(0).build().is_err());
        }

        #[test]
        fn rejects_single_swing_history() {
            let err = SignalConfig::builder()
                .swing_history_depth(1)
                .build()
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::BelowMinimum {
                    name: "swing_history_depth",
                    min: 2,
                    ..
                }
            ));
        }
    }

    mod limits {
        use super::*;

        #[test]
        fn rejects_lag_whose_window_would_overflow() {
            let err = SignalConfig::builder()
                .swing_confirmation_lag(usize::MAX / 2 + 1)
                .build()
                .unwrap_err();
            assert_eq!(
                err,
                ConfigError::AboveMaximum {
                    name: "swing_confirmation_lag",
                    max: MAX_SWING_LAG,
                    value: usize::MAX / 2 + 1
                }
            );
        }

        #[test]
        fn rejects_unbounded_capacities() {
            let err = SignalConfig::builder()
                .buffer_capacity(usize::MAX)
                .build()
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::AboveMaximum {
                    name: "buffer_capacity",
                    ..
                }
            ));
            assert!(
                SignalConfig::builder()
                    .event_buffer_capacity(MAX_CAPACITY + 1)
                    .build()
                    .is_err()
            );
        }

        #[test]
        fn rejects_oversized_periods() {
            let err = SignalConfig::builder()
                .fast_period(3)
                .slow_period(MAX_PERIOD + 1)
                .build()
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::AboveMaximum {
                    name: "slow_period",
                    ..
                }
            ));
            assert!(SignalConfig::builder().atr_period(usize::MAX).build().is_err());
            assert!(SignalConfig::builder().resample_factor(0).build().is_err());
        }

        #[test]
        fn accepts_values_at_the_limits() {
            let config = SignalConfig::builder()
                .swing_confirmation_lag(MAX_SWING_LAG)
                .swing_history_depth(MAX_SWING_HISTORY)
                .buffer_capacity(MAX_CAPACITY)
                .event_buffer_capacity(MAX_CAPACITY)
                .resample_factor(MAX_RESAMPLE_FACTOR)
                .build()
                .unwrap();
            assert_eq!(config.swing_confirmation_lag().get(), MAX_SWING_LAG);
            assert_eq!(config.buffer_capacity().get(), MAX_CAPACITY);
        }
    }

    mod filter {
        use super::*;

        #[test]
        fn builds_crossover_filter() {
            let config = SignalConfig::builder()
                .direction(TradeDirection::Long)
                .min_atr_ratio(0.002)
                .rsi_guard(true)
                .rsi_bands(RsiBands {
                    overbought: 80.0,
                    oversold: 20.0,
                    buffer: 0.0,
                })
                .build()
                .unwrap();

            let filter = config.crossover_filter();
            assert_eq!(filter.direction, TradeDirection::Long);
            assert_eq!(filter.min_atr_ratio, 0.002);
            assert!(filter.rsi_guard);
            assert_eq!(config.rsi_bands().overbought, 80.0);
        }

        #[test]
        fn rejects_overlapping_bands() {
            let bands = RsiBands {
                overbought: 55.0,
                oversold: 50.0,
                buffer: 3.0,
            };
            let err = SignalConfig::builder().rsi_bands(bands).build().unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidRsiBands {
                    oversold: 50.0,
                    overbought: 55.0,
                    buffer: 3.0
                }
            );
        }

        #[test]
        fn rejects_negative_or_nan_atr_ratio() {
            assert_eq!(
                SignalConfig::builder().min_atr_ratio(-0.1).build(),
                Err(ConfigError::InvalidAtrRatio(-0.1))
            );
            assert!(matches!(
                SignalConfig::builder().min_atr_ratio(f64::NAN).build(),
                Err(ConfigError::InvalidAtrRatio(_))
            ));
        }
    }

    mod toml {
        use super::*;

        #[test]
        fn empty_document_is_defaults() {
            assert_eq!(SignalConfig::from_toml(""), Ok(SignalConfig::default()));
        }

        #[test]
        fn overrides_given_keys() {
            let config = SignalConfig::from_toml(
                "fast_period = 3\nslow_period = 5\nrsi_period = 4\nevent_buffer_capacity = 16\n",
            )
            .unwrap();
            assert_eq!(config.fast_period().get(), 3);
            assert_eq!(config.slow_period().get(), 5);
            assert_eq!(config.rsi_period().get(), 4);
            assert_eq!(config.event_buffer_capacity().get(), 16);
            assert_eq!(config.swing_confirmation_lag().get(), 2);
        }

        #[test]
        fn parses_filter_keys() {
            let config = SignalConfig::from_toml(
                "atr_period = 10\nresample_factor = 4\ndirection = \"short\"\n\
                 min_atr_ratio = 0.001\nrsi_guard = true\nrsi_overbought = 75.0\n",
            )
            .unwrap();
            assert_eq!(config.atr_period().get(), 10);
            assert_eq!(config.resample_factor().get(), 4);
            let filter = config.crossover_filter();
            assert_eq!(filter.direction, TradeDirection::Short);
            assert_eq!(filter.min_atr_ratio, 0.001);
            assert!(filter.rsi_guard);
            assert_eq!(filter.bands.overbought, 75.0);
            assert_eq!(filter.bands.oversold, 30.0);
        }

        #[test]
        fn rejects_unknown_keys() {
            let err = SignalConfig::from_toml("fast_perod = 3\n").unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)));
        }

        #[test]
        fn validates_parsed_values() {
            let err = SignalConfig::from_toml("fast_period = 30\n").unwrap_err();
            assert_eq!(err, ConfigError::FastNotBelowSlow { fast: 30, slow: 21 });
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            SignalConfig::default().to_string(),
            "SignalConfig(ema 9/21, rsi 14, atr 14, lag 2, depth 5)"
        );
    }
}
