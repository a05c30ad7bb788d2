use crate::{
    Anomaly, Atr, AtrConfig, CrossoverDetector, CrossoverFilter, DivergenceDetector, Ema,
    EmaConfig, EngineError, Indicator, IndicatorConfig, IndicatorSnapshot, InvariantViolation,
    Ohlcv, PriceBar, PriceSeries, Rsi, RsiConfig, SignalConfig, SignalEvent, SwingExtractor,
    SwingSample,
};

use std::fmt::Display;
use tracing::{debug, error, info, warn};

/// Lifecycle of a [`SignalEngine`].
///
/// ```text
/// Empty ──bar──▶ Warming ──all indicators live──▶ Active
///   ▲               │                               │
///   └────reset──────┴─────────InvariantViolation────┴──▶ Halted
///
/// any ──shutdown──▶ ShutDown
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No bar accepted yet.
    Empty,
    /// Trackers are fed; events are suppressed until both EMAs and the
    /// RSI are live.
    Warming,
    /// Events are emitted.
    Active,
    /// An indicator left its defined range. Only [`SignalEngine::reset`]
    /// recovers.
    Halted,
    /// Terminal.
    ShutDown,
}

impl Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Result of feeding one bar.
#[derive(Clone, Debug, PartialEq)]
pub enum BarOutcome {
    /// The bar was accepted. Events are in emission order: crossover
    /// first, then divergences. Empty while warming.
    Processed(Vec<SignalEvent>),
    /// The bar was rejected and no tracker saw it.
    Dropped(Anomaly),
}

impl BarOutcome {
    /// Emitted events; empty for a dropped bar.
    #[must_use]
    pub fn events(&self) -> &[SignalEvent] {
        match self {
            Self::Processed(events) => events,
            Self::Dropped(_) => &[],
        }
    }

    #[must_use]
    pub fn into_events(self) -> Vec<SignalEvent> {
        match self {
            Self::Processed(events) => events,
            Self::Dropped(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

/// Cumulative counters of a [`SignalEngine`]. Survive
/// [`reset`](SignalEngine::reset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub bars_accepted: u64,
    pub bars_dropped: u64,
    pub events_emitted: u64,
    /// Events detected while warming up and therefore not emitted.
    pub events_suppressed: u64,
    /// Crossovers held back by the [`CrossoverFilter`].
    pub events_filtered: u64,
}

/// Per-instrument signal pipeline.
///
/// Owns the bar series, both EMAs, the RSI, the ATR, the crossover
/// detector and filter, the swing extractor and the divergence detector.
/// Each call to
/// [`process`](Self::process) is one atomic step: the bar is appended, all
/// trackers advance, and the resulting events are returned.
///
/// Engines share nothing; run one per instrument.
///
/// # Example
///
/// ```
/// use quantedge_signals::{EngineState, PriceBar, SignalConfig, SignalEngine};
///
/// let config = SignalConfig::builder()
///     .fast_period(2)
///     .slow_period(3)
///     .rsi_period(2)
///     .build()
///     .unwrap();
/// let mut engine = SignalEngine::new(config);
///
/// for (ts, close) in (1..).zip([10.0, 11.0, 12.0]) {
///     engine.process(&PriceBar::flat(ts, close)).unwrap();
/// }
/// assert_eq!(engine.state(), EngineState::Active);
///
/// // Out-of-order bars are dropped, not fatal.
/// let outcome = engine.process(&PriceBar::flat(2, 9.0)).unwrap();
/// assert!(outcome.is_dropped());
/// ```
#[derive(Clone, Debug)]
pub struct SignalEngine {
    config: SignalConfig,
    series: PriceSeries,
    fast: Ema,
    slow: Ema,
    rsi: Rsi,
    atr: Atr,
    crossover: CrossoverDetector,
    filter: CrossoverFilter,
    swings: SwingExtractor,
    divergence: DivergenceDetector,
    state: EngineState,
    stats: EngineStats,
}

impl SignalEngine {
    #[must_use]
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            series: PriceSeries::new(config.buffer_capacity().get()),
            fast: Ema::new(EmaConfig::new(config.fast_period())),
            slow: Ema::new(EmaConfig::new(config.slow_period())),
            rsi: Rsi::new(RsiConfig::new(config.rsi_period())),
            atr: Atr::new(AtrConfig::new(config.atr_period())),
            crossover: CrossoverDetector::new(),
            filter: config.crossover_filter(),
            swings: SwingExtractor::new(
                config.swing_confirmation_lag(),
                config.swing_history_depth(),
            ),
            divergence: DivergenceDetector::new(),
            state: EngineState::Empty,
            stats: EngineStats::default(),
        }
    }

    /// Feeds one bar.
    ///
    /// A bar whose timestamp is not strictly after the last accepted bar
    /// returns [`BarOutcome::Dropped`] and leaves every tracker untouched.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Invariant`] if an indicator produced an
    ///   out-of-range value. The engine is then [`EngineState::Halted`].
    /// - [`EngineError::Halted`] / [`EngineError::ShutDown`] if the engine
    ///   no longer accepts bars.
    pub fn process(&mut self, ohlcv: &impl Ohlcv) -> Result<BarOutcome, EngineError> {
        match self.state {
            EngineState::Halted => return Err(EngineError::Halted),
            EngineState::ShutDown => return Err(EngineError::ShutDown),
            EngineState::Empty | EngineState::Warming | EngineState::Active => {}
        }

        let bar = PriceBar::from_ohlcv(ohlcv);

        let seq = match self.series.push(bar) {
            Ok(seq) => seq,
            Err(anomaly) => {
                warn!(%anomaly, "dropping out-of-order bar");
                self.stats.bars_dropped += 1;
                return Ok(BarOutcome::Dropped(anomaly));
            }
        };
        self.stats.bars_accepted += 1;

        let events = match self.advance(seq, bar) {
            Ok(events) => events,
            Err(violation) => {
                error!(
                    indicator = violation.indicator,
                    value = violation.value,
                    timestamp = bar.timestamp,
                    "halting pipeline"
                );
                self.state = EngineState::Halted;
                return Err(violation.into());
            }
        };

        self.state = if self.is_warmed_up() {
            EngineState::Active
        } else {
            EngineState::Warming
        };

        if self.state != EngineState::Active {
            self.stats.events_suppressed += events.len() as u64;
            return Ok(BarOutcome::Processed(Vec::new()));
        }

        for event in &events {
            debug!(kind = %event.kind, timestamp = event.timestamp, "signal emitted");
        }
        self.stats.events_emitted += events.len() as u64;

        Ok(BarOutcome::Processed(events))
    }

    /// Clears the series, every tracker and detector; the engine seeds
    /// again from the next bar. Counters are kept. Has no effect once shut
    /// down.
    pub fn reset(&mut self) {
        if self.state == EngineState::ShutDown {
            return;
        }

        self.series.clear();
        self.fast.reset();
        self.slow.reset();
        self.rsi.reset();
        self.atr.reset();
        self.crossover.reset();
        self.swings.reset();
        self.divergence.reset();
        self.state = EngineState::Empty;

        info!(config = %self.config, "engine reset");
    }

    /// Stops the engine for good. Further bars return
    /// [`EngineError::ShutDown`].
    pub fn shutdown(&mut self) {
        if self.state != EngineState::ShutDown {
            self.state = EngineState::ShutDown;
            info!(bars = self.stats.bars_accepted, "engine shut down");
        }
    }

    /// Latest indicator values.
    #[must_use]
    pub fn snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot {
            fast_ema: self.fast.value(),
            slow_ema: self.slow.value(),
            rsi: self.rsi.value(),
            atr: self.atr.value(),
        }
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    #[must_use]
    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    #[must_use]
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Confirmed swing history.
    #[must_use]
    pub fn swings(&self) -> &SwingExtractor {
        &self.swings
    }

    fn is_warmed_up(&self) -> bool {
        self.fast.is_live() && self.slow.is_live() && self.rsi.is_live()
    }

    fn advance(&mut self, seq: u64, bar: PriceBar) -> Result<Vec<SignalEvent>, InvariantViolation> {
        let fast = self.fast.compute(&bar)?;
        let slow = self.slow.compute(&bar)?;
        let rsi = self.rsi.compute(&bar)?;
        let atr = self.atr.compute(&bar)?;

        let snapshot = IndicatorSnapshot {
            fast_ema: fast,
            slow_ema: slow,
            rsi,
            atr,
        };

        let mut events = Vec::new();

        if let Some(crossover) = self.crossover.update(fast, slow) {
            match self.filter.check(crossover.direction, bar.close, &snapshot) {
                None => {
                    let zone = rsi.map(|value| self.filter.bands.zone(value));
                    events.push(SignalEvent::crossover(&crossover, bar, snapshot, zone));
                }
                Some(reason) => {
                    debug!(
                        direction = ?crossover.direction,
                        timestamp = bar.timestamp,
                        %reason,
                        "crossover filtered"
                    );
                    self.stats.events_filtered += 1;
                }
            }
        }

        // Swings are only meaningful where the oscillator exists.
        let Some(oscillator) = rsi else {
            return Ok(events);
        };

        let updates = self.swings.update(SwingSample {
            seq,
            timestamp: bar.timestamp,
            high: bar.high,
            low: bar.low,
            oscillator,
        });

        for update in &updates {
            let prior = self.swings.prior(update.point().kind).copied();
            if let Some(divergence) = self.divergence.update(update, prior.as_ref()) {
                events.push(SignalEvent::divergence(&divergence, bar, snapshot));
            }
        }

        Ok(events)
    }
}
