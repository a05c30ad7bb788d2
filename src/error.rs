use crate::{Price, SignalEvent, Timestamp};

use thiserror::Error;

/// An indicator produced a value outside its defined range.
///
/// Indicates an arithmetic bug rather than bad input, so the affected
/// pipeline halts instead of clamping.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("{indicator} produced out-of-range value {value}")]
pub struct InvariantViolation {
    pub indicator: &'static str,
    pub value: Price,
}

/// Rejected [`SignalConfig`](crate::SignalConfig) parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be at least {min}, got {value}")]
    BelowMinimum {
        name: &'static str,
        min: usize,
        value: usize,
    },
    #[error("{name} must be at most {max}, got {value}")]
    AboveMaximum {
        name: &'static str,
        max: usize,
        value: usize,
    },
    /// Thresholds outside `[0, 100]`, a negative buffer, or no neutral
    /// zone left between the buffered thresholds.
    #[error("invalid rsi bands: oversold {oversold}, overbought {overbought}, buffer {buffer}")]
    InvalidRsiBands {
        oversold: f64,
        overbought: f64,
        buffer: f64,
    },
    #[error("min_atr_ratio must be a finite non-negative number, got {0}")]
    InvalidAtrRatio(f64),
    #[error("fast_period ({fast}) must be smaller than slow_period ({slow})")]
    FastNotBelowSlow { fast: usize, slow: usize },
    #[error("invalid configuration file: {0}")]
    Parse(String),
}

/// Fatal engine errors, surfaced to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("pipeline halted after an invariant violation")]
    Halted,
    #[error("engine has been shut down")]
    ShutDown,
}

/// Non-fatal conditions recovered locally and reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Anomaly {
    #[error("bar at {timestamp} is not after the last stored bar at {last}")]
    DataOrdering {
        timestamp: Timestamp,
        last: Timestamp,
    },
    #[error("event buffer full, dropped {:?} event at {}", .dropped.kind, .dropped.timestamp)]
    EventOverflow { dropped: Box<SignalEvent> },
}
