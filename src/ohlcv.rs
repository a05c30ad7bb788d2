use serde::{Deserialize, Serialize};

/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar timestamp or sequence number.
///
/// Must strictly increase between bars fed to the
/// [`SignalEngine`](crate::SignalEngine); equal or older values are
/// rejected as out-of-order data.
pub type Timestamp = u64;

/// OHLCV bar data accepted by the engine and the trackers.
///
/// Implement this on your own kline/candle type to feed it without an
/// intermediate conversion. The engine copies the values into a
/// [`PriceBar`] when the bar is appended to its series.
///
/// # Example
///
/// ```
/// use quantedge_signals::{Ohlcv, Price, Timestamp};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64,
///     ts: u64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn timestamp(&self) -> Timestamp { self.ts }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing price of the bar.
    fn close(&self) -> Price;

    /// Bar timestamp. Must strictly increase from bar to bar.
    fn timestamp(&self) -> Timestamp;

    /// Trade volume during the bar. Defaults to `0.0`.
    fn volume(&self) -> f64 {
        0.0
    }
}

/// A single immutable price bar, as stored in the
/// [`PriceSeries`](crate::PriceSeries).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    #[must_use]
    pub fn new(timestamp: Timestamp, open: Price, high: Price, low: Price, close: Price) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    /// Flat bar where open, high, low and close are all `close`.
    #[must_use]
    pub fn flat(timestamp: Timestamp, close: Price) -> Self {
        Self::new(timestamp, close, close, close, close)
    }

    #[must_use]
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Copies any [`Ohlcv`] implementor into a `PriceBar`.
    #[must_use]
    pub fn from_ohlcv(ohlcv: &impl Ohlcv) -> Self {
        Self {
            timestamp: ohlcv.timestamp(),
            open: ohlcv.open(),
            high: ohlcv.high(),
            low: ohlcv.low(),
            close: ohlcv.close(),
            volume: ohlcv.volume(),
        }
    }
}

impl Ohlcv for PriceBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}
