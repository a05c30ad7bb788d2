use crate::{Ohlcv, PriceBar};

use std::num::NonZero;

/// Merges every `factor` consecutive bars into one coarser bar, for
/// example 5-minute bars into 20-minute bars with a factor of 4.
///
/// The merged bar takes the open of the first bar, the highest high, the
/// lowest low, the close and timestamp of the last bar, and the summed
/// volume. Groups are counted from the first bar pushed; an incomplete
/// group is never emitted. A factor of one passes bars through unchanged.
///
/// Bars are expected in order. Ordering is checked by the engine on the
/// merged bars only.
///
/// # Example
///
/// ```
/// use quantedge_signals::{BarAggregator, PriceBar};
/// use std::num::NonZero;
///
/// let mut aggregator = BarAggregator::new(NonZero::new(2).unwrap());
///
/// assert_eq!(aggregator.push(&PriceBar::new(1, 10.0, 12.0, 9.0, 11.0)), None);
/// let merged = aggregator.push(&PriceBar::new(2, 11.0, 13.0, 10.0, 12.5)).unwrap();
///
/// assert_eq!(merged, PriceBar::new(2, 10.0, 13.0, 9.0, 12.5));
/// ```
#[derive(Clone, Debug)]
pub struct BarAggregator {
    factor: usize,
    pending: Option<PriceBar>,
    seen: usize,
}

impl BarAggregator {
    #[must_use]
    pub fn new(factor: NonZero<usize>) -> Self {
        Self {
            factor: factor.get(),
            pending: None,
            seen: 0,
        }
    }

    #[must_use]
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Adds one bar and returns the merged bar once the group is complete.
    pub fn push(&mut self, ohlcv: &impl Ohlcv) -> Option<PriceBar> {
        let bar = PriceBar::from_ohlcv(ohlcv);

        let merged = match self.pending.take() {
            None => bar,
            Some(acc) => PriceBar {
                timestamp: bar.timestamp,
                open: acc.open,
                high: acc.high.max(bar.high),
                low: acc.low.min(bar.low),
                close: bar.close,
                volume: acc.volume + bar.volume,
            },
        };
        self.seen += 1;

        if self.seen < self.factor {
            self.pending = Some(merged);
            return None;
        }

        self.seen = 0;
        Some(merged)
    }

    /// Discards the incomplete group.
    pub fn reset(&mut self) {
        self.pending = None;
        self.seen = 0;
    }
}

/// Resamples a slice of bars by `factor`, dropping a trailing incomplete
/// group.
#[must_use]
pub fn resample(bars: &[PriceBar], factor: NonZero<usize>) -> Vec<PriceBar> {
    let mut aggregator = BarAggregator::new(factor);
    bars.iter().filter_map(|bar| aggregator.push(bar)).collect()
}
