use crate::{Anomaly, PriceBar, Timestamp, ring_buffer::RingBuffer};

/// Bounded rolling store of the most recent [`PriceBar`]s.
///
/// Bars must arrive with strictly increasing timestamps. When the
/// capacity is exceeded the oldest bar is evicted.
///
/// Each accepted bar receives a sequence number, starting at `0` and
/// incremented per bar, that keeps identifying the same bar after older
/// bars are evicted. [`get`](Self::get) returns `None` once a bar is gone.
#[derive(Clone, Debug)]
pub struct PriceSeries {
    bars: RingBuffer<PriceBar>,
    next_seq: u64,
}

impl PriceSeries {
    /// `capacity` must be non-zero; [`SignalConfig`](crate::SignalConfig)
    /// validation guarantees this for engine-owned series.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            bars: RingBuffer::new(capacity),
            next_seq: 0,
        }
    }

    /// Appends `bar`, returning its sequence number.
    ///
    /// # Errors
    ///
    /// [`Anomaly::DataOrdering`] if `bar` is not strictly newer than the
    /// last stored bar. The series is left untouched.
    pub fn push(&mut self, bar: PriceBar) -> Result<u64, Anomaly> {
        if let Some(last) = self.last_timestamp()
            && bar.timestamp <= last
        {
            return Err(Anomaly::DataOrdering {
                timestamp: bar.timestamp,
                last,
            });
        }

        self.bars.push(bar);
        let seq = self.next_seq;
        self.next_seq += 1;

        Ok(seq)
    }

    /// Bar with sequence number `seq`, if still retained.
    #[must_use]
    pub fn get(&self, seq: u64) -> Option<&PriceBar> {
        let oldest = self.oldest_seq()?;
        let offset = usize::try_from(seq.checked_sub(oldest)?).ok()?;

        self.bars.get(offset)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Sequence number of the newest bar.
    #[must_use]
    pub fn latest_seq(&self) -> Option<u64> {
        self.next_seq.checked_sub(1).filter(|_| !self.bars.is_empty())
    }

    #[must_use]
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.latest().map(|bar| bar.timestamp)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Retained bars, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PriceBar> {
        self.bars.iter()
    }

    /// Drops every bar and restarts sequence numbering.
    pub fn clear(&mut self) {
        self.bars.clear();
        self.next_seq = 0;
    }

    fn oldest_seq(&self) -> Option<u64> {
        let len = u64::try_from(self.bars.len()).ok()?;
        (len > 0).then(|| self.next_seq - len)
    }
}
