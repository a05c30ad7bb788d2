use crate::{Price, Timestamp, ring_buffer::RingBuffer};

use serde::{Deserialize, Serialize};
use std::num::NonZero;
use tracing::debug;

/// Whether a swing is a local maximum or minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwingKind {
    High,
    Low,
}

impl SwingKind {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }

    /// `true` if `a` lies strictly beyond `b` in this kind's direction.
    #[inline]
    #[must_use]
    pub fn beyond(self, a: f64, b: f64) -> bool {
        match self {
            Self::High => a > b,
            Self::Low => a < b,
        }
    }

    #[inline]
    fn price_of(self, sample: &SwingSample) -> Price {
        match self {
            Self::High => sample.high,
            Self::Low => sample.low,
        }
    }
}

/// One bar's input to the [`SwingExtractor`]: its price range and the
/// oscillator value computed on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwingSample {
    pub seq: u64,
    pub timestamp: Timestamp,
    pub high: Price,
    pub low: Price,
    pub oscillator: f64,
}

/// A confirmed local extreme.
///
/// `price` is the bar high for [`SwingKind::High`] and the bar low for
/// [`SwingKind::Low`]. `oscillator` is the oscillator extreme inside the
/// confirmation window around the bar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// Sequence number of the bar in the [`PriceSeries`](crate::PriceSeries).
    pub index: u64,
    pub timestamp: Timestamp,
    pub price: Price,
    pub oscillator: f64,
    pub kind: SwingKind,
}

/// Change to the retained swing sequence caused by a confirmation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SwingUpdate {
    /// A swing of the opposite kind to the previous one was appended.
    New(SwingPoint),
    /// A same-kind swing at least as extreme as the last one replaced it.
    Extended {
        replaced: SwingPoint,
        point: SwingPoint,
    },
}

impl SwingUpdate {
    /// The swing now at the end of the sequence.
    #[must_use]
    pub fn point(&self) -> &SwingPoint {
        match self {
            Self::New(point) | Self::Extended { point, .. } => point,
        }
    }
}

/// Confirms swing highs and lows with a fixed lag and keeps a short,
/// strictly alternating history of them.
///
/// A sample at position `i` becomes a HIGH once samples `i+1 ..= i+lag`
/// have arrived and its high is the maximum of `[i−lag, i+lag]`. A later
/// sample tying the candidate wins the tie, so the candidate is rejected
/// and the later one is evaluated on its own turn. LOW mirrors this with
/// the minimum of lows.
///
/// Confirmed swings must alternate kind. A same-kind confirmation replaces
/// the last swing when it is at least as extreme and is discarded
/// otherwise. Histories are bounded by `depth` swings per kind.
#[derive(Clone, Debug)]
pub struct SwingExtractor {
    lag: usize,
    window: RingBuffer<SwingSample>,
    highs: RingBuffer<SwingPoint>,
    lows: RingBuffer<SwingPoint>,
    last_kind: Option<SwingKind>,
}

impl SwingExtractor {
    #[must_use]
    pub fn new(lag: NonZero<usize>, depth: NonZero<usize>) -> Self {
        let lag = lag.get();
        // A window that does not fit in `usize` can never fill up.
        let window = lag
            .checked_mul(2)
            .and_then(|w| w.checked_add(1))
            .unwrap_or(usize::MAX);

        Self {
            lag,
            window: RingBuffer::new(window),
            highs: RingBuffer::new(depth.get()),
            lows: RingBuffer::new(depth.get()),
            last_kind: None,
        }
    }

    /// Feeds one sample and returns the updates to the swing sequence it
    /// confirmed, oldest first. At most two: a bar can be both the window
    /// maximum and minimum.
    pub fn update(&mut self, sample: SwingSample) -> Vec<SwingUpdate> {
        self.window.push(sample);

        if !self.window.is_full() {
            return Vec::new();
        }

        let Some(center) = self.window.get(self.lag).copied() else {
            return Vec::new();
        };

        let first = self.last_kind.map_or(SwingKind::High, SwingKind::opposite);

        let confirmed: Vec<SwingPoint> = [first, first.opposite()]
            .into_iter()
            .filter_map(|kind| self.confirm(kind, &center))
            .collect();

        confirmed
            .into_iter()
            .filter_map(|point| self.retain(point))
            .collect()
    }

    /// Retained swings of `kind`, oldest first.
    pub fn history(&self, kind: SwingKind) -> impl DoubleEndedIterator<Item = &SwingPoint> {
        self.swings(kind).iter()
    }

    /// Most recent retained swing of `kind`.
    #[must_use]
    pub fn latest(&self, kind: SwingKind) -> Option<&SwingPoint> {
        self.swings(kind).last()
    }

    /// Retained swing of `kind` just before the latest one.
    #[must_use]
    pub fn prior(&self, kind: SwingKind) -> Option<&SwingPoint> {
        self.swings(kind).nth_back(1)
    }

    #[must_use]
    pub fn last_kind(&self) -> Option<SwingKind> {
        self.last_kind
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.highs.clear();
        self.lows.clear();
        self.last_kind = None;
    }

    fn confirm(&self, kind: SwingKind, center: &SwingSample) -> Option<SwingPoint> {
        let price = kind.price_of(center);

        let mut samples = self.window.iter().enumerate();
        let confirmed = samples.all(|(pos, sample)| match pos.cmp(&self.lag) {
            std::cmp::Ordering::Less => !kind.beyond(kind.price_of(sample), price),
            std::cmp::Ordering::Equal => true,
            std::cmp::Ordering::Greater => kind.beyond(price, kind.price_of(sample)),
        });

        if !confirmed {
            return None;
        }

        let oscillator = self
            .window
            .iter()
            .map(|sample| sample.oscillator)
            .reduce(|best, osc| if kind.beyond(osc, best) { osc } else { best })?;

        Some(SwingPoint {
            index: center.seq,
            timestamp: center.timestamp,
            price,
            oscillator,
            kind,
        })
    }

    fn retain(&mut self, point: SwingPoint) -> Option<SwingUpdate> {
        let kind = point.kind;

        if self.last_kind == Some(kind) {
            let last = self.swings(kind).last()?;
            if kind.beyond(last.price, point.price) {
                debug!(?kind, index = point.index, "discarding weaker same-kind swing");
                return None;
            }

            let replaced = self.swings_mut(kind).replace_last(point)?;
            debug!(?kind, index = point.index, replaced = replaced.index, "swing extended");

            return Some(SwingUpdate::Extended { replaced, point });
        }

        self.swings_mut(kind).push(point);
        self.last_kind = Some(kind);
        debug!(?kind, index = point.index, price = point.price, "swing confirmed");

        Some(SwingUpdate::New(point))
    }

    fn swings(&self, kind: SwingKind) -> &RingBuffer<SwingPoint> {
        match kind {
            SwingKind::High => &self.highs,
            SwingKind::Low => &self.lows,
        }
    }

    fn swings_mut(&mut self, kind: SwingKind) -> &mut RingBuffer<SwingPoint> {
        match kind {
            SwingKind::High => &mut self.highs,
            SwingKind::Low => &mut self.lows,
        }
    }
}
