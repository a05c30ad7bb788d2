use crate::{SwingKind, SwingPoint, SwingUpdate};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Divergence flavour between successive price and oscillator swings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DivergenceKind {
    /// Lower price low, higher oscillator low.
    BullishRegular,
    /// Higher price high, lower oscillator high.
    BearishRegular,
    /// Higher price low, lower oscillator low.
    BullishHidden,
    /// Lower price high, higher oscillator high.
    BearishHidden,
}

impl DivergenceKind {
    /// Classifies `current` against the `prior` swing of the same kind.
    ///
    /// Both axes must move strictly, in opposite directions. Swings of
    /// different kinds never diverge.
    #[must_use]
    pub fn classify(prior: &SwingPoint, current: &SwingPoint) -> Option<Self> {
        if prior.kind != current.kind {
            return None;
        }

        let price_up = current.price > prior.price;
        let price_down = current.price < prior.price;
        let osc_up = current.oscillator > prior.oscillator;
        let osc_down = current.oscillator < prior.oscillator;

        match current.kind {
            SwingKind::High if price_up && osc_down => Some(Self::BearishRegular),
            SwingKind::High if price_down && osc_up => Some(Self::BearishHidden),
            SwingKind::Low if price_down && osc_up => Some(Self::BullishRegular),
            SwingKind::Low if price_up && osc_down => Some(Self::BullishHidden),
            _ => None,
        }
    }
}

/// A divergence between two same-kind swings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Divergence {
    pub kind: DivergenceKind,
    pub prior: SwingPoint,
    pub current: SwingPoint,
}

/// Compares each swing update with the previous swing of the same kind.
///
/// Only the single most recent prior swing is used. Each prior swing
/// anchors at most one divergence of each kind: when an extended swing
/// repeats the kind its anchor already produced, nothing is emitted.
#[derive(Clone, Debug, Default)]
pub struct DivergenceDetector {
    high_anchor: Option<(u64, DivergenceKind)>,
    low_anchor: Option<(u64, DivergenceKind)>,
}

impl DivergenceDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates `update` against `prior`, the retained swing of the same
    /// kind before the updated one.
    pub fn update(
        &mut self,
        update: &SwingUpdate,
        prior: Option<&SwingPoint>,
    ) -> Option<Divergence> {
        let current = *update.point();
        let prior = *prior?;
        let kind = DivergenceKind::classify(&prior, &current)?;

        let anchor = match current.kind {
            SwingKind::High => &mut self.high_anchor,
            SwingKind::Low => &mut self.low_anchor,
        };

        if *anchor == Some((prior.index, kind)) {
            return None;
        }
        *anchor = Some((prior.index, kind));

        debug!(
            ?kind,
            prior = prior.index,
            current = current.index,
            "divergence detected"
        );

        Some(Divergence {
            kind,
            prior,
            current,
        })
    }

    pub fn reset(&mut self) {
        self.high_anchor = None;
        self.low_anchor = None;
    }
}
