use crate::{InvariantViolation, Ohlcv, Price};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
    num::NonZero,
};

/// Configuration for a streaming [`Indicator`].
///
/// Configs are value types: cheap to copy, compare, and hash.
pub trait IndicatorConfig: Sized + Copy + PartialEq + Eq + Hash + Display + Debug {
    /// Creates a config for the given period.
    fn new(length: NonZero<usize>) -> Self;

    /// Period length (number of bars).
    fn length(&self) -> usize;
}

/// A streaming technical indicator over bars.
///
/// Indicators keep O(1) state and update incrementally on each call to
/// [`update`](Indicator::update). Output is `None` while the indicator is
/// still seeding.
///
/// # Example
///
/// ```
/// use quantedge_signals::{Ema, EmaConfig, Indicator, IndicatorConfig};
/// use std::num::NonZero;
///
/// let mut ema = Ema::new(EmaConfig::new(NonZero::new(2).unwrap()));
///
/// assert_eq!(ema.update(10.0).unwrap(), None);
/// assert_eq!(ema.update(20.0).unwrap(), Some(15.0));
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Feeds one close and returns the updated value, or `None` while
    /// seeding.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if the computed value leaves the
    /// indicator's defined range.
    fn update(&mut self, close: Price) -> Result<Option<Price>, InvariantViolation>;

    /// Feeds `ohlcv`. The default reads only the close; range-based
    /// indicators such as [`Atr`](crate::Atr) also read the high and low.
    /// See [`update`](Indicator::update).
    ///
    /// # Errors
    ///
    /// Same as [`update`](Indicator::update).
    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Result<Option<Price>, InvariantViolation> {
        self.update(ohlcv.close())
    }

    /// Returns the last computed value without advancing state.
    fn value(&self) -> Option<Price>;

    /// `true` once the indicator has left its seeding phase.
    #[inline]
    fn is_live(&self) -> bool {
        self.value().is_some()
    }

    /// Drops all state; the indicator seeds again from scratch.
    fn reset(&mut self);
}
