//! Bar builder abstraction.

use momentum_types::{Result, Tick};

use crate::BarEvent;

/// A stateful tick-to-bar transducer driven by a host.
///
/// The host decides when the stream restarts; the builder only knows how to
/// seed a fresh stream and how to fold one more tick into it.
pub trait BarBuilder {
    /// Reinitializes the range state and seeds a new bar from `tick`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick price or the tick size is unusable.
    fn reset(&mut self, tick: &Tick) -> Result<Vec<BarEvent>>;

    /// Folds `tick` into the stream, extending or closing the open bar.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick price is unusable or the tick crosses
    /// more ranges than the builder allows.
    fn update(&mut self, tick: &Tick) -> Result<Vec<BarEvent>>;

    /// Whether the first tick of a new session should reseed the stream.
    fn reset_on_session(&self) -> bool {
        true
    }
}
