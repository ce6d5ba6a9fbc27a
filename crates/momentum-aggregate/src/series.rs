//! Bar series host.

use momentum_types::{Result, Tick};

use crate::{Bar, BarBuilder, BarEvent, SessionOracle};

/// Owns a bar series and drives a [`BarBuilder`] tick by tick.
///
/// The series reseeds the builder on its first tick and, when session resets
/// are enabled, on the first tick of every new session. Events returned by
/// the builder are applied in order: appended bars are pushed, extended bars
/// replace the bar at their index.
#[derive(Debug)]
pub struct BarSeries<B> {
    builder: B,
    bars: Vec<Bar>,
    reset_on_session: bool,
}

impl<B: BarBuilder> BarSeries<B> {
    /// Creates an empty series that resets on session boundaries when the
    /// builder asks for it.
    #[must_use]
    pub fn new(builder: B) -> Self {
        let reset_on_session = builder.reset_on_session();
        Self {
            builder,
            bars: Vec::new(),
            reset_on_session,
        }
    }

    /// Overrides whether session boundaries reseed the builder.
    #[must_use]
    pub const fn with_session_reset(mut self, reset: bool) -> Self {
        self.reset_on_session = reset;
        self
    }

    /// Feeds one tick, flagged by the caller as opening a session or not.
    ///
    /// # Errors
    ///
    /// Propagates builder errors; the series is unchanged when one occurs.
    pub fn push(&mut self, tick: &Tick, is_new_session: bool) -> Result<Vec<BarEvent>> {
        let events = if self.bars.is_empty() || (is_new_session && self.reset_on_session) {
            self.builder.reset(tick)?
        } else {
            self.builder.update(tick)?
        };
        self.apply(&events);
        Ok(events)
    }

    /// Feeds one tick, asking `oracle` whether it opens a session.
    ///
    /// # Errors
    ///
    /// Propagates builder errors.
    pub fn push_with<O: SessionOracle + ?Sized>(
        &mut self,
        tick: &Tick,
        oracle: &mut O,
    ) -> Result<Vec<BarEvent>> {
        let is_new_session = oracle.is_new_session(tick.timestamp);
        self.push(tick, is_new_session)
    }

    fn apply(&mut self, events: &[BarEvent]) {
        for event in events {
            match *event {
                BarEvent::Appended { bar, .. } => self.bars.push(bar),
                BarEvent::Extended { index, bar } => {
                    if let Some(slot) = self.bars.get_mut(index) {
                        *slot = bar;
                    }
                }
            }
        }
    }

    /// Returns the bars built so far, the last one possibly still open.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Returns the most recent bar.
    #[must_use]
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Returns the number of bars.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if no bar has been built.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the builder.
    #[must_use]
    pub const fn builder(&self) -> &B {
        &self.builder
    }

    /// Consumes the series and returns its bars.
    #[must_use]
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}
