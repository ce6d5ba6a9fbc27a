//! Bar lifecycle events.

use serde::{Deserialize, Serialize};

use crate::Bar;

/// A change to the bar stream caused by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BarEvent {
    /// A new bar was added at `index`.
    Appended {
        /// Sequence index of the bar.
        index: usize,
        /// The new bar.
        bar: Bar,
    },
    /// The bar at `index` was updated in place.
    Extended {
        /// Sequence index of the bar.
        index: usize,
        /// The bar after the update.
        bar: Bar,
    },
}

impl BarEvent {
    /// Returns the sequence index of the affected bar.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Appended { index, .. } | Self::Extended { index, .. } => *index,
        }
    }

    /// Returns the bar as it stands after the event.
    #[must_use]
    pub const fn bar(&self) -> &Bar {
        match self {
            Self::Appended { bar, .. } | Self::Extended { bar, .. } => bar,
        }
    }

    /// Returns true for [`BarEvent::Appended`].
    #[must_use]
    pub const fn is_appended(&self) -> bool {
        matches!(self, Self::Appended { .. })
    }

    /// Returns the event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Appended { .. } => "appended",
            Self::Extended { .. } => "extended",
        }
    }
}
