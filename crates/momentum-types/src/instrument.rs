//! Financial instrument definitions.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, TickGrid};

/// Instrument category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Exchange-traded futures.
    Future,
    /// Foreign exchange currency pairs.
    Forex,
    /// Cryptocurrencies.
    Crypto,
    /// Individual stocks.
    Stock,
}

impl Category {
    /// Returns the category as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Future => "future",
            Self::Forex => "forex",
            Self::Crypto => "crypto",
            Self::Stock => "stock",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a tradable instrument and its price increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Unique identifier (e.g., "es", "eurusd").
    id: String,
    /// Human-readable name (e.g., "E-mini S&P 500").
    name: String,
    /// Description of the instrument.
    description: String,
    /// Instrument category.
    category: Category,
    /// Minimum price increment.
    tick_size: f64,
}

impl Instrument {
    /// Creates a new instrument.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        tick_size: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            tick_size,
        }
    }

    /// Returns the instrument identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the instrument category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns the minimum price increment.
    #[must_use]
    pub const fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Returns the rounding grid for this instrument's prices.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTickSize`] if the tick size is unusable.
    pub fn grid(&self) -> Result<TickGrid, ConfigError> {
        TickGrid::new(self.tick_size)
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
