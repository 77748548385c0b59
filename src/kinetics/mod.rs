//! # Reaction mechanisms
//!
//! Every candidate mechanism is a [`Mechanism`] variant carrying its display name,
//! the inhibition constants it adds to `k_cat`/`Km`, the species that drives the
//! inhibition term, and its rate law. The state vector shared by all rate laws is
//! `[substrate, enzyme, product, driver]`.
//!
//! ```rust
//! use enzkin_rs::kinetics::{Driver, KineticConstant, Mechanism};
//!
//! let mechanism = Mechanism::SubstrateInhibition;
//! assert_eq!(mechanism.name(), "substrate inhibition");
//! assert_eq!(mechanism.free_parameters(), &[KineticConstant::Kiu]);
//! assert_eq!(mechanism.driver(), Driver::Substrate);
//! ```

pub mod ode;
pub mod rate_law;

pub use ode::{integrate_on_grid, IntegratorConfig, KineticSystem, Species};
pub use rate_law::{KineticConstants, RateLaw};

use crate::error::{KineticsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinetic constants a mechanism can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KineticConstant {
    /// Turnover number
    KCat,
    /// Michaelis constant
    Km,
    /// Competitive inhibition constant
    Kic,
    /// Uncompetitive inhibition constant
    Kiu,
    /// Time-dependent enzyme inactivation rate
    Kie,
}

impl KineticConstant {
    /// Every constant, in reporting order.
    pub const ALL: [KineticConstant; 5] = [
        KineticConstant::KCat,
        KineticConstant::Km,
        KineticConstant::Kic,
        KineticConstant::Kiu,
        KineticConstant::Kie,
    ];

    /// Parameter name used in [`crate::parameters::Parameters`].
    pub fn id(&self) -> &'static str {
        match self {
            KineticConstant::KCat => "k_cat",
            KineticConstant::Km => "Km",
            KineticConstant::Kic => "K_ic",
            KineticConstant::Kiu => "K_iu",
            KineticConstant::Kie => "K_ie",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for KineticConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Species feeding the fourth state slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    /// An added inhibitor, constant over time
    Inhibitor,
    /// The substrate inhibits its own conversion
    Substrate,
    /// The product inhibits its own formation
    Product,
}

/// Candidate reaction mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanism {
    Irreversible,
    CompetitiveProduct,
    UncompetitiveProduct,
    NoncompetitiveProduct,
    SubstrateInhibition,
    Competitive,
    Uncompetitive,
    Noncompetitive,
    PartiallyCompetitive,
}

impl Mechanism {
    /// Mechanisms fitted when no replicate carries an inhibitor.
    pub const INHIBITOR_FREE: [Mechanism; 5] = [
        Mechanism::Irreversible,
        Mechanism::CompetitiveProduct,
        Mechanism::UncompetitiveProduct,
        Mechanism::NoncompetitiveProduct,
        Mechanism::SubstrateInhibition,
    ];

    /// Mechanisms fitted when an inhibitor is present.
    pub const WITH_INHIBITOR: [Mechanism; 4] = [
        Mechanism::Competitive,
        Mechanism::Uncompetitive,
        Mechanism::Noncompetitive,
        Mechanism::PartiallyCompetitive,
    ];

    pub const ALL: [Mechanism; 9] = [
        Mechanism::Irreversible,
        Mechanism::CompetitiveProduct,
        Mechanism::UncompetitiveProduct,
        Mechanism::NoncompetitiveProduct,
        Mechanism::SubstrateInhibition,
        Mechanism::Competitive,
        Mechanism::Uncompetitive,
        Mechanism::Noncompetitive,
        Mechanism::PartiallyCompetitive,
    ];

    /// Unique display name, also the key of the result summary.
    pub fn name(&self) -> &'static str {
        match self {
            Mechanism::Irreversible => "irreversible Michaelis Menten",
            Mechanism::CompetitiveProduct => "competitive product inhibition",
            Mechanism::UncompetitiveProduct => "uncompetitive product inhibition",
            Mechanism::NoncompetitiveProduct => "non-competitive product inhibition",
            Mechanism::SubstrateInhibition => "substrate inhibition",
            Mechanism::Competitive => "competitive inhibition",
            Mechanism::Uncompetitive => "uncompetitive inhibition",
            Mechanism::Noncompetitive => "non-competitive inhibition",
            Mechanism::PartiallyCompetitive => "partially competitive inhibition",
        }
    }

    /// Inhibition constants fitted on top of `k_cat` and `Km`, in parameter order.
    pub fn free_parameters(&self) -> &'static [KineticConstant] {
        use KineticConstant::{Kic, Kiu};
        match self {
            Mechanism::Irreversible => &[],
            Mechanism::CompetitiveProduct | Mechanism::Competitive => &[Kic],
            Mechanism::UncompetitiveProduct
            | Mechanism::Uncompetitive
            | Mechanism::SubstrateInhibition => &[Kiu],
            Mechanism::NoncompetitiveProduct | Mechanism::Noncompetitive => &[Kiu, Kic],
            Mechanism::PartiallyCompetitive => &[Kic, Kiu],
        }
    }

    pub fn driver(&self) -> Driver {
        match self {
            Mechanism::CompetitiveProduct
            | Mechanism::UncompetitiveProduct
            | Mechanism::NoncompetitiveProduct => Driver::Product,
            Mechanism::SubstrateInhibition => Driver::Substrate,
            // The irreversible law ignores the slot; it carries the (zero) inhibitor.
            Mechanism::Irreversible
            | Mechanism::Competitive
            | Mechanism::Uncompetitive
            | Mechanism::Noncompetitive
            | Mechanism::PartiallyCompetitive => Driver::Inhibitor,
        }
    }

    pub fn rate_law(&self) -> RateLaw {
        match self {
            Mechanism::Irreversible => rate_law::irreversible,
            Mechanism::CompetitiveProduct => rate_law::competitive_product_inhibition,
            Mechanism::UncompetitiveProduct => rate_law::uncompetitive_product_inhibition,
            Mechanism::NoncompetitiveProduct => rate_law::noncompetitive_product_inhibition,
            Mechanism::SubstrateInhibition => rate_law::substrate_inhibition,
            Mechanism::Competitive => rate_law::competitive_inhibition,
            Mechanism::Uncompetitive => rate_law::uncompetitive_inhibition,
            Mechanism::Noncompetitive => rate_law::noncompetitive_inhibition,
            Mechanism::PartiallyCompetitive => rate_law::partially_competitive_inhibition,
        }
    }

    /// All constants this mechanism fits, with or without enzyme inactivation.
    pub fn constants(&self, enzyme_inactivation: bool) -> Vec<KineticConstant> {
        let mut constants = vec![KineticConstant::KCat, KineticConstant::Km];
        constants.extend_from_slice(self.free_parameters());
        if enzyme_inactivation {
            constants.push(KineticConstant::Kie);
        }
        constants
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mechanism {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| KineticsError::InvalidInput(format!("unknown mechanism '{}'", s)))
    }
}
