//! Service contains the business logic of the application.
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::time::Duration;

use common::Percent;
use rust_decimal::Decimal;

#[cfg(doc)]
use domain::risk::RiskScorer;
#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Profit rate applied to the financed amount of a financing
    /// [`Contract`].
    ///
    /// [`Contract`]: domain::Contract
    pub profit_rate: Percent,

    /// Delay between a financing [`Contract`] creation and its first
    /// installment.
    ///
    /// [`Contract`]: domain::Contract
    pub first_payment_delay: Duration,

    /// Validity period of a [`Quote`] when the requesting customer doesn't
    /// provide one.
    ///
    /// [`Quote`]: domain::Quote
    pub default_quote_validity: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profit_rate: Percent::new(Decimal::new(10, 0))
                .unwrap_or_else(|| unreachable!("10 is a valid percent")),
            first_payment_delay: Duration::from_secs(60 * 60 * 24 * 30),
            default_quote_validity: Duration::from_secs(60 * 60 * 24 * 7),
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Sc> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`RiskScorer`] of this [`Service`].
    scorer: Sc,
}

impl<Db, Sc> Service<Db, Sc> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db, scorer: Sc) -> Self {
        Self {
            config,
            database,
            scorer,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`RiskScorer`] of this [`Service`].
    #[must_use]
    pub fn scorer(&self) -> &Sc {
        &self.scorer
    }
}
