//! [`Contract`] read model definition.

use common::{DateTimeOf, Money};

use crate::domain::{vehicle, Contract};

/// Printable rendering of a generated [`Contract`], with its vehicle
/// details denormalized in.
#[derive(Clone, Debug)]
pub struct Document {
    /// [`Contract`] this [`Document`] renders.
    pub contract: Contract,

    /// Summary of the financed vehicle.
    pub vehicle: VehicleSummary,

    /// [`DateTime`] when this [`Document`] was generated.
    ///
    /// [`DateTime`]: common::DateTime
    pub generated_at: GenerationDateTime,
}

/// Vehicle details denormalized into a [`Document`].
#[derive(Clone, Debug)]
pub struct VehicleSummary {
    /// Make of the vehicle.
    pub make: vehicle::Make,

    /// Model of the vehicle.
    pub model: vehicle::Model,

    /// Production year of the vehicle.
    pub year: vehicle::Year,

    /// Listed price of the vehicle.
    pub price: Money,
}

impl From<&crate::domain::Vehicle> for VehicleSummary {
    fn from(vehicle: &crate::domain::Vehicle) -> Self {
        Self {
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            price: vehicle.price,
        }
    }
}

/// [`DateTime`] when a [`Document`] was generated.
///
/// [`DateTime`]: common::DateTime
pub type GenerationDateTime = DateTimeOf<Document>;
