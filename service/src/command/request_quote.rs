//! [`Command`] for requesting a new [`Quote`].

use std::time::Duration;

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{quote, user, vehicle, Quote, User, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for requesting a new [`Quote`] over an available
/// [`Vehicle`].
///
/// Records an inquiry on the [`Vehicle`] and creates the [`Quote`] in the
/// [`Status::Draft`] atomically: an unavailable [`Vehicle`] leaves no
/// trace.
///
/// [`Status::Draft`]: quote::Status::Draft
#[derive(Clone, Copy, Debug)]
pub struct RequestQuote {
    /// ID of the requesting customer [`User`].
    pub customer_id: user::Id,

    /// ID of the [`Vehicle`] to quote.
    pub vehicle_id: vehicle::Id,

    /// Requested validity period of the [`Quote`].
    ///
    /// Defaults to the service-wide one when omitted.
    pub validity: Option<Duration>,

    /// Requested delivery period.
    pub delivery: Option<Duration>,
}

impl<Db, Sc> Command<RequestQuote> for Service<Db, Sc>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Insert<Quote>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Quote;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RequestQuote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestQuote {
            customer_id,
            vehicle_id,
            validity,
            delivery,
        } = cmd;

        let customer = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(customer_id))
            .map_err(tracerr::wrap!())?;
        if customer.role != user::Role::Customer {
            return Err(tracerr::new!(E::WrongRole {
                user: customer_id,
                expected: user::Role::Customer,
            }));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        if vehicle.availability != vehicle::Availability::Available {
            return Err(tracerr::new!(E::VehicleUnavailable {
                vehicle: vehicle_id,
                availability: vehicle.availability,
            }));
        }

        let now = DateTime::now();
        vehicle.record_inquiry(now.coerce());

        let quote = Quote::new(
            customer_id,
            vehicle.provider_id,
            vehicle_id,
            quote::Pricing {
                base_price: vehicle.price,
                total_price: vehicle.price,
            },
            quote::Terms {
                validity: validity
                    .unwrap_or(self.config().default_quote_validity),
                delivery,
            },
            now,
        );

        tx.execute(Update(vehicle))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(quote.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(quote)
    }
}

/// Error of [`RequestQuote`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID doesn't exist.
    #[display("`User(id: {_0})` doesn't exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID doesn't have the expected [`Role`].
    ///
    /// [`Role`]: user::Role
    #[display("`User(id: {user})` is not a `{expected}`")]
    WrongRole {
        /// ID of the [`User`].
        user: user::Id,

        /// [`Role`] the [`User`] was expected to have.
        ///
        /// [`Role`]: user::Role
        expected: user::Role,
    },

    /// [`Vehicle`] with the provided ID doesn't exist.
    #[display("`Vehicle(id: {_0})` doesn't exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] with the provided ID cannot be quoted.
    #[display("`Vehicle(id: {vehicle})` is `{availability}`")]
    VehicleUnavailable {
        /// ID of the [`Vehicle`].
        vehicle: vehicle::Id,

        /// Actual [`Availability`] of the [`Vehicle`].
        ///
        /// [`Availability`]: vehicle::Availability
        availability: vehicle::Availability,
    },
}
