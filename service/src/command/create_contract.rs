//! [`Command`] for creating a new financing [`Contract`].

use std::collections::HashMap;

use common::{
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        application, contract, finance, user, vehicle, Application, Contract,
        User, Vehicle, Version,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new financing [`Contract`] along with its
/// tracking [`Application`].
#[derive(Clone, Debug)]
pub struct CreateContract {
    /// ID of the customer [`User`] the [`Contract`] is created for.
    pub customer_id: user::Id,

    /// ID of the [`User`] providing the financed [`Vehicle`].
    pub provider_id: user::Id,

    /// ID of the [`Vehicle`] to finance.
    pub vehicle_id: vehicle::Id,

    /// Down payment the customer pays upfront.
    pub down_payment: Money,

    /// Financing [`Tenor`] in months.
    ///
    /// [`Tenor`]: finance::Tenor
    pub tenor: finance::Tenor,

    /// Contractual [`Terms`] of the new [`Contract`].
    ///
    /// [`Terms`]: contract::Terms
    pub terms: contract::Terms,
}

impl<Db, Sc> Command<CreateContract> for Service<Db, Sc>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<HashMap<user::Id, User>, [user::Id; 2]>>,
            Ok = HashMap<user::Id, User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Allocate<contract::Number>,
            Ok = contract::Number,
            Err = Traced<database::Error>,
        > + Database<Insert<Contract>, Err = Traced<database::Error>>
        + Database<Insert<Application>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = (Contract, Application);
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateContract {
            customer_id,
            provider_id,
            vehicle_id,
            down_payment,
            tenor,
            terms,
        } = cmd;

        let users = self
            .database()
            .execute(Select(By::new([customer_id, provider_id])))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let customer = users
            .get(&customer_id)
            .ok_or(E::UserNotExists(customer_id))
            .map_err(tracerr::wrap!())?;
        if customer.role != user::Role::Customer {
            return Err(tracerr::new!(E::WrongRole {
                user: customer_id,
                expected: user::Role::Customer,
            }));
        }
        let provider = users
            .get(&provider_id)
            .ok_or(E::UserNotExists(provider_id))
            .map_err(tracerr::wrap!())?;
        if provider.role != user::Role::ServiceProvider {
            return Err(tracerr::new!(E::WrongRole {
                user: provider_id,
                expected: user::Role::ServiceProvider,
            }));
        }

        let vehicle = self
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        if vehicle.provider_id != provider_id {
            return Err(tracerr::new!(E::VehicleNotOfProvider {
                vehicle: vehicle_id,
                provider: provider_id,
            }));
        }

        let now = DateTime::now();
        let (financial_terms, payment_schedule) = finance::calculate(
            vehicle.price,
            down_payment,
            tenor,
            self.config().profit_rate,
            self.config().first_payment_delay,
            now,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let number = tx
            .execute(Allocate::<contract::Number>::default())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let contract = Contract {
            id: contract::Id::new(),
            number,
            customer_id,
            provider_id,
            vehicle_id,
            capital_provider_id: None,
            financial_terms,
            payment_schedule,
            terms,
            risk_assessment: None,
            status: contract::Status::Draft,
            reviews: contract::Reviews::default(),
            negotiation: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            version: Version::initial(),
        };
        tx.execute(Insert(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let application = Application {
            id: application::Id::new(),
            contract_id: Some(contract.id),
            applicant_id: customer_id,
            applicant_kind: application::ApplicantKind::Customer,
            phases: application::Phases::default(),
            capital_provider_id: None,
            notifications: Vec::new(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
            version: Version::initial(),
        };
        tx.execute(Insert(application.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok((contract, application))
    }
}

/// Error of [`CreateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Financial terms cannot be derived from the provided inputs.
    #[display("invalid financial terms: {_0}")]
    #[from]
    InvalidTerms(finance::CalculationError),

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

    /// [`Vehicle`] with the provided ID isn't supplied by the provided
    /// provider.
    #[display(
        "`Vehicle(id: {vehicle})` is not supplied by `User(id: {provider})`"
    )]
    VehicleNotOfProvider {
        /// ID of the [`Vehicle`].
        vehicle: vehicle::Id,

        /// ID of the provider [`User`].
        provider: user::Id,
    },
}
