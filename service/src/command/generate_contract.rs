//! [`Command`] for generating the formal [`Contract`] document.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, user, vehicle, Contract, Vehicle},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for generating the formal document of a drafted
/// [`Contract`], advancing it to the [`Status::PendingApproval`].
///
/// Requires a [`RiskAssessment`] to be attached beforehand.
///
/// [`RiskAssessment`]: crate::domain::RiskAssessment
/// [`Status::PendingApproval`]: contract::Status::PendingApproval
#[derive(Clone, Copy, Debug)]
pub struct GenerateContract {
    /// ID of the [`Contract`] to generate the document for.
    pub contract_id: contract::Id,

    /// ID of the customer [`User`] owning the [`Contract`].
    ///
    /// [`User`]: crate::domain::User
    pub customer_id: user::Id,
}

impl<Db, Sc> Command<GenerateContract> for Service<Db, Sc>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = read::contract::Document;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: GenerateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let GenerateContract {
            contract_id,
            customer_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            // Not disclosing the contract existence to non-owners.
            .filter(|c| c.customer_id == customer_id)
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if contract.risk_assessment.is_none() {
            return Err(tracerr::new!(E::RiskAssessmentMissing(contract_id)));
        }

        let now = DateTime::now();
        contract
            .apply(contract::Trigger::Generate, now.coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(
                contract.vehicle_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(contract.vehicle_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(read::contract::Document {
            contract,
            vehicle: read::contract::VehicleSummary::from(&vehicle),
            generated_at: now.coerce(),
        })
    }
}

/// Error of [`GenerateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Contract`] with the provided ID doesn't exist (or isn't owned by
    /// the acting [`User`]).
    ///
    /// [`User`]: crate::domain::User
    #[display("`Contract(id: {_0})` doesn't exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] has no [`RiskAssessment`] attached yet.
    ///
    /// [`RiskAssessment`]: crate::domain::RiskAssessment
    #[display("`Contract(id: {_0})` has no risk assessment")]
    RiskAssessmentMissing(#[error(not(source))] contract::Id),

    /// [`Vehicle`] referenced by the [`Contract`] doesn't exist.
    #[display("`Vehicle(id: {_0})` doesn't exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Contract`] [`Status`] doesn't allow the document generation.
    ///
    /// [`Status`]: contract::Status
    #[display("{_0}")]
    #[from]
    Transition(contract::TransitionError),
}
