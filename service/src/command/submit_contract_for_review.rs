//! [`Command`] for submitting a [`Contract`] for the Shariah review.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        application::{self, notification, Notification},
        contract, user, Application, Contract,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for submitting a generated [`Contract`] for the Shariah
/// scholar review, advancing it to the [`Status::ScholarReview`].
///
/// [`Status::ScholarReview`]: contract::Status::ScholarReview
#[derive(Clone, Copy, Debug)]
pub struct SubmitContractForReview {
    /// ID of the [`Contract`] to submit.
    pub contract_id: contract::Id,

    /// ID of the customer [`User`] owning the [`Contract`].
    ///
    /// [`User`]: crate::domain::User
    pub customer_id: user::Id,
}

impl<Db, Sc> Command<SubmitContractForReview> for Service<Db, Sc>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Application>, contract::Id>>,
            Ok = Option<Application>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Update<Application>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitContractForReview,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitContractForReview {
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

        let now = DateTime::now();
        contract
            .apply(contract::Trigger::SubmitForReview, now.coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let mut app = tx
            .execute(Select(By::<Option<Application>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ApplicationNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        app.advance_phase(
            application::Phase::Scholar,
            application::PhaseStatus::InProgress,
            now.coerce(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;
        app.push_notification(
            Notification::new(
                notification::Kind::StatusChange,
                "Contract submitted for review",
                format!(
                    "Contract {} awaits a Shariah scholar review",
                    contract.number,
                ),
                notification::Priority::High,
                now.coerce(),
            ),
            now.coerce(),
        );

        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Update(app))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(contract)
    }
}

/// Error of [`SubmitContractForReview`] [`Command`] execution.
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

    /// No [`Application`] is paired with the [`Contract`].
    #[display("no `Application` tracks `Contract(id: {_0})`")]
    ApplicationNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] [`Status`] doesn't allow the submission.
    ///
    /// [`Status`]: contract::Status
    #[display("{_0}")]
    #[from]
    Transition(contract::TransitionError),

    /// [`Application`] review phase cannot be advanced.
    #[display("{_0}")]
    #[from]
    PhaseRegression(application::RegressionError),
}
