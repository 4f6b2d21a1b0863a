//! [`Command`] for approving the financial review of a [`Contract`].

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

/// [`Command`] for recording an approving capital provider [`Review`] upon
/// a [`Contract`], advancing it to the [`Status::Approved`].
///
/// Only the capital provider assigned on the Shariah approval may record
/// it.
///
/// [`Review`]: contract::Review
/// [`Status::Approved`]: contract::Status::Approved
#[derive(Clone, Debug)]
pub struct CapitalProviderApproveContract {
    /// ID of the [`Contract`] to approve.
    pub contract_id: contract::Id,

    /// ID of the reviewing capital provider [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub capital_provider_id: user::Id,

    /// Free-form [`Comments`] of the review.
    ///
    /// [`Comments`]: contract::Comments
    pub comments: Option<contract::Comments>,
}

impl<Db, Sc> Command<CapitalProviderApproveContract> for Service<Db, Sc>
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
        cmd: CapitalProviderApproveContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CapitalProviderApproveContract {
            contract_id,
            capital_provider_id,
            comments,
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
            // Not disclosing the contract existence to capital providers
            // it was never assigned to.
            .filter(|c| c.capital_provider_id == Some(capital_provider_id))
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        contract
            .apply(contract::Trigger::CapitalProviderApprove, now.coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;
        contract.record_financial_review(
            contract::Review {
                reviewer_id: capital_provider_id,
                decision: contract::Decision::Approved,
                comments,
                reviewed_at: now.coerce(),
            },
            now.coerce(),
        );

        let mut app = tx
            .execute(Select(By::<Option<Application>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ApplicationNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        app.advance_phase(
            application::Phase::Finance,
            application::PhaseStatus::Approved,
            now.coerce(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;
        app.advance_phase(
            application::Phase::Partners,
            application::PhaseStatus::Approved,
            now.coerce(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;
        app.push_notification(
            Notification::new(
                notification::Kind::Approval,
                "Financial review approved",
                format!(
                    "Contract {} passed the capital provider review",
                    contract.number,
                ),
                notification::Priority::Normal,
                now.coerce(),
            ),
            now.coerce(),
        );
        app.push_notification(
            Notification::new(
                notification::Kind::StatusChange,
                "Contract approved",
                format!(
                    "Contract {} awaits the customer's acceptance",
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

/// Error of [`CapitalProviderApproveContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Contract`] with the provided ID doesn't exist (or has a different
    /// capital provider assigned).
    #[display("`Contract(id: {_0})` doesn't exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// No [`Application`] is paired with the [`Contract`].
    #[display("no `Application` tracks `Contract(id: {_0})`")]
    ApplicationNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] [`Status`] doesn't allow the approval.
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
