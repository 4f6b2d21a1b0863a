//! [`Command`] for approving the Shariah review of a [`Contract`].

use std::collections::HashMap;

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        application::{self, notification, Notification},
        contract, user, Application, Contract, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording an approving Shariah scholar [`Review`] upon
/// a [`Contract`], advancing it to the [`Status::FinancialReview`] and
/// assigning a capital provider.
///
/// [`Review`]: contract::Review
/// [`Status::FinancialReview`]: contract::Status::FinancialReview
#[derive(Clone, Debug)]
pub struct ScholarApproveContract {
    /// ID of the [`Contract`] to approve.
    pub contract_id: contract::Id,

    /// ID of the reviewing scholar [`User`].
    pub scholar_id: user::Id,

    /// ID of the capital provider [`User`] to assign.
    pub capital_provider_id: user::Id,

    /// Free-form [`Comments`] of the review.
    ///
    /// [`Comments`]: contract::Comments
    pub comments: Option<contract::Comments>,
}

impl<Db, Sc> Command<ScholarApproveContract> for Service<Db, Sc>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<HashMap<user::Id, User>, [user::Id; 2]>>,
            Ok = HashMap<user::Id, User>,
            Err = Traced<database::Error>,
        >,
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
        cmd: ScholarApproveContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ScholarApproveContract {
            contract_id,
            scholar_id,
            capital_provider_id,
            comments,
        } = cmd;

        let users = self
            .database()
            .execute(Select(By::new([scholar_id, capital_provider_id])))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let scholar = users
            .get(&scholar_id)
            .ok_or(E::UserNotExists(scholar_id))
            .map_err(tracerr::wrap!())?;
        if scholar.role != user::Role::Scholar {
            return Err(tracerr::new!(E::WrongRole {
                user: scholar_id,
                expected: user::Role::Scholar,
            }));
        }
        let capital_provider = users
            .get(&capital_provider_id)
            .ok_or(E::UserNotExists(capital_provider_id))
            .map_err(tracerr::wrap!())?;
        if capital_provider.role != user::Role::CapitalProvider {
            return Err(tracerr::new!(E::WrongRole {
                user: capital_provider_id,
                expected: user::Role::CapitalProvider,
            }));
        }

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
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        // The transition guard is what makes racing approvals settle into
        // exactly one success: the loser finds the contract advanced
        // already.
        contract
            .apply(contract::Trigger::ScholarApprove, now.coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;
        contract.record_scholar_review(
            contract::Review {
                reviewer_id: scholar_id,
                decision: contract::Decision::Approved,
                comments,
                reviewed_at: now.coerce(),
            },
            now.coerce(),
        );
        contract.assign_capital_provider(capital_provider_id, now.coerce());

        let mut app = tx
            .execute(Select(By::<Option<Application>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ApplicationNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        app.advance_phase(
            application::Phase::Scholar,
            application::PhaseStatus::Approved,
            now.coerce(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;
        app.advance_phase(
            application::Phase::Finance,
            application::PhaseStatus::InProgress,
            now.coerce(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;
        app.advance_phase(
            application::Phase::Partners,
            application::PhaseStatus::InProgress,
            now.coerce(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;
        app.assign_capital_provider(capital_provider_id, now.coerce());
        app.push_notification(
            Notification::new(
                notification::Kind::Approval,
                "Shariah review approved",
                format!(
                    "Contract {} passed the Shariah scholar review",
                    contract.number,
                ),
                notification::Priority::Normal,
                now.coerce(),
            ),
            now.coerce(),
        );
        app.push_notification(
            Notification::new(
                notification::Kind::Assignment,
                "Capital provider assigned",
                format!(
                    "Contract {} awaits the financial review",
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

/// Error of [`ScholarApproveContract`] [`Command`] execution.
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

    /// [`Contract`] with the provided ID doesn't exist.
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
