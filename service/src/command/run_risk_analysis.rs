//! [`Command`] for running a risk analysis over a [`Contract`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract, risk, user, Contract, RiskAssessment, RiskScorer,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for running a risk analysis over a drafted [`Contract`] and
/// attaching the produced [`RiskAssessment`] to it.
///
/// Re-running the analysis overwrites the previous [`RiskAssessment`].
#[derive(Clone, Copy, Debug)]
pub struct RunRiskAnalysis {
    /// ID of the [`Contract`] to analyze.
    pub contract_id: contract::Id,

    /// ID of the customer [`User`] owning the [`Contract`].
    ///
    /// [`User`]: crate::domain::User
    pub customer_id: user::Id,
}

impl<Db, Sc> Command<RunRiskAnalysis> for Service<Db, Sc>
where
    Sc: RiskScorer,
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = RiskAssessment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RunRiskAnalysis,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RunRiskAnalysis {
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
        if contract.status != contract::Status::Draft {
            return Err(tracerr::new!(E::ContractNotDraft {
                contract: contract_id,
                status: contract.status,
            }));
        }

        let now = DateTime::now();
        let assessment = self
            .scorer()
            .assess(&contract, now)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        log::debug!(
            "`Contract(id: {contract_id})` scored at `{}` ({})",
            assessment.score,
            assessment.level,
        );
        contract.attach_risk_assessment(assessment.clone(), now.coerce());

        tx.execute(Update(contract))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(assessment)
    }
}

/// Error of [`RunRiskAnalysis`] [`Command`] execution.
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

    /// [`Contract`] already left the [`Status::Draft`].
    ///
    /// [`Status::Draft`]: contract::Status::Draft
    #[display("`Contract(id: {contract})` is in `{status}` status")]
    ContractNotDraft {
        /// ID of the [`Contract`].
        contract: contract::Id,

        /// Actual [`Status`] of the [`Contract`].
        ///
        /// [`Status`]: contract::Status
        status: contract::Status,
    },

    /// Risk scoring failed.
    #[display("{_0}")]
    #[from]
    Scoring(risk::ScoringError),
}
