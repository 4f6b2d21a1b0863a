//! [`Command`] for opening a [`Negotiation`] over approved terms.
//!
//! [`Negotiation`]: contract::Negotiation

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, user, Contract},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for opening a [`Negotiation`] over the terms of an approved
/// [`Contract`], advancing it to the [`Status::Negotiation`].
///
/// [`Negotiation`]: contract::Negotiation
/// [`Status::Negotiation`]: contract::Status::Negotiation
#[derive(Clone, Debug)]
pub struct InitiateNegotiation {
    /// ID of the [`Contract`] to negotiate over.
    pub contract_id: contract::Id,

    /// ID of the customer [`User`] owning the [`Contract`].
    ///
    /// [`User`]: crate::domain::User
    pub customer_id: user::Id,

    /// [`Reason`] for opening the negotiation.
    ///
    /// [`Reason`]: contract::Reason
    pub reason: contract::Reason,

    /// Changes the customer proposes.
    pub proposed_changes: contract::ProposedChanges,
}

impl<Db, Sc> Command<InitiateNegotiation> for Service<Db, Sc>
where
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
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: InitiateNegotiation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let InitiateNegotiation {
            contract_id,
            customer_id,
            reason,
            proposed_changes,
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
            .apply(contract::Trigger::InitiateNegotiation, now.coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;
        contract.open_negotiation(
            contract::Negotiation {
                reason,
                proposed_changes,
                opened_at: now.coerce(),
            },
            now.coerce(),
        );

        tx.execute(Update(contract.clone()))
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

/// Error of [`InitiateNegotiation`] [`Command`] execution.
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

    /// [`Contract`] [`Status`] doesn't allow opening a negotiation.
    ///
    /// [`Status`]: contract::Status
    #[display("{_0}")]
    #[from]
    Transition(contract::TransitionError),
}
