//! [`Command`] for accepting approved [`Contract`] terms.

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

/// [`Command`] for accepting the terms of an approved [`Contract`],
/// advancing it to the terminal [`Status::Accepted`].
///
/// [`Status::Accepted`]: contract::Status::Accepted
#[derive(Clone, Copy, Debug)]
pub struct AcceptContractTerms {
    /// ID of the [`Contract`] to accept.
    pub contract_id: contract::Id,

    /// ID of the customer [`User`] owning the [`Contract`].
    ///
    /// [`User`]: crate::domain::User
    pub customer_id: user::Id,
}

impl<Db, Sc> Command<AcceptContractTerms> for Service<Db, Sc>
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
        cmd: AcceptContractTerms,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptContractTerms {
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

        contract
            .apply(contract::Trigger::AcceptTerms, DateTime::now().coerce())
            .map_err(tracerr::from_and_wrap!(=> E))?;

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

/// Error of [`AcceptContractTerms`] [`Command`] execution.
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

    /// [`Contract`] [`Status`] doesn't allow the acceptance.
    ///
    /// [`Status`]: contract::Status
    #[display("{_0}")]
    #[from]
    Transition(contract::TransitionError),
}
