//! [`Contract`]-related [`Database`] implementations.

use common::operations::{Allocate, By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{contract, Contract},
    infra::{
        database::{
            self,
            mem::{self, Storage},
            Mem,
        },
        Database,
    },
};

impl<C> Database<Select<By<Option<Contract>, contract::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .with(move |state| state.contracts.get(&id).cloned())
            .await)
    }
}

impl<C> Database<Lock<By<Contract, contract::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // A transaction holds the whole `State` exclusively, so a
        // per-entity lock has nothing left to do.
        Ok(())
    }
}

impl<C> Database<Allocate<contract::Number>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = contract::Number;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<contract::Number>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .with(|state| {
                state.contract_seq += 1;
                contract::Number::from_seq(state.contract_seq)
            })
            .await)
    }
}

impl<C> Database<Insert<Contract>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            if state.contracts.contains_key(&contract.id) {
                return Err(mem::Error::AlreadyExists {
                    entity: "Contract",
                });
            }
            drop(state.contracts.insert(contract.id, contract));
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Update<Contract>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            let stored = state
                .contracts
                .get_mut(&contract.id)
                .ok_or(mem::Error::Missing { entity: "Contract" })?;
            if contract.version <= stored.version {
                return Err(mem::Error::VersionConflict {
                    entity: "Contract",
                });
            }
            *stored = contract;
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}
