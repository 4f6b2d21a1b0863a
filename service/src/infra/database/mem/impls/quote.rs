//! [`Quote`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{quote, Quote},
    infra::{
        database::{
            self,
            mem::{self, Storage},
            Mem,
        },
        Database,
    },
};

impl<C> Database<Select<By<Option<Quote>, quote::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = Option<Quote>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Quote>, quote::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.with(move |state| state.quotes.get(&id).cloned()).await)
    }
}

impl<C> Database<Lock<By<Quote, quote::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Quote, quote::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // A transaction holds the whole `State` exclusively, so a
        // per-entity lock has nothing left to do.
        Ok(())
    }
}

impl<C> Database<Insert<Quote>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(quote): Insert<Quote>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            if state.quotes.contains_key(&quote.id) {
                return Err(mem::Error::AlreadyExists { entity: "Quote" });
            }
            drop(state.quotes.insert(quote.id, quote));
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Update<Quote>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(quote): Update<Quote>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            let stored = state
                .quotes
                .get_mut(&quote.id)
                .ok_or(mem::Error::Missing { entity: "Quote" })?;
            if quote.version <= stored.version {
                return Err(mem::Error::VersionConflict { entity: "Quote" });
            }
            *stored = quote;
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}
