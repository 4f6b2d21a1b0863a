//! [`Application`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{application, contract, Application},
    infra::{
        database::{
            self,
            mem::{self, Storage},
            Mem,
        },
        Database,
    },
};

impl<C> Database<Select<By<Option<Application>, application::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = Option<Application>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Application>, application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .with(move |state| state.applications.get(&id).cloned())
            .await)
    }
}

impl<C> Database<Select<By<Option<Application>, contract::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = Option<Application>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Application>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let contract_id = by.into_inner();
        Ok(self
            .with(move |state| {
                state
                    .applications
                    .values()
                    .find(|app| app.contract_id == Some(contract_id))
                    .cloned()
            })
            .await)
    }
}

impl<C> Database<Lock<By<Application, application::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Application, application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // A transaction holds the whole `State` exclusively, so a
        // per-entity lock has nothing left to do.
        Ok(())
    }
}

impl<C> Database<Insert<Application>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(app): Insert<Application>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            if state.applications.contains_key(&app.id) {
                return Err(mem::Error::AlreadyExists {
                    entity: "Application",
                });
            }
            drop(state.applications.insert(app.id, app));
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Update<Application>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(app): Update<Application>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            let stored = state
                .applications
                .get_mut(&app.id)
                .ok_or(mem::Error::Missing {
                    entity: "Application",
                })?;
            if app.version <= stored.version {
                return Err(mem::Error::VersionConflict {
                    entity: "Application",
                });
            }
            *stored = app;
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}
