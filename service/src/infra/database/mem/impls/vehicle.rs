//! [`Vehicle`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{
        database::{
            self,
            mem::{self, Storage},
            Mem,
        },
        Database,
    },
};

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .with(move |state| state.vehicles.get(&id).cloned())
            .await)
    }
}

impl<C> Database<Lock<By<Vehicle, vehicle::Id>>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // A transaction holds the whole `State` exclusively, so a
        // per-entity lock has nothing left to do.
        Ok(())
    }
}

impl<C> Database<Insert<Vehicle>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            if state.vehicles.contains_key(&vehicle.id) {
                return Err(mem::Error::AlreadyExists { entity: "Vehicle" });
            }
            drop(state.vehicles.insert(vehicle.id, vehicle));
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C> Database<Update<Vehicle>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            let stored = state
                .vehicles
                .get_mut(&vehicle.id)
                .ok_or(mem::Error::Missing { entity: "Vehicle" })?;
            if vehicle.version <= stored.version {
                return Err(mem::Error::VersionConflict {
                    entity: "Vehicle",
                });
            }
            *stored = vehicle;
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}
