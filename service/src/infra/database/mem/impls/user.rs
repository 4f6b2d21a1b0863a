//! [`User`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            mem::{self, Storage},
            Mem,
        },
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<user::Id, User>, IDs>>> for Mem<C>
where
    C: Storage + Sync,
    IDs: AsRef<[user::Id]> + Send,
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let ids: &[user::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .with(|state| {
                ids.iter()
                    .filter_map(|id| {
                        state.users.get(id).map(|user| (*id, user.clone()))
                    })
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Mem<C>
where
    C: Storage + Sync,
    Self: Database<
        Select<By<HashMap<user::Id, User>, [user::Id; 1]>>,
        Ok = HashMap<user::Id, User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<User>> for Mem<C>
where
    C: Storage + Sync,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(move |state| {
            if state.users.contains_key(&user.id) {
                return Err(mem::Error::AlreadyExists { entity: "User" });
            }
            drop(state.users.insert(user.id, user));
            Ok(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}
