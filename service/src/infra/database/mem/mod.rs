//! In-memory [`Database`] implementation.

mod impls;

use std::{collections::HashMap, future::Future, sync::Arc};

use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    application, contract, quote, user, vehicle, Application, Contract,
    Quote, User, Vehicle,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Mem<T = NonTx>(T);

impl Mem {
    /// Creates a new empty [`Mem`] client.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx::default())
    }
}

/// Entire dataset of a [`Mem`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`User`]s.
    pub users: HashMap<user::Id, User>,

    /// Stored [`Vehicle`]s.
    pub vehicles: HashMap<vehicle::Id, Vehicle>,

    /// Stored [`Contract`]s.
    pub contracts: HashMap<contract::Id, Contract>,

    /// Stored [`Application`]s.
    pub applications: HashMap<application::Id, Application>,

    /// Stored [`Quote`]s.
    pub quotes: HashMap<quote::Id, Quote>,

    /// Last allocated [`contract::Number`] sequence value.
    pub contract_seq: u64,
}

/// Client able to run closures over the [`State`] of a [`Mem`] database.
pub trait Storage {
    /// Runs the provided function over the [`State`].
    fn with<F, R>(&self, f: F) -> impl Future<Output = R> + Send
    where
        F: FnOnce(&mut State) -> R + Send,
        R: Send;
}

/// Non-transactional in-memory database client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] of the database.
    state: Arc<Mutex<State>>,
}

impl Storage for NonTx {
    async fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut State) -> R + Send,
        R: Send,
    {
        f(&mut *self.state.lock().await)
    }
}

/// Transactional in-memory database client.
///
/// Holds the whole [`State`] exclusively for its lifetime, applying all the
/// operations to a staged copy, which replaces the shared [`State`] on
/// [`Commit`] and is discarded otherwise.
///
/// [`Commit`]: common::operations::Commit
#[derive(Clone, Debug)]
pub struct Tx {
    /// Inner representation of this client.
    inner: Arc<Mutex<Inner>>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// Exclusive guard over the shared [`State`], held for the whole
    /// transaction lifetime.
    guard: OwnedMutexGuard<State>,

    /// Copy of the [`State`] the transaction operations apply to.
    staged: State,
}

impl Tx {
    /// Begins a new transaction over the provided [`NonTx`] client.
    ///
    /// Awaits until any other running transaction releases the [`State`].
    async fn begin(non_tx: &NonTx) -> Self {
        let guard = Arc::clone(&non_tx.state).lock_owned().await;
        let staged = guard.clone();
        Self {
            inner: Arc::new(Mutex::new(Inner { guard, staged })),
        }
    }

    /// Commits the staged [`State`] of this [`Tx`] client.
    pub(super) async fn commit(&self) {
        let mut inner = self.inner.lock().await;
        let Inner { guard, staged } = &mut *inner;
        (**guard).clone_from(staged);
    }
}

impl Storage for Tx {
    async fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut State) -> R + Send,
        R: Send,
    {
        f(&mut self.inner.lock().await.staged)
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Entity is not stored.
    #[display("`{entity}` not found")]
    Missing {
        /// Name of the missing entity.
        entity: &'static str,
    },

    /// Entity with the same ID is already stored.
    #[display("`{entity}` already exists")]
    AlreadyExists {
        /// Name of the duplicated entity.
        entity: &'static str,
    },

    /// Entity version mismatches the stored one.
    #[display("`{entity}` was modified concurrently")]
    VersionConflict {
        /// Name of the outdated entity.
        entity: &'static str,
    },
}
