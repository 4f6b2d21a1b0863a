//! [`Command`] for responding to a [`Quote`].

use std::time::Duration;

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{quote, user, Quote, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a provider [`Response`] upon a [`Quote`],
/// advancing it to the [`Status::Responded`] and extending its validity
/// window.
///
/// Responding again overwrites the previous [`Response`]. Allowed for the
/// owning provider and for [`Role::Admin`] [`User`]s.
///
/// [`Response`]: quote::Response
/// [`Role::Admin`]: user::Role::Admin
/// [`Status::Responded`]: quote::Status::Responded
#[derive(Clone, Debug)]
pub struct RespondToQuote {
    /// ID of the [`Quote`] to respond to.
    pub quote_id: quote::Id,

    /// ID of the responding [`User`].
    pub responder_id: user::Id,

    /// Free-form message accompanying the response.
    pub message: Option<quote::Text>,

    /// Revised [`Pricing`], if adjusted.
    ///
    /// [`Pricing`]: quote::Pricing
    pub pricing: Option<quote::Pricing>,

    /// Revised validity period, if adjusted.
    pub validity: Option<Duration>,

    /// Revised delivery period, if adjusted.
    pub delivery: Option<Duration>,
}

impl<Db, Sc> Command<RespondToQuote> for Service<Db, Sc>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<Quote, quote::Id>>, Err = Traced<database::Error>>
        + Database<Update<Quote>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Quote;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RespondToQuote,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RespondToQuote {
            quote_id,
            responder_id,
            message,
            pricing,
            validity,
            delivery,
        } = cmd;

        let responder = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(responder_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(responder_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut quote = tx
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            // Not disclosing the quote existence to non-owners. Admins are
            // exempt.
            .filter(|q| {
                q.provider_id == responder_id
                    || responder.role == user::Role::Admin
            })
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        quote
            .respond(
                quote::Response {
                    responder_id,
                    message,
                    pricing,
                    validity,
                    delivery,
                    responded_at: now.coerce(),
                },
                now,
            )
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Update(quote.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(quote)
    }
}

/// Error of [`RespondToQuote`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID doesn't exist.
    #[display("`User(id: {_0})` doesn't exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`Quote`] with the provided ID doesn't exist (or isn't owned by the
    /// acting [`User`]).
    #[display("`Quote(id: {_0})` doesn't exist")]
    QuoteNotExists(#[error(not(source))] quote::Id),

    /// [`Quote`] [`Status`] doesn't allow responding.
    ///
    /// [`Status`]: quote::Status
    #[display("{_0}")]
    #[from]
    Transition(quote::TransitionError),
}
