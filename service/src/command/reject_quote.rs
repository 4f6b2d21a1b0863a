//! [`Command`] for rejecting a [`Quote`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{quote, user, Quote},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for rejecting a [`Quote`] on behalf of its customer,
/// settling it into the terminal [`Status::Rejected`].
///
/// Only a sent or viewed [`Quote`] may be rejected; an optional note goes
/// into the [`Quote`] thread atomically with the rejection.
///
/// [`Status::Rejected`]: quote::Status::Rejected
#[derive(Clone, Debug)]
pub struct RejectQuote {
    /// ID of the [`Quote`] to reject.
    pub quote_id: quote::Id,

    /// ID of the customer [`User`] the [`Quote`] was sent to.
    ///
    /// [`User`]: crate::domain::User
    pub customer_id: user::Id,

    /// Optional note to record in the [`Quote`] thread.
    pub note: Option<quote::Text>,
}

impl<Db, Sc> Command<RejectQuote> for Service<Db, Sc>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
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

    async fn execute(&self, cmd: RejectQuote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RejectQuote {
            quote_id,
            customer_id,
            note,
        } = cmd;

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
            // Not disclosing the quote existence to non-recipients.
            .filter(|q| q.customer_id == customer_id)
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let note = note.map(|text| quote::Message {
            sender_id: customer_id,
            sender_role: user::Role::Customer,
            text,
            attachments: Vec::new(),
            sent_at: now.coerce(),
        });
        quote
            .reject(note, now)
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

/// Error of [`RejectQuote`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Quote`] with the provided ID doesn't exist (or wasn't sent to the
    /// acting [`User`]).
    ///
    /// [`User`]: crate::domain::User
    #[display("`Quote(id: {_0})` doesn't exist")]
    QuoteNotExists(#[error(not(source))] quote::Id),

    /// [`Quote`] [`Status`] doesn't allow the rejection.
    ///
    /// [`Status`]: quote::Status
    #[display("{_0}")]
    #[from]
    Transition(quote::TransitionError),
}
