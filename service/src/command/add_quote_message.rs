//! [`Command`] for posting a [`Message`] into a [`Quote`] thread.
//!
//! [`Message`]: quote::Message

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

/// [`Command`] for appending a [`Message`] to the negotiation thread of a
/// [`Quote`].
///
/// Allowed for the [`Quote`] participants and for [`Role::Admin`]
/// [`User`]s, while the [`Quote`] is not settled.
///
/// [`Message`]: quote::Message
/// [`Role::Admin`]: user::Role::Admin
#[derive(Clone, Debug)]
pub struct AddQuoteMessage {
    /// ID of the [`Quote`] to post into.
    pub quote_id: quote::Id,

    /// ID of the posting [`User`].
    pub sender_id: user::Id,

    /// Text of the message.
    pub text: quote::Text,

    /// Attachment references of the message.
    pub attachments: Vec<String>,
}

impl<Db, Sc> Command<AddQuoteMessage> for Service<Db, Sc>
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
        cmd: AddQuoteMessage,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddQuoteMessage {
            quote_id,
            sender_id,
            text,
            attachments,
        } = cmd;

        let sender = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(sender_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(sender_id))
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
            // Not disclosing the quote existence to non-participants.
            // Admins are exempt.
            .filter(|q| {
                q.customer_id == sender_id
                    || q.provider_id == sender_id
                    || sender.role == user::Role::Admin
            })
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        quote
            .push_message(
                quote::Message {
                    sender_id,
                    sender_role: sender.role,
                    text,
                    attachments,
                    sent_at: now.coerce(),
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

/// Error of [`AddQuoteMessage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID doesn't exist.
    #[display("`User(id: {_0})` doesn't exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`Quote`] with the provided ID doesn't exist (or the acting
    /// [`User`] doesn't participate in it).
    #[display("`Quote(id: {_0})` doesn't exist")]
    QuoteNotExists(#[error(not(source))] quote::Id),

    /// [`Quote`] [`Status`] doesn't allow posting messages.
    ///
    /// [`Status`]: quote::Status
    #[display("{_0}")]
    #[from]
    Transition(quote::TransitionError),
}
