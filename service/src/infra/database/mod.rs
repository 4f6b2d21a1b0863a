//! [`Database`]-related implementations.

pub mod mem;

use derive_more::{Display, Error as StdError, From};

pub use self::mem::Mem;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Mem`] error.
    Mem(mem::Error),
}
