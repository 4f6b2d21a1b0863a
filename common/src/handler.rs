//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of a command or a query.
pub trait Handler<Args = ()> {
    /// Type of a successful [`Handler`] outcome.
    type Ok;

    /// Type of this [`Handler`]'s failure.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
