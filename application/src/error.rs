//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::infra::database::{self, mem};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        /// JSON body of an [`Error`] response.
        #[derive(Serialize)]
        struct Body {
            /// [`Error`] code.
            code: Code,

            /// [`Error`] message.
            message: String,

            /// Backtrace of the [`Error`].
            #[serde(skip_serializing_if = "Vec::is_empty")]
            backtrace: Vec<String>,
        }

        let Self {
            code,
            status_code,
            backtrace,
            message,
        } = self;

        (
            status_code,
            Json(Body {
                code,
                message,
                backtrace: backtrace
                    .iter()
                    .flat_map(|trace| trace.iter())
                    .map(ToString::to_string)
                    .collect(),
            }),
        )
            .into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CONCURRENT_MODIFICATION"]
                #[status = CONFLICT]
                #[message = "Entity was modified concurrently, retry the \
                             operation"]
                Concurrent,
            }
        }

        match self {
            Self::Mem(e) => match e {
                mem::Error::VersionConflict { .. } => {
                    Some(Error::Concurrent.into())
                }
                mem::Error::Missing { .. }
                | mem::Error::AlreadyExists { .. } => None,
            },
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::response::IntoResponse as _;
    use service::infra::database::{self, mem};
    use tracerr::Traced;

    use super::AsError as _;

    fn conflict() -> Traced<database::Error> {
        tracerr::new!(database::Error::Mem(mem::Error::VersionConflict {
            entity: "Contract",
        }))
    }

    #[test]
    fn traced_conversion_attaches_backtrace() {
        let error = conflict().into_error();

        assert_eq!(error.code, "CONCURRENT_MODIFICATION");
        assert_eq!(error.status_code, http::StatusCode::CONFLICT);
        let trace = error.backtrace.as_ref().unwrap();
        assert!(trace.iter().next().is_some());
    }

    #[test]
    fn conflict_response_carries_409() {
        let response = conflict().into_error().into_response();

        assert_eq!(response.status(), http::StatusCode::CONFLICT);
    }
}
