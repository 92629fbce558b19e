//! The network collaborator contract.
//!
//! The core never talks to a transport. It hands a [`FetchRequest`] to a
//! collaborator and awaits the result; retries, timeouts and authentication
//! all belong on the other side of this trait.

use super::messages::{FetchRequest, QueryResult};
use futures_util::future::LocalBoxFuture;

/// Resolves requests issued by the fetch gates.
///
/// The returned future must not borrow `self` or the request. Errors are
/// plain messages; the core records them and never retries.
pub trait NetworkCollaborator {
    /// Starts the request and returns a future resolving to its result.
    ///
    /// Called once per issued request, from within the request's `fetch` span.
    fn issue(&self, request: &FetchRequest) -> LocalBoxFuture<'static, Result<QueryResult, String>>;
}

impl<F> NetworkCollaborator for F
where
    F: Fn(&FetchRequest) -> LocalBoxFuture<'static, Result<QueryResult, String>>,
{
    fn issue(&self, request: &FetchRequest) -> LocalBoxFuture<'static, Result<QueryResult, String>> {
        self(request)
    }
}
