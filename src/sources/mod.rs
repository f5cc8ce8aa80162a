//! Token sources
//!
//! [`TokenProvider`] is the seam between the action client and whatever hands
//! out bearer credentials. Production uses [`oauth2::OAuth2TokenProvider`];
//! tests substitute fakes that count calls.

use std::future::Future;
use std::sync::Arc;

use crate::cache::credential::Credential;
use crate::error::ProviderError;

pub mod oauth2;

pub trait TokenProvider: Send + Sync {
    /// Cached credential, fetching one first if the cache is empty.
    fn get(&self) -> impl Future<Output = Result<Credential, ProviderError>> + Send;

    /// Forget the cached credential. Idempotent.
    fn invalidate(&self) -> impl Future<Output = ()> + Send;
}

impl<P: TokenProvider> TokenProvider for Arc<P> {
    fn get(&self) -> impl Future<Output = Result<Credential, ProviderError>> + Send {
        (**self).get()
    }

    fn invalidate(&self) -> impl Future<Output = ()> + Send {
        (**self).invalidate()
    }
}
