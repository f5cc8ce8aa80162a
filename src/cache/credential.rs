use std::fmt;
use std::sync::Arc;

use crate::helpers::time::unix_seconds;

/// Bearer credential issued by the token endpoint.
///
/// No expiry is tracked: a credential stays valid until the action endpoint
/// rejects it with 401.
#[derive(Clone)]
pub struct Credential {
    value: Arc<str>,
    pub fetched_at_unix_ts: u64, // UNIX TIMESTAMP
}

impl Credential {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self {
            value: value.into(),
            fetched_at_unix_ts: unix_seconds(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"***")
            .field("fetched_at_unix_ts", &self.fetched_at_unix_ts)
            .finish()
    }
}
