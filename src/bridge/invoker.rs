//! Remote-invocation seam

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::TransportResult;

/// Delivers one named command with a keyed argument bundle to the host and
/// returns its raw reply.
///
/// Implementations must not retry and must not impose a timeout unless one
/// was configured explicitly.
#[async_trait]
pub trait HostInvoker: Send + Sync {
    async fn invoke(&self, command: &str, args: JsonValue) -> TransportResult<JsonValue>;
}

#[async_trait]
impl<T: HostInvoker + ?Sized> HostInvoker for Arc<T> {
    async fn invoke(&self, command: &str, args: JsonValue) -> TransportResult<JsonValue> {
        (**self).invoke(command, args).await
    }
}
