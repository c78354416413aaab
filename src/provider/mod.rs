//! Provider capability layer.
//!
//! The router never constructs transports itself. Callers supply each
//! upstream endpoint as an object implementing [`RpcProvider`], and the
//! router dispatches logical calls through that interface.

use async_trait::async_trait;
use serde_json::Value;

mod error;

pub use error::ProviderError;

/// A single upstream RPC endpoint the router can dispatch calls to.
///
/// Implementations encapsulate the transport entirely (HTTP, WebSocket, or
/// an in-process stub for testing); the router only sees `(method, params)`
/// in and a JSON result or error out.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use rpc_router::provider::{ProviderError, RpcProvider};
/// use serde_json::{json, Value};
///
/// struct Fixed(Value);
///
/// #[async_trait]
/// impl RpcProvider for Fixed {
///     async fn call(&self, _method: &str, _params: Value) -> Result<Value, ProviderError> {
///         Ok(self.0.clone())
///     }
///
///     async fn health_check(&self) -> Result<bool, ProviderError> {
///         Ok(true)
///     }
/// }
///
/// let provider = Fixed(json!(12345));
/// let slot = tokio_test::block_on(provider.call("getSlot", json!([]))).unwrap();
/// assert_eq!(slot, json!(12345));
/// ```
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn RpcProvider>`.
/// All async methods use `async_trait` for compatibility with trait objects.
///
/// # Cancellation Safety
///
/// Both methods must be cancellation-safe: the router drops in-flight
/// futures when a per-attempt timeout or a caller deadline expires.
#[async_trait]
pub trait RpcProvider: Send + Sync + 'static {
    /// Execute a single RPC method call.
    ///
    /// # Returns
    ///
    /// - `Ok(Value)` with the decoded result on success
    /// - `Err(ProviderError)` on timeout, transport failure, an error
    ///   response from the upstream, or a malformed body
    async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Probe the endpoint out-of-band.
    ///
    /// `Ok(false)` means the endpoint answered but reports itself
    /// unhealthy; transport-level failures are errors.
    async fn health_check(&self) -> Result<bool, ProviderError>;
}

impl std::fmt::Debug for dyn RpcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RpcProvider")
    }
}
