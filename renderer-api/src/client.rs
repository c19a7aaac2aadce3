use crate::action::UpnpAction;
use crate::error::Result;
use crate::transport::ControlTransport;
use tracing::debug;

/// A client for executing typed actions against one renderer
///
/// Bridges the stateless action definitions and a [`ControlTransport`].
/// Failures are returned as-is; the client never retries.
///
/// # Example
/// ```rust,ignore
/// use renderer_api::services::av_transport::{GetTransportInfo, GetTransportInfoRequest};
///
/// let info = client.execute::<GetTransportInfo>(&GetTransportInfoRequest {})?;
/// println!("{}", info.current_transport_state);
/// ```
pub struct RendererClient {
    transport: Box<dyn ControlTransport>,
}

impl RendererClient {
    pub fn new(transport: Box<dyn ControlTransport>) -> Self {
        Self { transport }
    }

    /// Execute an action
    pub fn execute<A: UpnpAction>(&self, request: &A::Request) -> Result<A::Response> {
        let args = A::arguments(request);
        let out = self
            .transport
            .call(A::SERVICE, A::ACTION, &args)
            .map_err(|e| {
                debug!(service = %A::SERVICE, action = A::ACTION, error = %e, "action failed");
                e
            })?;
        A::parse_response(&out)
    }

    pub fn transport(&self) -> &dyn ControlTransport {
        self.transport.as_ref()
    }
}

impl std::fmt::Debug for RendererClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererClient").finish_non_exhaustive()
    }
}
