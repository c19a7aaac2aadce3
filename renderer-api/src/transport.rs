//! The seam between typed actions and the wire

use crate::error::{ApiError, Result};
use crate::service::Service;
use renderer_parser::ServiceEndpoint;
use soap_client::{ArgList, SoapClient};
use tracing::trace;

/// Sends one SOAP action to the renderer and returns its out-arguments
pub trait ControlTransport: Send {
    fn call(&self, service: Service, action: &str, args: &ArgList) -> Result<ArgList>;
}

/// Control and event endpoints of the three renderer services
///
/// Discovered once at session creation and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub av_transport: ServiceEndpoint,
    pub rendering_control: ServiceEndpoint,
    pub connection_manager: ServiceEndpoint,
}

impl ServiceEndpoints {
    /// Locate all three services on a renderer device node
    pub fn from_device(device: &renderer_parser::DeviceNode) -> Result<Self> {
        let find = |service: Service| {
            device
                .find_service(service.name())
                .ok_or_else(|| ApiError::MissingService(service.name().to_string()))
        };

        Ok(Self {
            av_transport: find(Service::AVTransport)?,
            rendering_control: find(Service::RenderingControl)?,
            connection_manager: find(Service::ConnectionManager)?,
        })
    }

    pub fn get(&self, service: Service) -> &ServiceEndpoint {
        match service {
            Service::AVTransport => &self.av_transport,
            Service::RenderingControl => &self.rendering_control,
            Service::ConnectionManager => &self.connection_manager,
        }
    }
}

/// [`ControlTransport`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    soap: SoapClient,
    endpoints: ServiceEndpoints,
}

impl HttpTransport {
    pub fn new(soap: SoapClient, endpoints: ServiceEndpoints) -> Self {
        Self { soap, endpoints }
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }
}

impl ControlTransport for HttpTransport {
    fn call(&self, service: Service, action: &str, args: &ArgList) -> Result<ArgList> {
        let endpoint = self.endpoints.get(service);
        trace!(%service, action, url = %endpoint.control_url, "calling action");

        self.soap
            .call(&endpoint.control_url, &endpoint.service_type, action, args)
            .map_err(ApiError::from)
    }
}
