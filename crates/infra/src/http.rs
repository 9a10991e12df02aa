//! Vendor transport over HTTP.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use podship_engine::VendorConfig;
use podship_vendor::{TransportError, VendorTransport};

/// POSTs XML documents to the vendor's service endpoint.
#[derive(Debug, Clone)]
pub struct HttpVendorTransport {
    client: Client,
    endpoint: String,
}

impl HttpVendorTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &VendorConfig) -> Result<Self, TransportError> {
        Self::new(config.endpoint.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect(e.to_string())
    }
}

impl VendorTransport for HttpVendorTransport {
    fn post_xml(&self, body: &str) -> Result<String, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, bytes = body.len(), "posting to vendor");

        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .body(body.to_string())
            .send()
            .map_err(send_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        resp.text().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Body(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_endpoint_is_a_connect_error() {
        // Discard port; connection is refused.
        let transport = HttpVendorTransport::new("http://127.0.0.1:9/XMLService.ASP", Duration::from_secs(2)).unwrap();
        let err = transport.post_xml("<ShippingOptions/>").unwrap_err();
        assert!(matches!(err, TransportError::Connect(_) | TransportError::Timeout));
    }

    #[test]
    fn built_from_config_endpoint() {
        let config = VendorConfig::default();
        let transport = HttpVendorTransport::from_config(&config).unwrap();
        assert_eq!(transport.endpoint(), config.endpoint);
    }
}
