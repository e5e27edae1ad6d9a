//! A [ResourceStore] backed by the OpenNMS REST API.

use super::{check_status, Body, Endpoint, ResourceStore, Response};
use crate::config::Connection;
use crate::core::resource::ApiVersion;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};

/// Production implementation of [ResourceStore].
///
/// Sends one blocking request per call, authenticated with HTTP basic auth. Reads come back as
/// JSON; writes go out in whatever format the caller's [Body] says.
pub struct HttpStore {
    client: Client,

    /// The OpenNMS web application's root, e.g. `http://localhost:8980/opennms`.
    base: Url,

    /// [Connection::host], kept for error messages.
    host: String,

    username: String,
    password: String,
}

impl HttpStore {
    /// Creates a store that talks to the server described by `connection`.
    ///
    /// Resolves the host name but doesn't contact the server.
    ///
    /// # Errors
    ///
    /// [Error::Transport] if the host name doesn't resolve or the client can't be built.
    pub fn new(connection: &Connection) -> Result<Self> {
        let transport = |message: String| Error::Transport {
            host: connection.host.clone(),
            message,
        };

        let base = connection
            .base_url()
            .map_err(|err| transport(err.to_string()))?;
        resolve(&base).map_err(transport)?;
        let client = Client::builder()
            .danger_accept_invalid_certs(!connection.validate_certs)
            .timeout(connection.timeout())
            .build()
            .map_err(|err| transport(err.to_string()))?;

        Ok(HttpStore {
            client,
            base,
            host: connection.host.clone(),
            username: connection.username.clone(),
            password: connection.password.clone(),
        })
    }

    /// Returns the absolute URL of `endpoint`, percent-encoding each path segment.
    pub fn url(&self, endpoint: &Endpoint) -> Result<Url> {
        let root: &[&str] = match endpoint.version() {
            ApiVersion::V1 => &["rest"],
        };

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Transport {
                host: self.host.clone(),
                message: format!("cannot build a URL for {endpoint} on this host"),
            })?
            .pop_if_empty()
            .extend(root)
            .extend(endpoint.segments());
        Ok(url)
    }

    fn send(&self, method: Method, endpoint: &Endpoint, body: Option<&Body>) -> Result<Response> {
        let url = self.url(endpoint)?;
        tracing::debug!(%method, %url, "sending request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, body.content_type)
                .body(body.data.clone());
        }

        let transport = |err: reqwest::Error| Error::Transport {
            host: self.host.clone(),
            message: err.to_string(),
        };
        let response = request.send().map_err(transport)?;
        let status = response.status().as_u16();
        let text = response.text().map_err(transport)?;
        tracing::debug!(%method, %endpoint, status, "received response");

        let response = Response {
            status,
            body: (!text.is_empty()).then_some(text),
        };
        check_status(method.as_str(), endpoint, &self.username, response)
    }
}

// Fails unless the URL's host resolves to at least one address.
fn resolve(url: &Url) -> std::result::Result<(), String> {
    let host = url.host_str().unwrap_or_default();
    match url.socket_addrs(|| None) {
        Ok(addrs) if !addrs.is_empty() => Ok(()),
        Ok(_) => Err(format!("{host} resolves to no addresses")),
        Err(err) => Err(format!("can't resolve {host}: {err}")),
    }
}

impl ResourceStore for HttpStore {
    fn get(&mut self, endpoint: &Endpoint) -> Result<Response> {
        self.send(Method::GET, endpoint, None)
    }

    fn create(&mut self, collection: &Endpoint, body: &Body) -> Result<Response> {
        self.send(Method::POST, collection, Some(body))
    }

    fn update(&mut self, collection: &Endpoint, body: &Body) -> Result<Response> {
        // OpenNMS replaces an existing resource when it receives one with the same key.
        self.send(Method::POST, collection, Some(body))
    }

    fn delete(&mut self, endpoint: &Endpoint) -> Result<Response> {
        self.send(Method::DELETE, endpoint, None)
    }
}
