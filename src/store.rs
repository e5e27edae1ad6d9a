//! The interface through which the reconciler reads and writes resources on a server.
//!
//! [ResourceStore] is thin. It knows nothing about canonical records or decisions;
//! it moves serialized bodies to and from [Endpoint]s and reports failures as typed [Error]s.
//! [HttpStore](http::HttpStore) is the production implementation. Tests use a recording fake.

use crate::core::resource::{ApiVersion, ResourceKind};
use crate::error::{Error, Result};
use std::fmt::{self, Display};

pub mod http;

/// A path on the server, relative to the root of the OpenNMS web application.
///
/// Endpoints are always built from a [ResourceKind], which fixes the API version. A kind's
/// collection and item endpoints therefore never disagree about the version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    version: ApiVersion,
    segments: Vec<String>,
}

impl Endpoint {
    /// The collection that holds every resource of `kind`. Upserts go here.
    pub fn collection(kind: ResourceKind) -> Self {
        Endpoint {
            version: kind.api_version(),
            segments: vec![kind.collection().to_owned()],
        }
    }

    /// The endpoint for the resource of `kind` named `name`.
    pub fn item(kind: ResourceKind, name: &str) -> Self {
        let mut endpoint = Self::collection(kind);
        endpoint.segments.push(name.to_owned());
        endpoint
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Path segments below the API root. Not percent-encoded.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match self.version {
            ApiVersion::V1 => "/rest",
        };
        write!(f, "{root}/{}", self.segments.join("/"))
    }
}

/// A serialized record on its way to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    /// The MIME type of [Self::data], e.g. `application/xml`.
    pub content_type: &'static str,
    pub data: String,
}

/// A successful reply from the server.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,

    /// `None` if the server sent no body.
    pub body: Option<String>,
}

/// Reads and writes resources on a server.
///
/// Every method makes one blocking round trip. Implementations return an [Error] for any
/// non-success status; in particular, a missing resource is [Error::NotFound], never an empty
/// [Response]. Implementations must not retry.
pub trait ResourceStore {
    /// Fetches the resource at `endpoint`.
    fn get(&mut self, endpoint: &Endpoint) -> Result<Response>;

    /// Sends a new resource to `collection`.
    fn create(&mut self, collection: &Endpoint, body: &Body) -> Result<Response>;

    /// Replaces an existing resource by sending it to `collection`.
    ///
    /// OpenNMS uses the same request to create and to replace a resource, so for the HTTP store
    /// this is identical to [Self::create].
    fn update(&mut self, collection: &Endpoint, body: &Body) -> Result<Response>;

    /// Removes the resource at `endpoint`.
    fn delete(&mut self, endpoint: &Endpoint) -> Result<Response>;
}

impl<S: ResourceStore + ?Sized> ResourceStore for &mut S {
    fn get(&mut self, endpoint: &Endpoint) -> Result<Response> {
        (**self).get(endpoint)
    }

    fn create(&mut self, collection: &Endpoint, body: &Body) -> Result<Response> {
        (**self).create(collection, body)
    }

    fn update(&mut self, collection: &Endpoint, body: &Body) -> Result<Response> {
        (**self).update(collection, body)
    }

    fn delete(&mut self, endpoint: &Endpoint) -> Result<Response> {
        (**self).delete(endpoint)
    }
}

/// Turns a non-success HTTP status into the matching [Error].
///
/// `username` is only used to name the rejected identity in [Error::Authentication].
pub fn check_status(
    method: &str,
    endpoint: &Endpoint,
    username: &str,
    response: Response,
) -> Result<Response> {
    let status = response.status;
    if (200..300).contains(&status) {
        return Ok(response);
    }

    let method = method.to_owned();
    let endpoint = endpoint.to_string();
    Err(match status {
        400 => Error::MalformedRequest { method, endpoint },
        401 => Error::Authentication {
            username: username.to_owned(),
        },
        403 => Error::Authorization { method, endpoint },
        404 => Error::NotFound { method, endpoint },
        405 => Error::MethodNotAllowed { method, endpoint },
        500..=599 => Error::Server {
            method,
            endpoint,
            status,
        },
        _ => Error::UnexpectedStatus {
            method,
            endpoint,
            status,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> Response {
        Response { status, body: None }
    }

    #[test]
    fn endpoints_display_relative_to_api_root() {
        assert_eq!(
            "/rest/users",
            Endpoint::collection(ResourceKind::User).to_string()
        );
        assert_eq!(
            "/rest/groups/ops",
            Endpoint::item(ResourceKind::Group, "ops").to_string(),
        );
    }

    #[test]
    fn collection_and_item_share_a_version() {
        for kind in [ResourceKind::User, ResourceKind::Group] {
            assert_eq!(
                Endpoint::collection(kind).version(),
                Endpoint::item(kind, "x").version(),
            );
        }
    }

    #[test]
    fn success_statuses_pass_through() {
        let endpoint = Endpoint::collection(ResourceKind::User);
        for status in [200, 201, 204, 299] {
            assert_eq!(
                response(status),
                check_status("POST", &endpoint, "admin", response(status)).unwrap(),
            );
        }
    }

    #[test]
    fn failure_statuses_map_to_errors() {
        let endpoint = Endpoint::item(ResourceKind::User, "alice");
        let check = |status| check_status("GET", &endpoint, "admin", response(status)).unwrap_err();

        assert!(matches!(check(400), Error::MalformedRequest { .. }));
        assert!(matches!(
            check(401),
            Error::Authentication { ref username } if username == "admin"
        ));
        assert!(matches!(
            check(403),
            Error::Authorization { ref endpoint, .. } if endpoint == "/rest/users/alice"
        ));
        assert!(check(404).is_not_found());
        assert!(matches!(check(405), Error::MethodNotAllowed { .. }));
        assert!(matches!(check(503), Error::Server { status: 503, .. }));
        assert!(matches!(check(302), Error::UnexpectedStatus { status: 302, .. }));
        assert!(matches!(check(409), Error::UnexpectedStatus { status: 409, .. }));
    }

    #[test]
    fn errors_name_method_and_endpoint() {
        let endpoint = Endpoint::item(ResourceKind::Group, "ops");
        let err = check_status("DELETE", &endpoint, "admin", response(500)).unwrap_err();
        assert_eq!("server error 500: DELETE /rest/groups/ops", err.to_string());
    }
}
