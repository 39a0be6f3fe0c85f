//! Registry payloads and test transports shared by the unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use forge_core::error::ForgeError;
use crate::transport::{RawResponse, Transport};
use crate::RegistryResult;

pub const CEPH_UPDATED_AT: &str = "2017-01-20 01:59:54 -0800";
pub const NOMAD_UPDATED_AT: &str = "2017-01-19 23:06:46 -0800";
pub const CONSUL_UPDATED_AT: &str = "2017-01-19 23:05:08 -0800";

pub fn module_json(owner: &str, name: &str, updated_at: &str) -> Value {
    json!({
        "uri": format!("/v3/modules/{}-{}", owner, name),
        "slug": format!("{}-{}", owner, name),
        "name": name,
        "downloads": 120,
        "created_at": "2017-01-19 05:14:28 -0800",
        "updated_at": updated_at,
        "supported": false,
        "endorsement": null,
        "module_group": "base",
        "owner": {
            "uri": format!("/v3/users/{}", owner),
            "slug": owner,
            "username": owner,
            "gravatar_id": "0a1b2c3d"
        },
        "releases": [
            {"uri": format!("/v3/releases/{}-{}-0.1.0", owner, name), "version": "0.1.0"}
        ],
        "homepage_url": null,
        "issues_url": null
    })
}

pub fn list_page(results: Vec<Value>, next: Option<&str>) -> String {
    json!({
        "pagination": {
            "limit": 2,
            "offset": 0,
            "first": "/v3/modules?limit=2&offset=0",
            "previous": null,
            "current": "/v3/modules?limit=2&offset=0",
            "next": next,
            "total": 3
        },
        "results": results
    })
    .to_string()
}

pub fn modules_page() -> String {
    list_page(
        vec![
            module_json("norisnetwork", "ceph", CEPH_UPDATED_AT),
            module_json("sshuyskiy", "nomad", NOMAD_UPDATED_AT),
        ],
        Some("/v3/modules?limit=2&offset=2&sort_by=latest_release"),
    )
}

pub fn modules_next_page() -> String {
    list_page(vec![module_json("sshuyskiy", "consul", CONSUL_UPDATED_AT)], None)
}

pub fn release_json(module: &str, version: &str) -> Value {
    json!({
        "uri": format!("/v3/releases/{}-{}", module, version),
        "slug": format!("{}-{}", module, version),
        "version": version,
        "created_at": "2017-01-19 05:14:28 -0800",
        "deleted_at": null
    })
}

pub fn ceph_releases_page() -> String {
    list_page(
        vec![
            release_json("norisnetwork-ceph", "0.2.0"),
            release_json("norisnetwork-ceph", "0.1.0"),
        ],
        None,
    )
}

pub fn nomad_releases_page() -> String {
    list_page(vec![release_json("sshuyskiy-nomad", "0.0.1")], None)
}

pub fn empty_page() -> String {
    list_page(Vec::new(), None)
}

pub fn user_json(username: &str, display_name: &str) -> String {
    json!({
        "uri": format!("/v3/users/{}", username),
        "slug": username,
        "gravatar_id": "0a1b2c3d",
        "username": username,
        "display_name": display_name,
        "release_count": 3,
        "module_count": 2,
        "created_at": "2016-11-21 06:21:31 -0800",
        "updated_at": "2017-01-20 01:59:54 -0800"
    })
    .to_string()
}

/// A request seen by `MockTransport`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub path: String,
    /// URL query pairs followed by the explicit parameters, sorted by key
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// In-memory transport serving canned pages per route.
///
/// A route is the URL path, plus `?module=<name>` for release listings.
/// Bodies registered on the same route are served in order.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, route: &str, body: impl Into<String>) -> Self {
        self.with_response(route, 200, body)
    }

    pub fn with_response(self, route: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back((status, body.into()));
        self
    }

    /// Transport loaded with the full three-module scenario
    pub fn forge() -> Self {
        Self::new()
            .with_page("/v3/modules", modules_page())
            .with_page("/v3/modules", modules_next_page())
            .with_page("/v3/releases?module=norisnetwork-ceph", ceph_releases_page())
            .with_page("/v3/releases?module=sshuyskiy-nomad", nomad_releases_page())
            .with_page("/v3/releases?module=sshuyskiy-consul", empty_page())
            .with_page("/v3/users/norisnetwork", user_json("norisnetwork", "noris network AG"))
            .with_page("/v3/users/sshuyskiy", user_json("sshuyskiy", "sshuyskiy"))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    fn route_key(request: &RecordedRequest) -> String {
        match request.param("module") {
            Some(module) => format!("{}?module={}", request.path, module),
            None => request.path.clone(),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<RawResponse> {
        let mut query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        query.extend(params.iter().cloned());
        query.sort();

        let request = RecordedRequest {
            path: url.path().to_string(),
            query,
        };
        let route = Self::route_key(&request);
        self.requests.lock().unwrap().push(request);

        let (status, text) = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(|bodies| bodies.pop_front())
            .ok_or_else(|| ForgeError::status(url.as_str(), 404))?;

        RawResponse {
            url: url.to_string(),
            status,
            text,
        }
        .error_for_status()
    }
}

/// Mount the three-module scenario on a wiremock server
pub async fn mount_forge(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v3/modules"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(modules_next_page()))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/modules"))
        .respond_with(ResponseTemplate::new(200).set_body_string(modules_page()))
        .with_priority(2)
        .mount(server)
        .await;

    let releases = [
        ("norisnetwork-ceph", ceph_releases_page()),
        ("sshuyskiy-nomad", nomad_releases_page()),
        ("sshuyskiy-consul", empty_page()),
    ];
    for (module, body) in releases {
        Mock::given(method("GET"))
            .and(path("/v3/releases"))
            .and(query_param("module", module))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    let users = [("norisnetwork", "noris network AG"), ("sshuyskiy", "sshuyskiy")];
    for (username, display_name) in users {
        Mock::given(method("GET"))
            .and(path(format!("/v3/users/{}", username)))
            .respond_with(ResponseTemplate::new(200).set_body_string(user_json(username, display_name)))
            .mount(server)
            .await;
    }
}
