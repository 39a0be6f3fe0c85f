//! Paginated resource client for the Puppet Forge v3 API
//!
//! Every listing is exposed as a `PageCursor`: a lazy, finite sequence of
//! raw page bodies that follows the registry's `pagination.next` cursor. No
//! request is issued until the consumer asks for the next page.

use tracing::debug;
use url::Url;

use forge_core::error::ForgeError;
use forge_core::{MAX_ITEMS, PUPPET_FORGE_URL};
use crate::api::{
    self, API_PREFIX, PLIMIT, PMODULE, PSHOW_DELETED, PSORT_BY, RMODULES, RRELEASES, RUSERS,
    VLATEST_RELEASE, VRELEASE_DATE,
};
use crate::transport::{HttpTransport, Transport};
use crate::RegistryResult;

/// Puppet Forge REST API client
#[derive(Debug)]
pub struct ForgeClient<T> {
    /// Transport issuing the requests
    transport: T,
    /// Registry URL, always ending with `/`
    base_url: Url,
    /// Page size of list requests
    max_items: u32,
}

impl ForgeClient<HttpTransport> {
    /// Create a client for the public Puppet Forge with default settings
    pub fn new() -> RegistryResult<Self> {
        Self::with_transport(PUPPET_FORGE_URL, MAX_ITEMS, HttpTransport::new()?)
    }
}

impl<T: Transport> ForgeClient<T> {
    /// Create a client on top of an existing transport
    pub fn with_transport(base_url: &str, max_items: u32, transport: T) -> RegistryResult<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| ForgeError::ConfigValidation {
            field: "base_url".to_string(),
            reason: format!("'{}': {}", base_url, e),
        })?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            transport,
            base_url,
            max_items,
        })
    }

    /// Registry URL resources are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Page size of list requests
    pub fn max_items(&self) -> u32 {
        self.max_items
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Pages of modules, most recently released first
    pub fn modules(&self) -> PageCursor<'_, T> {
        let params = vec![
            (PLIMIT.to_string(), self.max_items.to_string()),
            (PSORT_BY.to_string(), VLATEST_RELEASE.to_string()),
        ];
        self.fetch(RMODULES, params)
    }

    /// Pages of releases of `owner-module`, deleted ones included
    pub fn releases(&self, owner: &str, module: &str) -> PageCursor<'_, T> {
        let params = vec![
            (PMODULE.to_string(), format!("{}-{}", owner, module)),
            (PLIMIT.to_string(), self.max_items.to_string()),
            (PSHOW_DELETED.to_string(), "true".to_string()),
            (PSORT_BY.to_string(), VRELEASE_DATE.to_string()),
        ];
        self.fetch(RRELEASES, params)
    }

    /// Raw profile of a user
    pub async fn user(&self, username: &str) -> RegistryResult<String> {
        let resource = format!("{}/{}", RUSERS, username);
        let url = self.resource_url(RUSERS).and_then(|url| self.push_segment(url, username));
        let pages = self.cursor(resource, url, Vec::new()).collect_pages().await?;

        pages.into_iter().next().ok_or_else(|| ForgeError::Protocol {
            message: format!("no data returned for user '{}'", username),
        })
    }

    /// Cursor over the pages of a resource
    fn fetch(&self, resource: &str, params: Vec<(String, String)>) -> PageCursor<'_, T> {
        self.cursor(resource.to_string(), self.resource_url(resource), params)
    }

    fn cursor(
        &self,
        resource: String,
        url: RegistryResult<Url>,
        params: Vec<(String, String)>,
    ) -> PageCursor<'_, T> {
        let state = match url {
            Ok(url) => CursorState::Ready { url, params },
            Err(error) => CursorState::Failed(error),
        };

        PageCursor {
            client: self,
            resource,
            state,
        }
    }

    fn resource_url(&self, resource: &str) -> RegistryResult<Url> {
        self.join(&format!("{}/{}", API_PREFIX, resource))
    }

    /// Append `segment` as one escaped path segment
    fn push_segment(&self, mut url: Url, segment: &str) -> RegistryResult<Url> {
        url.path_segments_mut()
            .map_err(|_| ForgeError::Protocol {
                message: format!("{} cannot carry a path", self.base_url),
            })?
            .push(segment);
        Ok(url)
    }

    /// Resolve `path` under the base URL.
    ///
    /// Root-relative paths such as `/v3/modules?offset=2` stay below the
    /// base URL's own path.
    fn join(&self, path: &str) -> RegistryResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ForgeError::Protocol {
                message: format!("cannot resolve '{}' against {}: {}", path, self.base_url, e),
            })
    }
}

/// Lazy sequence of raw page bodies of one resource
pub struct PageCursor<'a, T> {
    client: &'a ForgeClient<T>,
    resource: String,
    state: CursorState,
}

enum CursorState {
    /// Next request to issue
    Ready {
        url: Url,
        params: Vec<(String, String)>,
    },
    /// Failure to report on the next pull
    Failed(ForgeError),
    /// Sequence exhausted
    Done,
}

impl<'a, T: Transport> PageCursor<'a, T> {
    /// Fetch the next page; `Ok(None)` once the sequence is exhausted.
    ///
    /// A page is handed out before its cursor is looked at, so a malformed
    /// body only fails the following call. After an error the cursor is
    /// exhausted.
    pub async fn next_page(&mut self) -> RegistryResult<Option<String>> {
        let (url, params) = match std::mem::replace(&mut self.state, CursorState::Done) {
            CursorState::Ready { url, params } => (url, params),
            CursorState::Failed(error) => return Err(error),
            CursorState::Done => return Ok(None),
        };

        debug!(
            "Puppet forge client calls resource: {} params: {:?}",
            self.resource, params
        );

        let response = self.client.transport.get(&url, &params).await?;
        self.state = self.advance(&response.text);

        Ok(Some(response.text))
    }

    /// Drain the remaining pages
    pub async fn collect_pages(mut self) -> RegistryResult<Vec<String>> {
        let mut pages = Vec::new();
        while let Some(page) = self.next_page().await? {
            pages.push(page);
        }
        Ok(pages)
    }

    /// Check whether the sequence has ended
    #[cfg(test)]
    fn is_exhausted(&self) -> bool {
        matches!(self.state, CursorState::Done)
    }

    fn advance(&self, body: &str) -> CursorState {
        let page = match serde_json::from_str(body) {
            Ok(page) => page,
            Err(e) => return CursorState::Failed(ForgeError::json("invalid page body", e)),
        };

        match api::next_cursor(&page) {
            // The cursor already embeds every query parameter
            Ok(Some(next)) => match self.client.join(&next) {
                Ok(url) => CursorState::Ready { url, params: Vec::new() },
                Err(error) => CursorState::Failed(error),
            },
            Ok(None) => CursorState::Done,
            Err(error) => CursorState::Failed(error),
        }
    }
}
