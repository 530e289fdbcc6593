//! Terraform Cloud API client.
//!
//! Implements [`VariableStore`] and [`VariableSetStore`] over the v2 JSON:API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{RemoteError, Result, TfcvarsError};
use crate::variables::Variable;

use super::traits::{VariableSetStore, VariableStore};
use super::types::{
    Document, JSON_API, ListDocument, Resource, VarAttributes, VarRequest, Workspace,
    WorkspaceAttributes,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size for paginated collections.
const PAGE_SIZE: u32 = 100;

/// Terraform Cloud / Enterprise API client.
#[derive(Debug, Clone)]
pub struct TfcClient {
    /// HTTP client.
    client: Client,
    /// API base URL, e.g. `https://app.terraform.io/api/v2`.
    base_url: String,
    /// API token.
    token: String,
}

impl TfcClient {
    /// Creates a client for `https://<hostname>/api/v2`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(hostname: &str, token: &str) -> Result<Self> {
        Self::with_base_url(format!("https://{hostname}/api/v2"), token)
    }

    /// Creates a client for an explicit API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(base_url: impl Into<String>, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| RemoteError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Looks up a workspace by organization and name.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::WorkspaceNotFound`] if the workspace does not
    /// exist or is not visible to the token.
    pub async fn read_workspace(&self, organization: &str, name: &str) -> Result<Workspace> {
        debug!("Reading workspace {organization}/{name}");

        let path = format!("/organizations/{organization}/workspaces/{name}");
        let result: Result<Document<Resource<WorkspaceAttributes>>> =
            self.send(self.request(Method::GET, &path)).await;

        match result {
            Ok(doc) => Ok(Workspace {
                id: doc.data.id,
                name: doc.data.attributes.name,
            }),
            Err(TfcvarsError::Remote(RemoteError::ApiRequestFailed { status: 404, .. })) => {
                Err(RemoteError::WorkspaceNotFound {
                    organization: organization.to_string(),
                    workspace: name.to_string(),
                }
                .into())
            }
            Err(e) => Err(e),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, JSON_API)
            .header(header::ACCEPT, JSON_API)
    }

    /// Sends a request and checks the response status.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        trace!("API responded with {status}");

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(RemoteError::AuthenticationFailed {
                message: String::from("Invalid or unauthorized API token"),
            }
            .into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::api_error(status.as_u16(), body).into());
        }

        Ok(response)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        response.json().await.map_err(|e| {
            RemoteError::invalid_response(format!("Failed to parse response: {e}")).into()
        })
    }

    /// Fetches every page of a paginated collection.
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let request = self.request(Method::GET, path).query(&[
                ("page[number]", page.to_string()),
                ("page[size]", PAGE_SIZE.to_string()),
            ]);
            let doc: ListDocument<T> = self.send(request).await?;
            items.extend(doc.data);

            match doc.meta.and_then(|m| m.pagination).and_then(|p| p.next_page) {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl VariableStore for TfcClient {
    async fn list(&self, workspace_id: &str) -> Result<Vec<Variable>> {
        debug!("Listing variables of workspace {workspace_id}");
        let path = format!("/workspaces/{workspace_id}/vars");
        let doc: ListDocument<Resource<VarAttributes>> =
            self.send(self.request(Method::GET, &path)).await?;
        Ok(doc.data.into_iter().map(|r| r.into_variable(None)).collect())
    }

    async fn create(&self, workspace_id: &str, variable: &Variable) -> Result<Variable> {
        debug!("Creating variable {} in workspace {workspace_id}", variable.key);
        let path = format!("/workspaces/{workspace_id}/vars");
        let request = self
            .request(Method::POST, &path)
            .json(&VarRequest::new(None, variable));
        let doc: Document<Resource<VarAttributes>> = self.send(request).await?;
        Ok(doc.data.into_variable(None))
    }

    async fn update(&self, workspace_id: &str, id: &str, variable: &Variable) -> Result<Variable> {
        debug!("Updating variable {} ({id}) in workspace {workspace_id}", variable.key);
        let path = format!("/workspaces/{workspace_id}/vars/{id}");
        let request = self
            .request(Method::PATCH, &path)
            .json(&VarRequest::new(Some(id), variable));
        let doc: Document<Resource<VarAttributes>> = self.send(request).await?;
        Ok(doc.data.into_variable(None))
    }

    async fn delete(&self, workspace_id: &str, id: &str) -> Result<()> {
        debug!("Deleting variable {id} from workspace {workspace_id}");
        let path = format!("/workspaces/{workspace_id}/vars/{id}");
        self.execute(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

#[async_trait]
impl VariableSetStore for TfcClient {
    async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<String>> {
        debug!("Listing variable sets of workspace {workspace_id}");
        let path = format!("/workspaces/{workspace_id}/varsets");
        let sets: Vec<Resource<serde_json::Value>> = self.list_all(&path).await?;
        Ok(sets.into_iter().map(|s| s.id).collect())
    }

    async fn list_variables(&self, set_id: &str) -> Result<Vec<Variable>> {
        debug!("Listing variables of variable set {set_id}");
        let path = format!("/varsets/{set_id}/relationships/vars");
        let vars: Vec<Resource<VarAttributes>> = self.list_all(&path).await?;
        Ok(vars
            .into_iter()
            .map(|r| r.into_variable(Some(set_id)))
            .collect())
    }
}
