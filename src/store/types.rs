//! JSON:API payloads of the Terraform Cloud API.

use serde::{Deserialize, Serialize};

use crate::variables::{Category, Variable};

/// Media type of every request and response body.
pub const JSON_API: &str = "application/vnd.api+json";

/// A workspace, as far as variable sync is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Workspace id (`ws-...`).
    pub id: String,
    /// Workspace name.
    pub name: String,
}

/// Single-resource document.
#[derive(Debug, Deserialize)]
pub struct Document<T> {
    /// Primary resource.
    pub data: T,
}

/// Collection document.
#[derive(Debug, Deserialize)]
pub struct ListDocument<T> {
    /// Primary resources.
    pub data: Vec<T>,
    /// Pagination metadata, absent on unpaginated endpoints.
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Top-level `meta` object.
#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    /// Pagination details.
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination details of a collection.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    /// Next page number, `None` on the last page.
    #[serde(rename = "next-page", default)]
    pub next_page: Option<u32>,
}

/// A resource object with typed attributes.
#[derive(Debug, Deserialize)]
pub struct Resource<A> {
    /// Resource id.
    pub id: String,
    /// Resource attributes.
    pub attributes: A,
}

/// Attributes of a workspace resource.
#[derive(Debug, Deserialize)]
pub struct WorkspaceAttributes {
    /// Workspace name.
    pub name: String,
}

/// Attributes of a `vars` resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarAttributes {
    /// Variable name.
    pub key: String,
    /// Value; always `null` for sensitive variables.
    #[serde(default)]
    pub value: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category.
    pub category: Category,
    /// Whether the value is HCL.
    #[serde(default)]
    pub hcl: bool,
    /// Whether the value is write-only.
    #[serde(default)]
    pub sensitive: bool,
}

/// Request body for creating or updating a variable.
#[derive(Debug, Serialize)]
pub struct VarRequest<'a> {
    /// Resource object being sent.
    pub data: VarRequestData<'a>,
}

/// Resource object of a [`VarRequest`].
#[derive(Debug, Serialize)]
pub struct VarRequestData<'a> {
    /// Existing id, set for updates only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    /// Always `vars`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Attributes to write.
    pub attributes: VarAttributes,
}

impl<'a> VarRequest<'a> {
    /// Builds a request body from a variable.
    #[must_use]
    pub fn new(id: Option<&'a str>, variable: &Variable) -> Self {
        Self {
            data: VarRequestData {
                id,
                kind: "vars",
                attributes: VarAttributes {
                    key: variable.key.clone(),
                    value: Some(variable.value.clone()),
                    description: Some(variable.description.clone()),
                    category: variable.category,
                    hcl: variable.hcl,
                    sensitive: variable.sensitive,
                },
            },
        }
    }
}

impl Resource<VarAttributes> {
    /// Converts the resource into a [`Variable`].
    #[must_use]
    pub fn into_variable(self, variable_set_id: Option<&str>) -> Variable {
        let attrs = self.attributes;
        Variable {
            id: Some(self.id),
            key: attrs.key,
            value: attrs.value.unwrap_or_default(),
            description: attrs.description.unwrap_or_default(),
            category: attrs.category,
            hcl: attrs.hcl,
            sensitive: attrs.sensitive,
            variable_set_id: variable_set_id.map(str::to_string),
        }
    }
}
