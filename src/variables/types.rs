//! Variable model shared by the remote store and local documents.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Category of a workspace variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Terraform input variable.
    #[default]
    Terraform,
    /// Shell environment variable.
    Env,
    /// Sentinel policy-set parameter.
    #[serde(rename = "policy-set")]
    PolicySet,
}

/// A single key/value variable, independent of where it is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variable {
    /// Remote identifier, `None` for variables that exist only locally.
    pub id: Option<String>,
    /// Variable name.
    pub key: String,
    /// Flat string form of the value.
    pub value: String,
    /// Free-text description.
    pub description: String,
    /// Variable category.
    pub category: Category,
    /// Whether `value` is an HCL list/map expression rather than a plain string.
    pub hcl: bool,
    /// Whether the value is write-only on the remote side.
    pub sensitive: bool,
    /// Variable set the variable was inherited from, if any.
    pub variable_set_id: Option<String>,
}

impl Variable {
    /// Creates a terraform-category variable with a plain string value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// Sets the remote identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Marks the value as an HCL expression.
    #[must_use]
    pub const fn with_hcl(mut self, hcl: bool) -> Self {
        self.hcl = hcl;
        self
    }

    /// Marks the variable as sensitive.
    #[must_use]
    pub const fn with_sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parses a `KEY=VALUE` assignment given on the command line.
    ///
    /// The value is everything after the first `=` and may itself contain `=`.
    ///
    /// # Errors
    ///
    /// Returns an error if the assignment has no `=` or an empty key.
    pub fn from_assignment(assignment: &str) -> Result<Self> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => Err(ConfigError::InvalidAssignment {
                assignment: assignment.to_string(),
            }
            .into()),
        }
    }

    /// Returns true for environment-category variables.
    #[must_use]
    pub fn is_env(&self) -> bool {
        self.category == Category::Env
    }

    /// Returns true if the variable was inherited from a variable set.
    #[must_use]
    pub const fn from_variable_set(&self) -> bool {
        self.variable_set_id.is_some()
    }

    /// Compares everything a remote update can change.
    ///
    /// Identity (`id`, `variable_set_id`) is not part of the comparison.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.key == other.key
            && self.value == other.value
            && self.description == other.description
            && self.category == other.category
            && self.hcl == other.hcl
            && self.sensitive == other.sensitive
    }
}

/// Drops environment variables unless `include_env` is set.
#[must_use]
pub fn filter_env(variables: Vec<Variable>, include_env: bool) -> Vec<Variable> {
    if include_env {
        return variables;
    }
    variables.into_iter().filter(|v| !v.is_env()).collect()
}

/// Finds a variable by key.
#[must_use]
pub fn find_by_key<'a>(variables: &'a [Variable], key: &str) -> Option<&'a Variable> {
    variables.iter().find(|v| v.key == key)
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Terraform => "terraform",
            Self::Env => "env",
            Self::PolicySet => "policy-set",
        };
        write!(f, "{s}")
    }
}
