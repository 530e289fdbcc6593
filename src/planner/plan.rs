//! Sync plan types and construction.
//!
//! A [`SyncPlan`] lists the create/update/delete calls that make the remote
//! workspace match a source collection.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::error::{DocumentError, Result};
use crate::variables::{Category, ValueCodec, Variable, find_by_key};

/// A single remote mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Create a variable that does not exist remotely.
    Create {
        /// Variable to create.
        variable: Variable,
    },
    /// Replace an existing variable.
    Update {
        /// Remote id of the variable.
        id: String,
        /// New content.
        variable: Variable,
    },
    /// Delete a remote variable.
    Delete {
        /// Remote id of the variable.
        id: String,
        /// Key, for reporting.
        key: String,
    },
}

impl SyncAction {
    /// Returns the variable key the action touches.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Create { variable } | Self::Update { variable, .. } => &variable.key,
            Self::Delete { key, .. } => key,
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { variable } => write!(f, "create variable '{}'", variable.key),
            Self::Update { id, variable } => {
                write!(f, "update variable '{}' ({id})", variable.key)
            }
            Self::Delete { id, key } => write!(f, "delete variable '{key}' ({id})"),
        }
    }
}

/// Ordered list of actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Creates and updates in source order, then deletes in destination order.
    pub actions: Vec<SyncAction>,
}

impl SyncPlan {
    /// Returns true if nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of create actions.
    #[must_use]
    pub fn creates(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Create { .. }))
    }

    /// Number of update actions.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Update { .. }))
    }

    /// Number of delete actions.
    #[must_use]
    pub fn deletes(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Delete { .. }))
    }

    /// Returns what `destination` looks like once the plan is applied.
    #[must_use]
    pub fn resulting_variables(&self, destination: &[Variable]) -> Vec<Variable> {
        let mut result: Vec<Variable> = destination.to_vec();

        for action in &self.actions {
            match action {
                SyncAction::Create { variable } => result.push(variable.clone()),
                SyncAction::Update { id, variable } => {
                    if let Some(slot) = result.iter_mut().find(|v| v.id.as_deref() == Some(id)) {
                        *slot = variable.clone().with_id(id.clone());
                    }
                }
                SyncAction::Delete { id, .. } => {
                    result.retain(|v| v.id.as_deref() != Some(id));
                }
            }
        }

        result
    }

    fn count(&self, pred: impl Fn(&SyncAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

impl fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plan: {} to create, {} to update, {} to delete",
            self.creates(),
            self.updates(),
            self.deletes()
        )
    }
}

/// Computes sync plans.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncPlanner {
    /// Whether destination keys missing from the source are deleted.
    delete: bool,
}

impl SyncPlanner {
    /// Creates a planner that never deletes.
    #[must_use]
    pub const fn new() -> Self {
        Self { delete: false }
    }

    /// Enables or disables deletion of keys absent from the source.
    #[must_use]
    pub const fn with_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    /// Plans the actions that make `destination` match `source`.
    ///
    /// Updates keep the destination's description, category, HCL and
    /// sensitive flags; only the value comes from the source.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidVariable`] if a source key is empty or
    /// a destination variable that must change has no remote id.
    pub fn plan(&self, source: &[Variable], destination: &[Variable]) -> Result<SyncPlan> {
        let mut actions = Vec::new();

        for s in source {
            if s.key.is_empty() {
                return Err(DocumentError::invalid_variable("variable key must not be empty").into());
            }

            match find_by_key(destination, &s.key) {
                Some(d) => {
                    let candidate = Variable {
                        id: None,
                        key: d.key.clone(),
                        value: s.value.clone(),
                        description: d.description.clone(),
                        category: d.category,
                        hcl: d.hcl,
                        sensitive: d.sensitive,
                        variable_set_id: None,
                    };

                    if candidate.same_content(d) || same_value(&candidate, d) {
                        debug!("Variable {} is up to date", s.key);
                        continue;
                    }

                    actions.push(SyncAction::Update {
                        id: remote_id(d)?,
                        variable: candidate,
                    });
                }
                None => {
                    // Creation never infers hcl or sensitive from local text
                    actions.push(SyncAction::Create {
                        variable: Variable::new(s.key.clone(), s.value.clone())
                            .with_category(Category::Terraform)
                            .with_hcl(false),
                    });
                }
            }
        }

        if self.delete {
            let keys: HashSet<&str> = source.iter().map(|s| s.key.as_str()).collect();
            for d in destination.iter().filter(|d| !keys.contains(d.key.as_str())) {
                actions.push(SyncAction::Delete {
                    id: remote_id(d)?,
                    key: d.key.clone(),
                });
            }
        }

        let plan = SyncPlan { actions };
        debug!("{plan}");
        Ok(plan)
    }
}

/// Compares values, normalizing HCL text so formatting alone is not a change.
fn same_value(candidate: &Variable, destination: &Variable) -> bool {
    if candidate.value == destination.value {
        return true;
    }
    destination.hcl
        && ValueCodec::try_parse(&candidate.value)
            .ok()
            .zip(ValueCodec::try_parse(&destination.value).ok())
            .is_some_and(|(a, b)| ValueCodec::render(&a) == ValueCodec::render(&b))
}

fn remote_id(variable: &Variable) -> Result<String> {
    variable.id.clone().ok_or_else(|| {
        DocumentError::invalid_variable(format!("variable '{}' has no remote id", variable.key))
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(id: &str, key: &str, value: &str) -> Variable {
        Variable::new(key, value).with_id(id)
    }

    #[test]
    fn test_create_when_destination_empty() {
        let source = vec![Variable::new("environment", "test")];
        let plan = SyncPlanner::new().plan(&source, &[]).expect("valid plan");

        assert_eq!(
            plan.actions,
            vec![SyncAction::Create {
                variable: Variable::new("environment", "test"),
            }]
        );
        assert_eq!((plan.creates(), plan.updates(), plan.deletes()), (1, 0, 0));
    }

    #[test]
    fn test_update_only_on_value_change() {
        let destination = vec![remote("v1", "environment", "test")];

        let plan = SyncPlanner::new()
            .plan(&[Variable::new("environment", "test2")], &destination)
            .expect("valid plan");
        assert_eq!(
            plan.actions,
            vec![SyncAction::Update {
                id: String::from("v1"),
                variable: Variable::new("environment", "test2"),
            }]
        );

        let plan = SyncPlanner::new()
            .plan(&[Variable::new("environment", "test")], &destination)
            .expect("valid plan");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_update_preserves_destination_metadata() {
        let destination = vec![remote("v1", "token", "old")
            .with_sensitive(true)
            .with_description("api token")
            .with_category(Category::Env)];

        let plan = SyncPlanner::new()
            .plan(&[Variable::new("token", "new")], &destination)
            .expect("valid plan");

        let SyncAction::Update { variable, .. } = &plan.actions[0] else {
            panic!("expected update, got {:?}", plan.actions);
        };
        assert_eq!(variable.value, "new");
        assert!(variable.sensitive);
        assert_eq!(variable.description, "api token");
        assert_eq!(variable.category, Category::Env);
    }

    #[test]
    fn test_identical_collections_plan_nothing() {
        let vars = vec![
            remote("v1", "a", "1"),
            remote("v2", "b", r#"["x", "y"]"#).with_hcl(true),
        ];
        let plan = SyncPlanner::new()
            .with_delete(true)
            .plan(&vars, &vars)
            .expect("valid plan");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_hcl_formatting_is_not_a_change() {
        let destination = vec![remote("v1", "tags", "{\n  env = \"dev\"\n}").with_hcl(true)];
        let source = vec![Variable::new("tags", r#"{env = "dev"}"#).with_hcl(true)];
        let plan = SyncPlanner::new().plan(&source, &destination).expect("valid plan");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_delete_only_keys_absent_from_source() {
        let destination = vec![
            remote("v1", "keep", "1"),
            remote("v2", "drop", "2"),
            remote("v3", "also_drop", "3"),
        ];
        let source = vec![Variable::new("keep", "1"), Variable::new("new", "4")];

        let without = SyncPlanner::new().plan(&source, &destination).expect("valid plan");
        assert_eq!(without.deletes(), 0);

        let plan = SyncPlanner::new()
            .with_delete(true)
            .plan(&source, &destination)
            .expect("valid plan");
        let keys: Vec<&str> = plan.actions.iter().map(SyncAction::key).collect();
        assert_eq!(keys, vec!["new", "drop", "also_drop"]);
        assert_eq!((plan.creates(), plan.updates(), plan.deletes()), (1, 0, 2));
    }

    #[test]
    fn test_create_never_marks_hcl_or_sensitive() {
        let source = vec![
            Variable::new("zones", r#"["a"]"#).with_hcl(true),
            Variable::new("token", "x").with_sensitive(true),
        ];
        let plan = SyncPlanner::new().plan(&source, &[]).expect("valid plan");
        assert_eq!(plan.actions.len(), 2);
        for action in &plan.actions {
            let SyncAction::Create { variable } = action else {
                panic!("expected create");
            };
            assert!(!variable.hcl);
            assert!(!variable.sensitive);
            assert_eq!(variable.category, Category::Terraform);
        }
        let SyncAction::Create { variable } = &plan.actions[0] else {
            panic!("expected create");
        };
        assert_eq!(variable.value, r#"["a"]"#);
    }

    #[test]
    fn test_empty_source_key_rejected() {
        assert!(SyncPlanner::new().plan(&[Variable::new("", "x")], &[]).is_err());
    }

    #[test]
    fn test_resulting_variables() {
        let destination = vec![remote("v1", "a", "1"), remote("v2", "b", "2")];
        let source = vec![Variable::new("a", "10"), Variable::new("c", "3")];
        let plan = SyncPlanner::new()
            .with_delete(true)
            .plan(&source, &destination)
            .expect("valid plan");

        let result = plan.resulting_variables(&destination);
        let pairs: Vec<(&str, &str)> = result
            .iter()
            .map(|v| (v.key.as_str(), v.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "10"), ("c", "3")]);
        assert_eq!(plan.to_string(), "Plan: 1 to create, 1 to update, 1 to delete");
    }
}
