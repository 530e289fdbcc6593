//! Reconciler for workspace variables.
//!
//! This module drives the user-facing flows on top of the document, diff and
//! planning layers: reading the remote side, reshaping it into the local
//! file's layout, and applying plans behind a confirmation gate.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::error::{Result, SyncError};
use crate::planner::{
    DiffEngine, PlanExecutor, SyncOutcome, SyncPlanner, SyncSummary, confirm,
};
use crate::store::{VariableSetStore, VariableStore};
use crate::variables::{Variable, VariableDocument, filter_env, find_by_key};

/// Which remote variables a read includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Include environment-category variables.
    pub include_env: bool,
    /// Include variables inherited from variable sets.
    pub include_variable_set: bool,
}

/// Options of a push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
    /// Delete remote variables absent from the source.
    pub delete: bool,
    /// Skip the confirmation prompt.
    pub auto_approve: bool,
}

/// Reconciler between one workspace and local variables.
pub struct Reconciler<'a> {
    /// Workspace variable store.
    variables: &'a dyn VariableStore,
    /// Variable set store.
    variable_sets: &'a dyn VariableSetStore,
    /// Workspace id.
    workspace_id: &'a str,
    /// Diff engine.
    diff_engine: DiffEngine,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("workspace_id", &self.workspace_id)
            .finish_non_exhaustive()
    }
}

impl<'a> Reconciler<'a> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(
        variables: &'a dyn VariableStore,
        variable_sets: &'a dyn VariableSetStore,
        workspace_id: &'a str,
    ) -> Self {
        Self {
            variables,
            variable_sets,
            workspace_id,
            diff_engine: DiffEngine::new(),
        }
    }

    /// Lists the remote variables selected by `options`.
    ///
    /// Variable set entries follow the workspace's own variables; a key
    /// already defined on the workspace hides the set entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a store call fails.
    pub async fn remote_variables(&self, options: ReadOptions) -> Result<Vec<Variable>> {
        let mut variables = self.variables.list(self.workspace_id).await?;
        debug!("Workspace has {} variables", variables.len());

        if options.include_variable_set {
            let mut keys: HashSet<String> = variables.iter().map(|v| v.key.clone()).collect();
            for set_id in self.variable_sets.list_for_workspace(self.workspace_id).await? {
                for variable in self.variable_sets.list_variables(&set_id).await? {
                    if keys.insert(variable.key.clone()) {
                        variables.push(variable);
                    } else {
                        debug!("Variable {} from {set_id} is overridden", variable.key);
                    }
                }
            }
        }

        Ok(filter_env(variables, options.include_env))
    }

    /// Returns remote variables, or only `key` when given.
    ///
    /// An absent `key` yields no variables.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn show(&self, options: ReadOptions, key: Option<&str>) -> Result<Vec<Variable>> {
        let variables = self.remote_variables(options).await?;
        Ok(select(variables, key))
    }

    /// Diffs the local document against the remote variables shaped into
    /// the document's layout.
    ///
    /// `- ` lines come from the local file, `+ ` lines from the remote side.
    /// Returns `None` when they match.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote variables cannot be read or do not fit
    /// in a document.
    pub async fn diff(
        &self,
        local: &VariableDocument,
        options: ReadOptions,
    ) -> Result<Option<String>> {
        let remote = self.remote_variables(options).await?;
        let shaped = local.with_remote_snapshot(&remote)?;

        let (changed, rendered) = self
            .diff_engine
            .line_diff(&local.to_string(), &shaped.to_string());
        Ok(changed.then_some(rendered))
    }

    /// Builds the pulled document.
    ///
    /// Remote variables are set into `local`, keeping its comments, order and
    /// local-only attributes, or into an empty document when `overwrite` is
    /// set. Nothing is written to disk here.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote variables cannot be read or do not fit
    /// in a document.
    pub async fn pull(
        &self,
        local: VariableDocument,
        options: ReadOptions,
        overwrite: bool,
    ) -> Result<VariableDocument> {
        let remote = self.remote_variables(options).await?;
        info!("Pulling {} variables", remote.len());

        let mut doc = if overwrite {
            VariableDocument::empty(local.name())
        } else {
            local
        };
        doc.merge_variables(&remote)?;
        Ok(doc)
    }

    /// Makes the workspace match `source`.
    ///
    /// Unless auto-approved, the remote document before and after the plan
    /// is diffed to `out` and a confirmation is read from `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails, the confirmation cannot be read,
    /// or an action fails.
    pub async fn push<R: BufRead, W: Write>(
        &self,
        source: &[Variable],
        options: PushOptions,
        input: &mut R,
        out: &mut W,
    ) -> Result<SyncOutcome> {
        let destination = filter_env(self.variables.list(self.workspace_id).await?, false);
        let plan = SyncPlanner::new()
            .with_delete(options.delete)
            .plan(source, &destination)?;

        if plan.is_empty() {
            info!("Workspace variables are up to date");
            writeln!(out, "No changes")?;
            return Ok(SyncOutcome::NoChanges);
        }

        if !options.auto_approve {
            let before = VariableDocument::from_variables(&destination)?;
            let after = VariableDocument::from_variables(&plan.resulting_variables(&destination))?;
            let (_, rendered) = self
                .diff_engine
                .line_diff(&before.to_string(), &after.to_string());

            write!(out, "{}", self.diff_engine.colorize(&rendered))?;
            writeln!(out, "{plan}")?;

            if !confirm("Do you want to apply these changes?", input, out)? {
                info!("Push aborted");
                return Ok(SyncOutcome::Aborted);
            }
        }

        let summary = PlanExecutor::new(self.variables, self.workspace_id)
            .execute(&plan)
            .await?;
        Ok(SyncOutcome::Applied(summary))
    }

    /// Deletes the workspace variable `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::VariableNotFound`] if the workspace has no such
    /// variable, or an error if the confirmation or the delete fails.
    pub async fn remove<R: BufRead, W: Write>(
        &self,
        key: &str,
        auto_approve: bool,
        input: &mut R,
        out: &mut W,
    ) -> Result<SyncOutcome> {
        let variables = self.variables.list(self.workspace_id).await?;
        let target = find_by_key(&variables, key).ok_or_else(|| SyncError::VariableNotFound {
            key: key.to_string(),
        })?;
        let id = target.id.as_deref().ok_or_else(|| SyncError::VariableNotFound {
            key: key.to_string(),
        })?;

        if !auto_approve {
            writeln!(out, "delete variable {key}")?;
            if !confirm(
                "Are you sure you want to delete this variable in Terraform Cloud?",
                input,
                out,
            )? {
                info!("Remove aborted");
                return Ok(SyncOutcome::Aborted);
            }
        }

        self.variables.delete(self.workspace_id, id).await?;
        info!("Deleted variable {key}");
        Ok(SyncOutcome::Applied(SyncSummary {
            deleted: 1,
            ..SyncSummary::default()
        }))
    }
}

/// Narrows `variables` to `key` when given.
///
/// A key that is not among them selects nothing.
#[must_use]
pub fn select(variables: Vec<Variable>, key: Option<&str>) -> Vec<Variable> {
    match key {
        Some(key) => variables.into_iter().filter(|v| v.key == key).collect(),
        None => variables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RemoteError, TfcvarsError};
    use crate::store::{MockVariableSetStore, MockVariableStore};
    use crate::variables::Category;

    const WS: &str = "ws-123";

    fn remote(id: &str, key: &str, value: &str) -> Variable {
        Variable::new(key, value).with_id(id)
    }

    fn store_with(vars: Vec<Variable>) -> MockVariableStore {
        let mut store = MockVariableStore::new();
        store
            .expect_list()
            .returning(move |_| Ok(vars.clone()));
        store
    }

    fn doc(text: &str) -> VariableDocument {
        VariableDocument::parse("terraform.tfvars", text).expect("valid document")
    }

    async fn push(
        store: &MockVariableStore,
        source: &[Variable],
        options: PushOptions,
        answer: &str,
    ) -> (Result<SyncOutcome>, String) {
        let sets = MockVariableSetStore::new();
        let reconciler = Reconciler::new(store, &sets, WS);
        let mut out = Vec::new();
        let result = reconciler
            .push(source, options, &mut answer.as_bytes(), &mut out)
            .await;
        (result, String::from_utf8(out).expect("utf8 output"))
    }

    #[tokio::test]
    async fn test_remote_variables_filters_env_and_merges_sets() {
        let store = store_with(vec![
            remote("v1", "region", "eu"),
            remote("v2", "AWS_PROFILE", "dev").with_category(Category::Env),
        ]);
        let mut sets = MockVariableSetStore::new();
        sets.expect_list_for_workspace()
            .returning(|_| Ok(vec![String::from("varset-1")]));
        sets.expect_list_variables().returning(|set_id| {
            Ok(vec![
                Variable {
                    variable_set_id: Some(set_id.to_string()),
                    ..remote("s1", "region", "us")
                },
                Variable {
                    variable_set_id: Some(set_id.to_string()),
                    ..remote("s2", "shared", "yes")
                },
            ])
        });

        let reconciler = Reconciler::new(&store, &sets, WS);
        let vars = reconciler
            .remote_variables(ReadOptions {
                include_env: false,
                include_variable_set: true,
            })
            .await
            .expect("read succeeds");

        let pairs: Vec<(&str, &str)> = vars
            .iter()
            .map(|v| (v.key.as_str(), v.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("region", "eu"), ("shared", "yes")]);
    }

    #[tokio::test]
    async fn test_variable_sets_not_read_by_default() {
        let store = store_with(vec![remote("v1", "region", "eu")]);
        let mut sets = MockVariableSetStore::new();
        sets.expect_list_for_workspace().never();

        let reconciler = Reconciler::new(&store, &sets, WS);
        let vars = reconciler
            .remote_variables(ReadOptions::default())
            .await
            .expect("read succeeds");
        assert_eq!(vars.len(), 1);
    }

    #[tokio::test]
    async fn test_show_single_variable() {
        let store = store_with(vec![remote("v1", "a", "1"), remote("v2", "b", "2")]);
        let sets = MockVariableSetStore::new();
        let reconciler = Reconciler::new(&store, &sets, WS);

        let vars = reconciler
            .show(ReadOptions::default(), Some("b"))
            .await
            .expect("found");
        assert_eq!(vars, vec![remote("v2", "b", "2")]);

        let absent = reconciler
            .show(ReadOptions::default(), Some("c"))
            .await
            .expect("absent key is not an error");
        assert!(absent.is_empty());
    }

    #[test]
    fn test_select_absent_key_is_empty() {
        let vars = vec![Variable::new("a", "1")];
        assert_eq!(select(vars.clone(), None), vars);
        assert_eq!(select(vars.clone(), Some("a")), vars);
        assert!(select(vars, Some("missing")).is_empty());
    }

    #[tokio::test]
    async fn test_diff_is_destination_formatted() {
        let store = store_with(vec![remote("v1", "environment", "development")]);
        let sets = MockVariableSetStore::new();
        let reconciler = Reconciler::new(&store, &sets, WS);

        let rendered = reconciler
            .diff(&doc("environment = \"env\"\n"), ReadOptions::default())
            .await
            .expect("diff succeeds")
            .expect("has differences");
        assert_eq!(
            rendered,
            "- environment = \"env\"\n+ environment = \"development\"\n"
        );
    }

    #[tokio::test]
    async fn test_diff_key_rename() {
        let store = store_with(vec![remote("v1", "env", "dev")]);
        let sets = MockVariableSetStore::new();
        let reconciler = Reconciler::new(&store, &sets, WS);

        let rendered = reconciler
            .diff(&doc("environment = \"dev\"\n"), ReadOptions::default())
            .await
            .expect("diff succeeds")
            .expect("has differences");
        assert_eq!(rendered, "- environment = \"dev\"\n+ env = \"dev\"\n");
    }

    #[tokio::test]
    async fn test_diff_none_when_in_sync() {
        let store = store_with(vec![remote("v1", "port", "3000"), remote("v2", "name", "web")]);
        let sets = MockVariableSetStore::new();
        let reconciler = Reconciler::new(&store, &sets, WS);

        let result = reconciler
            .diff(
                &doc("# service\nport = 3000\nname = \"web\"\n"),
                ReadOptions::default(),
            )
            .await
            .expect("diff succeeds");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_pull_masks_sensitive_and_keeps_comments() {
        let store = store_with(vec![
            remote("v1", "environment", "development"),
            remote("v2", "secret", "").with_sensitive(true),
        ]);
        let sets = MockVariableSetStore::new();
        let reconciler = Reconciler::new(&store, &sets, WS);

        let local = doc("# settings\nenvironment = \"env\"\nlocal_only = true\n");
        let pulled = reconciler
            .pull(local.clone(), ReadOptions::default(), false)
            .await
            .expect("pull succeeds")
            .to_string();
        assert_eq!(
            pulled,
            "# settings\nenvironment = \"development\"\nlocal_only = true\n// secret = \"***\"\n"
        );

        let overwritten = reconciler
            .pull(local, ReadOptions::default(), true)
            .await
            .expect("pull succeeds")
            .to_string();
        assert_eq!(
            overwritten,
            "environment = \"development\"\n// secret = \"***\"\n"
        );
    }

    #[tokio::test]
    async fn test_push_creates_with_auto_approve() {
        let mut store = store_with(vec![]);
        store
            .expect_create()
            .withf(|ws, v| ws == WS && v.key == "environment" && v.value == "test")
            .times(1)
            .returning(|_, v| Ok(v.clone().with_id("v1")));

        let (result, out) = push(
            &store,
            &[Variable::new("environment", "test")],
            PushOptions {
                delete: false,
                auto_approve: true,
            },
            "",
        )
        .await;

        assert_eq!(
            result.expect("push succeeds"),
            SyncOutcome::Applied(SyncSummary {
                created: 1,
                ..SyncSummary::default()
            })
        );
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_push_shows_preview_and_applies_on_yes() {
        let mut store = store_with(vec![remote("v1", "environment", "test")]);
        store
            .expect_update()
            .withf(|_, id, v| id == "v1" && v.value == "test2")
            .times(1)
            .returning(|_, _, v| Ok(v.clone()));

        let (result, out) = push(
            &store,
            &[Variable::new("environment", "test2")],
            PushOptions::default(),
            "yes\n",
        )
        .await;

        assert!(matches!(result, Ok(SyncOutcome::Applied(_))));
        assert!(out.contains("- environment = \"test\""));
        assert!(out.contains("+ environment = \"test2\""));
        assert!(out.contains("Plan: 0 to create, 1 to update, 0 to delete"));
    }

    #[tokio::test]
    async fn test_push_declined_makes_no_changes() {
        let mut store = store_with(vec![remote("v1", "environment", "test")]);
        store.expect_update().never();
        store.expect_create().never();

        let (result, _) = push(
            &store,
            &[Variable::new("environment", "test2")],
            PushOptions::default(),
            "n\n",
        )
        .await;
        assert_eq!(result.expect("push ends"), SyncOutcome::Aborted);
    }

    #[tokio::test]
    async fn test_push_end_of_input_is_error() {
        let mut store = store_with(vec![remote("v1", "environment", "test")]);
        store.expect_update().never();

        let (result, _) = push(
            &store,
            &[Variable::new("environment", "test2")],
            PushOptions::default(),
            "",
        )
        .await;
        assert!(matches!(
            result,
            Err(TfcvarsError::Sync(SyncError::Input { .. }))
        ));
    }

    #[tokio::test]
    async fn test_push_without_changes_does_not_prompt() {
        let store = store_with(vec![remote("v1", "environment", "test")]);

        let (result, out) = push(
            &store,
            &[Variable::new("environment", "test")],
            PushOptions::default(),
            "",
        )
        .await;
        assert_eq!(result.expect("push ends"), SyncOutcome::NoChanges);
        assert_eq!(out, "No changes\n");
    }

    #[tokio::test]
    async fn test_push_delete_ignores_env_variables() {
        let mut store = store_with(vec![
            remote("v1", "keep", "1"),
            remote("v2", "stale", "2"),
            remote("v3", "AWS_PROFILE", "dev").with_category(Category::Env),
        ]);
        store
            .expect_delete()
            .withf(|_, id| id == "v2")
            .times(1)
            .returning(|_, _| Ok(()));

        let (result, _) = push(
            &store,
            &[Variable::new("keep", "1")],
            PushOptions {
                delete: true,
                auto_approve: true,
            },
            "",
        )
        .await;
        assert_eq!(
            result.expect("push succeeds"),
            SyncOutcome::Applied(SyncSummary {
                deleted: 1,
                ..SyncSummary::default()
            })
        );
    }

    #[tokio::test]
    async fn test_push_partial_failure_reported() {
        let mut store = store_with(vec![]);
        let mut calls = 0;
        store.expect_create().times(2).returning(move |_, v| {
            calls += 1;
            if calls == 1 {
                Ok(v.clone())
            } else {
                Err(RemoteError::api_error(422, "invalid").into())
            }
        });

        let (result, _) = push(
            &store,
            &[Variable::new("a", "1"), Variable::new("b", "2")],
            PushOptions {
                delete: false,
                auto_approve: true,
            },
            "",
        )
        .await;

        match result {
            Err(TfcvarsError::Sync(SyncError::ActionFailed { completed, .. })) => {
                assert_eq!(completed.created, 1);
            }
            other => panic!("expected ActionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remove() {
        let mut store = store_with(vec![remote("v1", "environment", "test")]);
        store
            .expect_delete()
            .withf(|ws, id| ws == WS && id == "v1")
            .times(1)
            .returning(|_, _| Ok(()));
        let sets = MockVariableSetStore::new();
        let reconciler = Reconciler::new(&store, &sets, WS);

        let mut out = Vec::new();
        let outcome = reconciler
            .remove("environment", false, &mut "y\n".as_bytes(), &mut out)
            .await
            .expect("remove succeeds");
        assert!(matches!(outcome, SyncOutcome::Applied(s) if s.deleted == 1));

        let err = reconciler
            .remove("missing", true, &mut "".as_bytes(), &mut out)
            .await;
        assert!(matches!(
            err,
            Err(TfcvarsError::Sync(SyncError::VariableNotFound { .. }))
        ));
    }
}
