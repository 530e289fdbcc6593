//! Variable documents: the `.tfvars` side of a synchronization.
//!
//! A [`VariableDocument`] is an editable HCL body. Attribute order,
//! comments, whitespace and sensitive placeholders of the parsed text are
//! kept, so targeted edits leave unrelated lines untouched.

use std::collections::HashSet;
use std::fmt;
use std::iter;
use std::ops::Range;
use std::path::Path;

use hcl::Value;
use hcl::edit::structure::{Attribute, Body, Structure};
use hcl::edit::{Decorate, Ident, parser};
use tracing::{debug, info};

use crate::error::{DocumentError, Result, TfcvarsError};

use super::format::value_expression;
use super::placeholder;
use super::types::Variable;
use super::value::{ValueCodec, evaluate};

/// Where a run of comments and whitespace sits in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Prefix of the structure at this index.
    Before(usize),
    /// Trailing text after the last structure.
    End,
}

fn anchors(len: usize) -> impl Iterator<Item = Anchor> {
    (0..len).map(Anchor::Before).chain(iter::once(Anchor::End))
}

/// Returns the comments and whitespace at `anchor`.
fn trivia(body: &Body, anchor: Anchor) -> &str {
    let raw = match anchor {
        Anchor::Before(index) => body.get(index).and_then(|s| s.decor().prefix()),
        Anchor::End => body.decor().suffix(),
    };
    match raw {
        Some(raw) => &**raw,
        None => "",
    }
}

/// Evaluates an attribute value without any variables in scope.
fn evaluate_attribute(attr: &Attribute) -> std::result::Result<Value, String> {
    evaluate(&hcl::Expression::from(attr.value.clone()))
}

/// Makes sure non-empty text ends on a line boundary.
fn close_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

/// Ordered, format-preserving collection of variable assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDocument {
    name: String,
    body: Body,
}

impl VariableDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: Body::new(),
        }
    }

    /// Builds a fresh document from variables, in their order.
    ///
    /// Sensitive variables become `// key = "***"` placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidVariable`] if a variable key is empty
    /// or not an identifier.
    pub fn from_variables(variables: &[Variable]) -> Result<Self> {
        let mut doc = Self::empty("generated.tfvars");
        doc.merge_variables(variables)?;
        Ok(doc)
    }

    /// Parses document text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] for malformed text, blocks, values
    /// that do not evaluate, or duplicated keys.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let parse_error = |message: String| -> TfcvarsError {
            DocumentError::parse(name.clone(), message).into()
        };

        let mut body = parser::parse_body(text).map_err(|e| parse_error(e.to_string()))?;
        if let Some(block) = body.blocks().next() {
            return Err(parse_error(format!(
                "blocks are not allowed in variable files (found `{}`)",
                block.ident.as_str()
            )));
        }
        body.set_prefer_omit_trailing_newline(false);

        let mut seen = HashSet::new();
        for attr in body.attributes() {
            let key = attr.key.as_str();
            evaluate_attribute(attr)
                .map_err(|e| parse_error(format!("cannot evaluate `{key}`: {e}")))?;
            seen.insert(key.to_string());
        }

        for anchor in anchors(body.len()) {
            for (_, key) in placeholder::scan(trivia(&body, anchor)) {
                if !seen.insert(key.clone()) {
                    return Err(parse_error(format!("duplicate variable `{key}`")));
                }
            }
        }

        debug!("Parsed {} attributes from {name}", body.len());
        Ok(Self { name, body })
    }

    /// Loads a document from disk.
    ///
    /// A missing file yields an empty document unless `required` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::FileNotFound`] for a missing required file,
    /// an IO error if the file cannot be read, or a parse error.
    pub fn from_file(path: impl AsRef<Path>, required: bool) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();

        match std::fs::read_to_string(path) {
            Ok(content) => {
                info!("Loading variables from: {name}");
                Self::parse(name, &content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if required {
                    Err(DocumentError::FileNotFound {
                        path: path.to_path_buf(),
                    }
                    .into())
                } else {
                    debug!("Variable file does not exist, starting empty: {name}");
                    Ok(Self::empty(name))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the rendered document to `path`.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be written.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Writing variables to: {}", path.display());

        // Write to a temporary file first, then rename over the target
        let temp_path = path.with_extension("tfvars.tmp");
        std::fs::write(&temp_path, self.to_string())?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Returns the document name (usually its path).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the document holds no attributes, placeholders or
    /// comments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.trivia(Anchor::End).trim().is_empty()
    }

    /// Returns true if an attribute or placeholder uses `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.attribute_index(key).is_some() || self.find_placeholder(key).is_some()
    }

    /// Returns the variables assigned in the document, in document order.
    ///
    /// Sensitive placeholders carry no value and are not included.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.body
            .attributes()
            .filter_map(|attr| {
                let value = evaluate_attribute(attr).ok()?;
                Some(
                    Variable::new(attr.key.as_str(), ValueCodec::render(&value))
                        .with_hcl(!ValueCodec::is_primitive(&value)),
                )
            })
            .collect()
    }

    /// Sets a single variable, in place if the key exists, else appended.
    ///
    /// An existing attribute whose value already renders to the same flat
    /// string is left untouched, so `port = 3000` stays a number when the
    /// store holds `"3000"`. A replaced value keeps the spacing around it.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidVariable`] if the key is empty or not
    /// an identifier, and [`DocumentError::InvalidValue`] if the value cannot
    /// be written.
    pub fn set_variable(&mut self, variable: &Variable) -> Result<()> {
        let key = variable.key.as_str();
        if key.is_empty() {
            return Err(DocumentError::invalid_variable("variable key must not be empty").into());
        }
        let ident = Ident::try_new(key).map_err(|_| {
            DocumentError::invalid_variable(format!("`{key}` is not a valid variable name"))
        })?;

        if variable.sensitive {
            self.mask(key);
            return Ok(());
        }

        let value = if variable.hcl {
            ValueCodec::parse(&variable.value)
        } else {
            Value::String(variable.value.clone())
        };
        let expr = value_expression(&value).map_err(|message| DocumentError::InvalidValue {
            value: variable.value.clone(),
            message,
        })?;

        if let Some(index) = self.attribute_index(key) {
            if let Some(attr) = self.body.get_mut(index).and_then(Structure::as_attribute_mut) {
                let unchanged = evaluate_attribute(attr).is_ok_and(|existing| {
                    ValueCodec::render(&existing) == ValueCodec::render(&value)
                        && ValueCodec::is_primitive(&existing) == ValueCodec::is_primitive(&value)
                });
                if !unchanged {
                    let decor = attr.value.decor().clone();
                    attr.value = expr;
                    *attr.value.decor_mut() = decor;
                }
            }
            return Ok(());
        }

        let mut attr = Attribute::new(ident, expr);
        match self.find_placeholder(key) {
            // A placeholder turns back into an attribute on its own line
            Some((anchor, range)) => {
                let text = self.trivia(anchor).to_string();
                attr.decor_mut().set_prefix(text[..range.start].to_string());
                let rest = text[range.end..].to_string();
                match anchor {
                    Anchor::Before(index) => {
                        self.set_trivia(anchor, rest);
                        self.body.insert(index, attr);
                    }
                    Anchor::End => {
                        self.body.push(attr);
                        self.set_trivia(Anchor::End, rest);
                    }
                }
            }
            None => {
                // Trailing comments and placeholders stay above the new line
                let mut prefix = self.trivia(Anchor::End).to_string();
                close_line(&mut prefix);
                attr.decor_mut().set_prefix(prefix);
                self.body.push(attr);
                self.set_trivia(Anchor::End, String::new());
            }
        }
        Ok(())
    }

    /// Sets every variable in order.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`VariableDocument::set_variable`].
    pub fn merge_variables(&mut self, variables: &[Variable]) -> Result<()> {
        for variable in variables {
            self.set_variable(variable)?;
        }
        Ok(())
    }

    /// Removes the attribute or placeholder for `key`.
    ///
    /// Comments above a removed attribute stay in place. Returns true if
    /// something was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        if let Some(index) = self.attribute_index(key) {
            self.detach(index, None);
            return true;
        }

        match self.find_placeholder(key) {
            Some((anchor, range)) => {
                let mut text = self.trivia(anchor).to_string();
                text.replace_range(range, "");
                self.set_trivia(anchor, text);
                true
            }
            None => false,
        }
    }

    /// Reshapes the document so it holds exactly the remote variables.
    ///
    /// Keys missing from `remote` are removed, the rest are set in place and
    /// new keys are appended. Comments and ordering of kept keys survive.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`VariableDocument::set_variable`].
    pub fn apply_remote_snapshot(&mut self, remote: &[Variable]) -> Result<()> {
        let keys: HashSet<&str> = remote.iter().map(|v| v.key.as_str()).collect();

        let stale: Vec<String> = self
            .body
            .attributes()
            .map(|attr| attr.key.as_str())
            .filter(|key| !keys.contains(key))
            .map(str::to_string)
            .collect();
        for key in &stale {
            self.remove(key);
        }

        for anchor in anchors(self.body.len()) {
            if let Some(kept) = placeholder::retain(self.trivia(anchor), |key| keys.contains(key)) {
                self.set_trivia(anchor, kept);
            }
        }

        self.merge_variables(remote)
    }

    /// Returns a copy of the document reshaped to `remote`.
    ///
    /// # Errors
    ///
    /// See [`VariableDocument::apply_remote_snapshot`].
    pub fn with_remote_snapshot(&self, remote: &[Variable]) -> Result<Self> {
        let mut doc = self.clone();
        doc.apply_remote_snapshot(remote)?;
        Ok(doc)
    }

    /// Replaces the attribute for `key` with its placeholder.
    fn mask(&mut self, key: &str) {
        if self.find_placeholder(key).is_some() {
            return;
        }

        match self.attribute_index(key) {
            Some(index) => self.detach(index, Some(&placeholder::line(key))),
            None => {
                let mut text = self.trivia(Anchor::End).to_string();
                close_line(&mut text);
                text.push_str(&placeholder::line(key));
                self.set_trivia(Anchor::End, text);
            }
        }
    }

    /// Removes the structure at `index`. Its leading comments, followed by
    /// `replacement`, move to whatever comes next.
    fn detach(&mut self, index: usize, replacement: Option<&str>) {
        let mut text = self.trivia(Anchor::Before(index)).to_string();
        text.push_str(replacement.unwrap_or_default());
        self.body.remove(index);

        let anchor = if index < self.body.len() {
            Anchor::Before(index)
        } else {
            Anchor::End
        };
        text.push_str(self.trivia(anchor));
        self.set_trivia(anchor, text);
    }

    fn trivia(&self, anchor: Anchor) -> &str {
        trivia(&self.body, anchor)
    }

    fn set_trivia(&mut self, anchor: Anchor, text: String) {
        match anchor {
            Anchor::Before(index) => {
                if let Some(structure) = self.body.get_mut(index) {
                    structure.decor_mut().set_prefix(text);
                }
            }
            Anchor::End => self.body.decor_mut().set_suffix(text),
        }
    }

    fn attribute_index(&self, key: &str) -> Option<usize> {
        self.body
            .iter()
            .position(|s| s.as_attribute().is_some_and(|attr| attr.has_key(key)))
    }

    fn find_placeholder(&self, key: &str) -> Option<(Anchor, Range<usize>)> {
        anchors(self.body.len()).find_map(|anchor| {
            placeholder::find(self.trivia(anchor), key).map(|range| (anchor, range))
        })
    }
}

impl fmt::Display for VariableDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.body, f)
    }
}
