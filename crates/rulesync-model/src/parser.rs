//! Rule file parser
//!
//! Reads one or more YAML rule files and groups their rule groups by
//! namespace. A file may hold several YAML documents separated by `---`;
//! each document names its namespace explicitly or inherits one:
//!
//! ```text
//! explicit `namespace:` key
//!   -> ParseOptions::default_namespace
//!     -> file stem (`team-a.yaml` -> `team-a`)
//! ```
//!
//! Groups declared for the same namespace in different files are merged
//! into one [`Namespace`], in file-processing order. Declaring the same
//! (namespace, group) pair twice is an error.
//!
//! Parsing is all-or-nothing: the first failure aborts and no partial
//! result is returned.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::schema::{Namespace, RuleDocument, RuleGroup};
use crate::{Error, Result};

/// Options controlling how namespaces are derived
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Namespace for documents that do not declare one
    pub default_namespace: Option<String>,
}

impl ParseOptions {
    pub fn with_default_namespace(namespace: impl Into<String>) -> Self {
        Self {
            default_namespace: Some(namespace.into()),
        }
    }
}

/// Parses rule files into namespaces
#[derive(Debug, Default)]
pub struct RuleParser {
    options: ParseOptions,
    namespaces: Vec<Namespace>,
    /// namespace name -> index into `namespaces`
    index: HashMap<String, usize>,
    /// (namespace, group) -> file that first declared it
    declared: HashMap<(String, String), PathBuf>,
}

impl RuleParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Read and parse a rule file, adding its groups to the parser state
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.add_str(&content, path)
    }

    /// Parse rule file content. `source` is used for error messages and
    /// for the file-stem namespace fallback.
    pub fn add_str(&mut self, content: &str, source: &Path) -> Result<()> {
        let mut documents = 0usize;
        for document in serde_yaml::Deserializer::from_str(content) {
            let parsed = Option::<RuleDocument>::deserialize(document)
                .map_err(|e| Error::parse(source, e.to_string()))?;
            let Some(parsed) = parsed else {
                continue;
            };
            documents += 1;

            let namespace = self.namespace_for(parsed.namespace, source)?;
            for group in parsed.groups {
                self.add_group(&namespace, group.into(), source)?;
            }
        }

        tracing::debug!(path = %source.display(), documents, "parsed rule file");
        Ok(())
    }

    /// Consume the parser, returning namespaces in order of first declaration
    pub fn finish(self) -> Vec<Namespace> {
        self.namespaces
    }

    fn namespace_for(&self, declared: Option<String>, source: &Path) -> Result<String> {
        let name = match declared {
            Some(name) => name,
            None => match &self.options.default_namespace {
                Some(name) => name.clone(),
                None => source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .ok_or_else(|| Error::InvalidNamespace {
                        path: source.to_path_buf(),
                        message: "no namespace declared and none can be derived from the file name"
                            .to_string(),
                    })?,
            },
        };

        if name.trim().is_empty() {
            return Err(Error::InvalidNamespace {
                path: source.to_path_buf(),
                message: "namespace must not be empty".to_string(),
            });
        }
        Ok(name)
    }

    fn add_group(&mut self, namespace: &str, group: RuleGroup, source: &Path) -> Result<()> {
        if group.name.trim().is_empty() {
            return Err(Error::EmptyGroupName {
                path: source.to_path_buf(),
                namespace: namespace.to_string(),
            });
        }

        let key = (namespace.to_string(), group.name.clone());
        if let Some(first) = self.declared.get(&key) {
            return Err(Error::DuplicateGroup {
                namespace: key.0,
                group: key.1,
                first: first.clone(),
                second: source.to_path_buf(),
            });
        }
        self.declared.insert(key, source.to_path_buf());

        let slot = match self.index.get(namespace) {
            Some(&slot) => slot,
            None => {
                self.namespaces.push(Namespace::new(namespace, Vec::new()));
                self.index
                    .insert(namespace.to_string(), self.namespaces.len() - 1);
                self.namespaces.len() - 1
            }
        };
        self.namespaces[slot].groups.push(group);
        Ok(())
    }
}

/// Parse a set of rule files into namespaces
///
/// # Errors
///
/// Returns the first read, syntax, validation, or duplicate-group error.
pub fn parse_files<P: AsRef<Path>>(paths: &[P], options: &ParseOptions) -> Result<Vec<Namespace>> {
    let mut parser = RuleParser::new(options.clone());
    for path in paths {
        parser.add_file(path.as_ref())?;
    }
    Ok(parser.finish())
}
