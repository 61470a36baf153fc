//! Retained JSON tree shared by the package.json and composer.json adapters
//!
//! The decoded tree answers every question about the document, but the
//! source text is what gets written back: changed constraints are spliced
//! into the original bytes at the string literal spans tree-sitter reports,
//! so everything else in the file stays as the author wrote it. Only when an
//! ignored entry has been removed is the tree re-serialized, with the
//! detected indentation, key order (serde_json `preserve_order`) and
//! trailing newline.

use crate::domain::{strip_range_prefix, ManifestRecord, RANGE_OPERATORS};
use crate::error::ManifestError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::{Node, Tree};

/// A constraint to splice into the source text
#[derive(Debug, Clone)]
struct Edit {
    section: &'static str,
    key: String,
    value: String,
}

/// A decoded JSON manifest plus the source it was decoded from
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
    source: String,
    root: Map<String, Value>,
    edits: Vec<Edit>,
    /// An entry was removed; the source no longer matches the tree
    restructured: bool,
}

impl JsonDocument {
    /// Decode a JSON manifest; the top level must be an object
    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<Self, ManifestError> {
        let path = path.as_ref().to_path_buf();
        let root = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(ManifestError::json_parse_error(
                    &path,
                    "expected an object at the top level",
                ))
            }
            Err(e) => return Err(ManifestError::json_parse_error(&path, e.to_string())),
        };

        Ok(Self {
            path,
            source: content.to_string(),
            root,
            edits: Vec::new(),
            restructured: false,
        })
    }

    /// Path the document was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Object-valued top-level section; `Ok(None)` when absent
    fn section_mut(
        &mut self,
        name: &str,
    ) -> Result<Option<&mut Map<String, Value>>, ManifestError> {
        match self.root.get_mut(name) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(ManifestError::invalid_section(
                &self.path,
                name,
                "expected an object",
            )),
        }
    }

    /// Encode the document with every applied change
    pub fn render(&self) -> Result<String, ManifestError> {
        if self.restructured {
            self.reserialize()
        } else if self.edits.is_empty() {
            Ok(self.source.clone())
        } else {
            self.splice()
        }
    }

    /// Replace each edited string literal in the source text
    fn splice(&self) -> Result<String, ManifestError> {
        let tree = syntax_tree(&self.source, &self.path)?;
        let root = tree.root_node();

        let mut replacements = Vec::with_capacity(self.edits.len());
        for edit in &self.edits {
            let span = string_span(root, &self.source, edit.section, &edit.key)
                .ok_or_else(|| ManifestError::inconsistent_record(&self.path, &edit.key))?;
            replacements.push((span, Value::String(edit.value.clone()).to_string()));
        }

        // Back to front, so earlier spans stay valid
        replacements.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));
        let mut output = self.source.clone();
        for (span, literal) in replacements {
            output.replace_range(span, &literal);
        }
        Ok(output)
    }

    /// Re-encode the whole tree with the layout detected in the source
    fn reserialize(&self) -> Result<String, ManifestError> {
        let mut buffer = Vec::new();
        match detect_indent(&self.source) {
            Some(indent) => {
                let formatter = PrettyFormatter::with_indent(indent.as_bytes());
                let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
                self.root
                    .serialize(&mut serializer)
                    .map_err(|e| ManifestError::write_error(&self.path, e.into()))?;
            }
            None => {
                serde_json::to_writer(&mut buffer, &self.root)
                    .map_err(|e| ManifestError::write_error(&self.path, e.into()))?;
            }
        }

        let mut output = String::from_utf8(buffer).map_err(|e| {
            ManifestError::write_error(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        if self.source.ends_with('\n') {
            output.push('\n');
        }
        Ok(output)
    }
}

fn syntax_tree(source: &str, path: &Path) -> Result<Tree, ManifestError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_json::LANGUAGE.into())
        .map_err(|e| ManifestError::json_parse_error(path, e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| ManifestError::json_parse_error(path, "failed to build syntax tree"))
}

/// Byte range, quotes included, of the string at `root[section][key]`
fn string_span(document: Node, source: &str, section: &str, key: &str) -> Option<Range<usize>> {
    let object = document.child(0).filter(|node| node.kind() == "object")?;
    let dependencies = pair_value(object, source, section).filter(|node| node.kind() == "object")?;
    pair_value(dependencies, source, key)
        .filter(|node| node.kind() == "string")
        .map(|node| node.byte_range())
}

/// Value of the last pair named `key`; serde_json keeps the last duplicate too
fn pair_value<'tree>(object: Node<'tree>, source: &str, key: &str) -> Option<Node<'tree>> {
    let mut cursor = object.walk();
    let value = object
        .children(&mut cursor)
        .filter(|child| child.kind() == "pair")
        .filter(|pair| {
            pair.child_by_field_name("key")
                .and_then(|node| serde_json::from_str::<String>(&source[node.byte_range()]).ok())
                .is_some_and(|name| name == key)
        })
        .filter_map(|pair| pair.child_by_field_name("value"))
        .last();
    value
}

/// Leading whitespace of the first indented line, or `None` if the document
/// is on a single line
fn detect_indent(content: &str) -> Option<String> {
    let trimmed = content.trim_end();
    if !trimmed.contains('\n') {
        return None;
    }

    let indent = trimmed
        .lines()
        .skip(1)
        .map(|line| {
            let rest = line.trim_start_matches([' ', '\t']);
            &line[..line.len() - rest.len()]
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or("  ");
    Some(indent.to_string())
}

/// The name -> constraint object a JSON dialect keeps its dependencies in.
/// Range operators are stripped for comparison and kept on write.
#[derive(Debug, Clone, Copy)]
pub struct DependencySection {
    /// Top-level key (`dependencies`, `require`)
    pub key: &'static str,
    /// Entries that are not registry packages
    pub skip: fn(&str) -> bool,
}

impl DependencySection {
    /// Drop ignored entries from the document and decode the rest
    pub fn read(
        &self,
        document: &mut JsonDocument,
        ignore: &BTreeSet<String>,
    ) -> Result<Vec<ManifestRecord>, ManifestError> {
        let path = document.path().to_path_buf();
        let Some(section) = document.section_mut(self.key)? else {
            debug!(section = self.key, "No dependency section");
            return Ok(Vec::new());
        };

        let before = section.len();
        section.retain(|name, _| !ignore.contains(name));
        let removed = before - section.len();

        let mut records = Vec::with_capacity(section.len());
        for (name, value) in section.iter() {
            if (self.skip)(name) {
                debug!(package = %name, "Skipping platform requirement");
                continue;
            }
            let spec = value.as_str().ok_or_else(|| {
                ManifestError::invalid_section(
                    &path,
                    self.key,
                    format!("version of '{}' must be a string", name),
                )
            })?;
            let current = strip_range_prefix(spec, RANGE_OPERATORS);
            records.push(ManifestRecord::new(name.as_str(), spec, current));
        }

        if removed > 0 {
            debug!(section = self.key, removed, "Removed ignored entries");
            document.restructured = true;
        }
        Ok(records)
    }

    /// Set each record's rewritten constraint; unchanged ones are left alone
    pub fn apply(
        &self,
        document: &mut JsonDocument,
        records: &[ManifestRecord],
    ) -> Result<(), ManifestError> {
        let path = document.path().to_path_buf();
        let Some(section) = document.section_mut(self.key)? else {
            return match records.first() {
                Some(record) => Err(ManifestError::inconsistent_record(&path, &record.name)),
                None => Ok(()),
            };
        };

        let mut edits = Vec::new();
        for record in records {
            let Some(value) = section.get_mut(&record.name) else {
                return Err(ManifestError::inconsistent_record(&path, &record.name));
            };
            if !record.needs_rewrite() {
                continue;
            }
            let spec = record.rewritten_spec();
            *value = Value::String(spec.clone());
            edits.push(Edit {
                section: self.key,
                key: record.name.clone(),
                value: spec,
            });
        }

        document.edits.extend(edits);
        Ok(())
    }
}
