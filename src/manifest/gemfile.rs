//! Gemfile adapter for Ruby projects
//!
//! Handles:
//! - `gem 'name'` and `gem "name", "constraint"` declarations
//! - Pessimistic and comparison constraints (`~> 6.0`, `>= 1.2`)
//! - Trailing options such as `require: false`
//!
//! Only the version text inside the first constraint token is rewritten.
//! Further constraint tokens (`'>= 5.0', '< 7.0'`) would contradict the new
//! version, so they are dropped, with a warning, when the version changes.
//! Every other line, including `source`, `group` blocks and comments, is
//! written back exactly as read.

use crate::domain::{strip_range_prefix, Dialect, ManifestRecord};
use crate::error::ManifestError;
use crate::manifest::{ensure_known, find_record, ManifestAdapter, ManifestOptions};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static GEM_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(\s*gem\s+)(['"])([^'"]+)(['"])(.*)$"#).unwrap());

static VERSION_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(\s*,\s*)(['"])([^'"]*)(['"])"#).unwrap());

/// Characters stripped from a constraint to get a comparable version
const CONSTRAINT_OPERATORS: &[char] = &['~', '>', '<', '=', '!'];

/// The quoted constraint following a gem name
#[derive(Debug, Clone, PartialEq, Eq)]
struct VersionToken {
    separator: String,
    quote: String,
    spec: String,
}

/// A `gem` declaration split around its version token
#[derive(Debug, Clone, PartialEq, Eq)]
struct GemDeclaration {
    name: String,
    /// Everything up to and including the name's closing quote
    head: String,
    name_quote: String,
    version: Option<VersionToken>,
    /// Constraint tokens after the first one, as written
    extra_constraints: String,
    /// Text after the version tokens (or after the name if there are none)
    tail: String,
    line_ending: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GemfileLine {
    Gem(GemDeclaration),
    Verbatim(String),
}

/// Adapter for Gemfile manifests
pub struct GemfileAdapter {
    options: ManifestOptions,
    lines: Option<Vec<GemfileLine>>,
}

impl GemfileAdapter {
    /// Create a new Gemfile adapter
    pub fn new(options: ManifestOptions) -> Self {
        Self {
            options,
            lines: None,
        }
    }

    fn parse_declaration(
        &self,
        line_number: usize,
        raw: &str,
    ) -> Result<(GemDeclaration, ManifestRecord), ManifestError> {
        let body = raw.trim_end_matches(['\n', '\r']);
        let line_ending = raw[body.len()..].to_string();

        let caps = GEM_LINE_RE.captures(body).ok_or_else(|| {
            ManifestError::line_parse_error(
                &self.options.path,
                line_number,
                body.trim(),
                "expected a quoted gem name",
            )
        })?;

        let name = caps[3].to_string();
        let head = format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], &caps[4]);
        let rest = &caps[5];

        let (version, spec, rest) = match VERSION_TOKEN_RE.captures(rest) {
            Some(v) => (
                Some(VersionToken {
                    separator: v[1].to_string(),
                    quote: v[2].to_string(),
                    spec: v[3].to_string(),
                }),
                v[3].to_string(),
                &rest[v[0].len()..],
            ),
            None => (None, String::new(), rest),
        };

        let mut extra_len = 0;
        while let Some(token) = VERSION_TOKEN_RE.find(&rest[extra_len..]) {
            extra_len += token.end();
        }
        let (extra_constraints, tail) = rest.split_at(extra_len);

        let current = strip_range_prefix(&spec, CONSTRAINT_OPERATORS).trim_end();
        let record = ManifestRecord::new(&name, spec.as_str(), current);

        let declaration = GemDeclaration {
            name,
            head,
            name_quote: caps[2].to_string(),
            version,
            extra_constraints: extra_constraints.to_string(),
            tail: tail.to_string(),
            line_ending,
        };

        Ok((declaration, record))
    }
}

/// Returns true for lines whose first whitespace-delimited token is `gem`
fn is_gem_line(line: &str) -> bool {
    line.split_whitespace().next() == Some("gem")
}

impl ManifestAdapter for GemfileAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Gem
    }

    fn options(&self) -> &ManifestOptions {
        &self.options
    }

    fn parse(&mut self, content: &str) -> Result<Vec<ManifestRecord>, ManifestError> {
        let mut lines = Vec::new();
        let mut records = Vec::new();

        for (index, raw) in content.split_inclusive('\n').enumerate() {
            if !is_gem_line(raw) {
                lines.push(GemfileLine::Verbatim(raw.to_string()));
                continue;
            }

            let (declaration, record) = self.parse_declaration(index + 1, raw)?;
            if self.options.is_ignored(&declaration.name) {
                lines.push(GemfileLine::Verbatim(raw.to_string()));
                continue;
            }

            records.push(record);
            lines.push(GemfileLine::Gem(declaration));
        }

        self.lines = Some(lines);
        Ok(records)
    }

    fn render(&mut self, records: &[ManifestRecord]) -> Result<String, ManifestError> {
        let lines = self
            .lines
            .as_ref()
            .ok_or_else(|| ManifestError::NotLoaded {
                path: self.options.path.clone(),
            })?;

        ensure_known(&self.options.path, records, |name| {
            lines
                .iter()
                .any(|line| matches!(line, GemfileLine::Gem(d) if d.name == name))
        })?;

        let mut output = String::with_capacity(lines.len() * 32);
        for line in lines {
            match line {
                GemfileLine::Verbatim(raw) => output.push_str(raw),
                GemfileLine::Gem(declaration) => {
                    output.push_str(&render_declaration(
                        declaration,
                        find_record(records, &declaration.name),
                    ));
                }
            }
        }

        Ok(output)
    }
}

fn render_declaration(declaration: &GemDeclaration, record: Option<&ManifestRecord>) -> String {
    let mut line = declaration.head.clone();

    match &declaration.version {
        Some(token) => {
            let rewritten = record.filter(|r| r.needs_rewrite());
            let spec = rewritten
                .map(|r| r.rewritten_spec())
                .unwrap_or_else(|| token.spec.clone());
            line.push_str(&token.separator);
            line.push_str(&token.quote);
            line.push_str(&spec);
            line.push_str(&token.quote);

            if rewritten.is_some() && !declaration.extra_constraints.is_empty() {
                warn!(
                    package = %declaration.name,
                    dropped = declaration.extra_constraints.trim_start_matches([',', ' ']),
                    "Dropping constraints written after the rewritten version"
                );
            } else {
                line.push_str(&declaration.extra_constraints);
            }
        }
        None => {
            if let Some(latest) = record.and_then(|r| r.latest_version.as_deref()) {
                line.push_str(", ");
                line.push_str(&declaration.name_quote);
                line.push_str(latest);
                line.push_str(&declaration.name_quote);
            }
        }
    }

    line.push_str(&declaration.tail);
    line.push_str(&declaration.line_ending);
    line
}
