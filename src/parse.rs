//! Parse Module
//!
//! Extracts binding references from template text, one line at a time, in
//! two independent passes:
//!
//! 1. **Directives**: `wire:click="save"` style attributes from a fixed
//!    vocabulary (dotted modifiers such as `wire:model.live` allowed).
//! 2. **Sentinel expressions**: `$wire.save()` calls and `$wire.count`
//!    reads inside inline scripts. Calls are found first and their spans
//!    recorded; a read that overlaps a call span, or that is followed by
//!    `(` after optional whitespace, is not reported again.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::config::CheckConfig;
use crate::error::{FuseError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// REFERENCE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// Bare directive name, without the prefix (`click`, `model`).
    Directive(String),
    /// `$wire.name(...)`
    SentinelCall,
    /// `$wire.name`
    SentinelAccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingReference {
    /// Trimmed target as written; sentinel calls are recorded as `name()`.
    pub target: String,
    pub kind: ReferenceKind,
    /// Human label of the kind: `wire:click`, `$wire method call`, ...
    pub label: String,
    /// 1-based.
    pub line: usize,
    pub template: PathBuf,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPAN SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Half-open byte ranges already claimed on a line.
#[derive(Debug, Default)]
pub struct SpanSet {
    spans: Vec<Range<usize>>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, span: Range<usize>) {
        self.spans.push(span);
    }

    pub fn overlaps(&self, span: &Range<usize>) -> bool {
        self.spans
            .iter()
            .any(|s| s.start < span.end && span.start < s.end)
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXTRACTOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct BindingExtractor {
    directives: Vec<(String, String, Regex)>,
    call_re: Regex,
    access_re: Regex,
    call_label: String,
    access_label: String,
}

impl BindingExtractor {
    pub fn new(config: &CheckConfig) -> Result<Self> {
        let mut directives = Vec::new();
        for name in config.directives() {
            let label = config.directive_kind(name);
            let pattern = format!(
                r#"{}(?:\.[\w-]+)*\s*=\s*["']([^"']+)["']"#,
                regex::escape(&label)
            );
            directives.push((name.to_string(), label, Regex::new(&pattern)?));
        }

        let sentinel = regex::escape(&config.sentinel);
        Ok(Self {
            directives,
            call_re: Regex::new(&format!(r"{}\.(\w+)\s*\(", sentinel))?,
            access_re: Regex::new(&format!(r"{}\.(\w+)", sentinel))?,
            call_label: format!("{} method call", config.sentinel),
            access_label: format!("{} property access", config.sentinel),
        })
    }

    /// Read and extract a template file. Invalid UTF-8 is replaced rather
    /// than rejected.
    pub fn extract_file(&self, path: &Path) -> Result<Vec<BindingReference>> {
        let bytes = fs::read(path).map_err(|e| FuseError::io(path, e))?;
        Ok(self.extract(&String::from_utf8_lossy(&bytes), path))
    }

    /// All references in `text`, top to bottom.
    pub fn extract(&self, text: &str, template: &Path) -> Vec<BindingReference> {
        let mut references = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            self.directive_pass(line, line_number, template, &mut references);
            self.sentinel_pass(line, line_number, template, &mut references);
        }
        references
    }

    fn directive_pass(
        &self,
        line: &str,
        line_number: usize,
        template: &Path,
        out: &mut Vec<BindingReference>,
    ) {
        for (name, label, re) in &self.directives {
            for caps in re.captures_iter(line) {
                let Some(value) = caps.get(1) else { continue };
                let target = value.as_str().trim();
                if target.is_empty() {
                    continue;
                }
                out.push(BindingReference {
                    target: target.to_string(),
                    kind: ReferenceKind::Directive(name.clone()),
                    label: label.clone(),
                    line: line_number,
                    template: template.to_path_buf(),
                });
            }
        }
    }

    fn sentinel_pass(
        &self,
        line: &str,
        line_number: usize,
        template: &Path,
        out: &mut Vec<BindingReference>,
    ) {
        let mut consumed = SpanSet::new();

        for caps in self.call_re.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push(BindingReference {
                target: format!("{}()", name.as_str()),
                kind: ReferenceKind::SentinelCall,
                label: self.call_label.clone(),
                line: line_number,
                template: template.to_path_buf(),
            });
            consumed.insert(whole.range());
        }

        for caps in self.access_re.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if consumed.overlaps(&whole.range()) {
                continue;
            }
            // Call form the first scan missed
            if line[whole.end()..].trim_start().starts_with('(') {
                continue;
            }
            out.push(BindingReference {
                target: name.as_str().to_string(),
                kind: ReferenceKind::SentinelAccess,
                label: self.access_label.clone(),
                line: line_number,
                template: template.to_path_buf(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_set_overlaps() {
        let mut spans = SpanSet::new();
        assert!(spans.is_empty());
        spans.insert(5..12);
        assert!(spans.overlaps(&(0..6)));
        assert!(spans.overlaps(&(11..20)));
        assert!(spans.overlaps(&(7..9)));
        assert!(!spans.overlaps(&(0..5)));
        assert!(!spans.overlaps(&(12..15)));
    }
}
