use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::component::ComponentApi;
use crate::config::CheckConfig;
use crate::parse::{BindingReference, ReferenceKind};

lazy_static! {
    /// `save()` / `save ()` with an empty argument list.
    static ref METHOD_TARGET_RE: Regex = Regex::new(r"^(\w+)\s*\(\)$").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR RECORD
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "Missing Method")]
    MissingMethod,
    #[serde(rename = "Missing Property")]
    MissingProperty,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MissingMethod => f.write_str("Missing Method"),
            ErrorKind::MissingProperty => f.write_str("Missing Property"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub file: PathBuf,
    pub line: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// What a reference is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Method(String),
    /// Root segment only; deeper segments are never checked.
    Property(String),
    /// Framework-provided target, never reported.
    Builtin,
}

/// `save(1, 'a')` → `save`
fn method_name(target: &str) -> &str {
    target.split('(').next().unwrap_or(target).trim()
}

/// `user.address.city` → `user`
fn root_segment(target: &str) -> &str {
    target.split('.').next().unwrap_or(target)
}

pub struct Validator {
    method_directives: HashSet<String>,
    property_directives: HashSet<String>,
    client_methods: HashSet<String>,
}

impl Validator {
    pub fn new(config: &CheckConfig) -> Self {
        Self {
            method_directives: config.method_directives.iter().cloned().collect(),
            property_directives: config.property_directives.iter().cloned().collect(),
            client_methods: config.client_methods.iter().cloned().collect(),
        }
    }

    pub fn classify(&self, reference: &BindingReference) -> Lookup {
        let target = reference.target.as_str();

        if let ReferenceKind::Directive(name) = &reference.kind {
            if self.method_directives.contains(name) {
                let method = method_name(target);
                // $refresh, $set(...), $toggle(...)
                if method.starts_with('$') {
                    return Lookup::Builtin;
                }
                return Lookup::Method(method.to_string());
            }
            if self.property_directives.contains(name) {
                return Lookup::Property(root_segment(target).to_string());
            }
        }

        match METHOD_TARGET_RE.captures(target).and_then(|c| c.get(1)) {
            Some(m) if self.client_methods.contains(m.as_str()) => Lookup::Builtin,
            Some(m) => Lookup::Method(m.as_str().to_string()),
            None => Lookup::Property(root_segment(target).to_string()),
        }
    }

    /// At most one error per reference.
    pub fn validate(&self, reference: &BindingReference, api: &ComponentApi) -> Option<ErrorRecord> {
        let (kind, message) = match self.classify(reference) {
            Lookup::Method(name) if !api.has_method(&name) => (
                ErrorKind::MissingMethod,
                format!(
                    "Method '{}()' referenced in {} does not exist or is not public",
                    name, reference.label
                ),
            ),
            Lookup::Property(root) if !api.has_property(&root) => (
                ErrorKind::MissingProperty,
                format!(
                    "Property '{}' referenced in {} does not exist or is not public",
                    root, reference.label
                ),
            ),
            _ => return None,
        };

        Some(ErrorRecord {
            kind,
            message,
            file: reference.template.clone(),
            line: reference.line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(name: &str, target: &str) -> BindingReference {
        BindingReference {
            target: target.to_string(),
            kind: ReferenceKind::Directive(name.to_string()),
            label: format!("wire:{}", name),
            line: 3,
            template: PathBuf::from("counter.blade.php"),
        }
    }

    fn sentinel(kind: ReferenceKind, target: &str) -> BindingReference {
        BindingReference {
            target: target.to_string(),
            kind,
            label: "$wire".to_string(),
            line: 1,
            template: PathBuf::from("counter.blade.php"),
        }
    }

    fn api(properties: &[&str], methods: &[&str]) -> ComponentApi {
        ComponentApi {
            properties: properties.iter().map(|s| s.to_string()).collect(),
            methods: methods.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_method_directive_hit_and_miss() {
        let validator = Validator::new(&CheckConfig::default());
        let api = api(&["count"], &["increment"]);

        assert!(validator.validate(&directive("click", "increment"), &api).is_none());

        let err = validator
            .validate(&directive("click", "decrement"), &api)
            .expect("decrement is missing");
        assert_eq!(err.kind, ErrorKind::MissingMethod);
        assert_eq!(err.line, 3);
        assert!(err.message.contains("decrement"));
        assert!(err.message.contains("wire:click"));
        assert!(err.message.starts_with("Method"));
    }

    #[test]
    fn test_method_arguments_are_stripped() {
        let validator = Validator::new(&CheckConfig::default());
        let api = api(&[], &["remove"]);
        assert!(validator.validate(&directive("click", "remove(5)"), &api).is_none());
        assert!(validator.validate(&directive("submit", "remove()"), &api).is_none());
        assert!(validator.validate(&directive("keydown", "remove ( 'a' )"), &api).is_none());
    }

    #[test]
    fn test_magic_actions_are_builtin() {
        let validator = Validator::new(&CheckConfig::default());
        assert_eq!(validator.classify(&directive("click", "$refresh")), Lookup::Builtin);
        assert_eq!(
            validator.classify(&directive("click", "$set('open', true)")),
            Lookup::Builtin
        );
    }

    #[test]
    fn test_property_directive_checks_root_segment_only() {
        let validator = Validator::new(&CheckConfig::default());
        let api = api(&["user"], &[]);

        assert!(validator.validate(&directive("model", "user.name"), &api).is_none());
        assert!(validator.validate(&directive("model", "user.address.city"), &api).is_none());

        let err = validator.validate(&directive("model", "profile.name"), &api).unwrap();
        assert_eq!(err.kind, ErrorKind::MissingProperty);
        assert!(err.message.contains("'profile'"));
        assert!(!err.message.contains("name"));
    }

    #[test]
    fn test_property_lookup_is_case_sensitive() {
        let validator = Validator::new(&CheckConfig::default());
        let api = api(&["count"], &["save"]);
        assert!(validator.validate(&directive("model", "Count"), &api).is_some());
        assert!(validator.validate(&directive("click", "Save"), &api).is_some());
    }

    #[test]
    fn test_sentinel_references_classified_generically() {
        let validator = Validator::new(&CheckConfig::default());
        assert_eq!(
            validator.classify(&sentinel(ReferenceKind::SentinelCall, "save()")),
            Lookup::Method("save".to_string())
        );
        assert_eq!(
            validator.classify(&sentinel(ReferenceKind::SentinelAccess, "count")),
            Lookup::Property("count".to_string())
        );
        assert_eq!(
            validator.classify(&sentinel(ReferenceKind::SentinelCall, "entangle()")),
            Lookup::Builtin
        );
    }

    #[test]
    fn test_empty_api_fails_every_reference() {
        let validator = Validator::new(&CheckConfig::default());
        let empty = ComponentApi::default();
        assert!(validator.validate(&directive("click", "save"), &empty).is_some());
        assert!(validator.validate(&directive("model", "title"), &empty).is_some());
        assert!(validator
            .validate(&sentinel(ReferenceKind::SentinelAccess, "count"), &empty)
            .is_some());
    }

    #[test]
    fn test_error_record_json_shape() {
        let record = ErrorRecord {
            kind: ErrorKind::MissingMethod,
            message: "m".to_string(),
            file: PathBuf::from("a.blade.php"),
            line: 7,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Missing Method");
        assert_eq!(json["line"], 7);
        assert_eq!(json["file"], "a.blade.php");
    }
}
