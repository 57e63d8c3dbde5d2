//! Check configuration.
//!
//! Every piece of framework vocabulary the pipeline matches against lives
//! here as data: directory conventions, the directive vocabulary, the sentinel
//! handle and the lifecycle deny-list. Defaults target Laravel Livewire.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FuseError, Result};

/// Config file looked up at the application root when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "fuse.json";

// ═══════════════════════════════════════════════════════════════════════════════
// DENY-LIST
// ═══════════════════════════════════════════════════════════════════════════════

/// Framework lifecycle hooks, data-mutation hooks and validation helpers that
/// are public on every component but never meant to be bound from a template.
pub const BUILTIN_METHODS: &[&str] = &[
    "mount",
    "render",
    "hydrate",
    "dehydrate",
    "boot",
    "booted",
    "updating",
    "updated",
    "updatingFoo",
    "updatedFoo",
    "dispatchBrowserEvent",
    "emit",
    "emitTo",
    "emitSelf",
    "emitUp",
    "redirect",
    "redirectRoute",
    "redirectAction",
    "validate",
    "validateOnly",
    "resetValidation",
    "resetErrorBag",
    "addError",
    "getErrorBag",
    "setErrorBag",
    "skipRender",
    "forgetComputed",
    "getId",
    "getName",
    "getComponentClass",
    "getFreshInstance",
    "getQueryString",
    "getPublicPropertiesDefinedBySubClass",
    "getProtectedOrPrivatePropertiesDefinedBySubClass",
    "getDataWithoutPublicProperties",
    "getPublicPropertiesExceptComputedOnes",
    "getComputedProperties",
    "getComputedPropertyValue",
];

/// PHP magic methods.
pub const MAGIC_METHODS: &[&str] = &[
    "__construct",
    "__destruct",
    "__call",
    "__callStatic",
    "__get",
    "__set",
    "__isset",
    "__unset",
    "__sleep",
    "__wakeup",
    "__serialize",
    "__unserialize",
    "__toString",
    "__invoke",
    "__set_state",
    "__clone",
    "__debugInfo",
];

/// Public methods every component inherits from the framework base class and
/// its stock traits (`WithPagination`, `WithFileUploads`). Those sources are
/// never on disk in the application, so they are listed here.
pub const FRAMEWORK_METHODS: &[&str] = &[
    "reset",
    "resetExcept",
    "only",
    "all",
    "fill",
    "pull",
    "js",
    "stream",
    "dispatch",
    "redirectIntended",
    "nextPage",
    "previousPage",
    "gotoPage",
    "setPage",
    "resetPage",
    "getPage",
    "startUpload",
    "finishUpload",
    "uploadErrored",
    "removeUpload",
    "cancelUpload",
];

/// Methods of the client-side `$wire` handle itself. Calling them from a
/// template never dispatches to a server-side method of the same name.
pub const CLIENT_METHODS: &[&str] = &[
    "entangle",
    "call",
    "set",
    "get",
    "toggle",
    "on",
    "dispatch",
    "dispatchTo",
    "dispatchSelf",
    "dispatchUp",
    "watch",
    "upload",
    "uploadMultiple",
    "removeUpload",
    "refresh",
];

const METHOD_DIRECTIVES: &[&str] = &[
    "click",
    "submit",
    "keydown",
    "keyup",
    "mousedown",
    "mouseup",
    "contextmenu",
    "touchstart",
    "touchend",
    "touchmove",
    "scroll",
    "resize",
    "load",
];

const PROPERTY_DIRECTIVES: &[&str] = &[
    "model",
    "change",
    "input",
    "blur",
    "focus",
    "mouseenter",
    "mouseleave",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Exact, case-sensitive set of method names excluded from a component's
/// public API.
#[derive(Debug, Clone, Default)]
pub struct MethodDenyList {
    names: HashSet<String>,
}

impl MethodDenyList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHECK CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckConfig {
    /// Component source roots, relative to the application root, in
    /// discovery order.
    pub component_dirs: Vec<PathBuf>,
    /// Component source file extension (without the dot).
    pub component_extension: String,
    /// Views root, relative to the application root.
    pub views_dir: PathBuf,
    /// Folder under the views root holding component templates.
    pub views_group: String,
    /// Template file extension (without the leading dot).
    pub template_extension: String,
    /// Namespace segment after which nested component namespaces map to
    /// nested view folders.
    pub namespace_anchor: String,
    /// Fully qualified base type every component must descend from.
    pub component_marker: String,
    pub directive_prefix: String,
    /// Reserved identifier for the live component handle in inline scripts.
    pub sentinel: String,
    pub method_directives: Vec<String>,
    pub property_directives: Vec<String>,
    /// Added to the built-in deny-list.
    pub ignored_methods: Vec<String>,
    pub client_methods: Vec<String>,
    /// Public methods of the framework base class, added to every component.
    pub framework_methods: Vec<String>,
    /// Run per-component chains on the rayon pool.
    pub parallel: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            component_dirs: vec![
                PathBuf::from("app/Livewire"),
                PathBuf::from("app/Http/Livewire"),
            ],
            component_extension: "php".to_string(),
            views_dir: PathBuf::from("resources/views"),
            views_group: "livewire".to_string(),
            template_extension: "blade.php".to_string(),
            namespace_anchor: "Livewire".to_string(),
            component_marker: "Livewire\\Component".to_string(),
            directive_prefix: "wire:".to_string(),
            sentinel: "$wire".to_string(),
            method_directives: strings(METHOD_DIRECTIVES),
            property_directives: strings(PROPERTY_DIRECTIVES),
            ignored_methods: Vec::new(),
            client_methods: strings(CLIENT_METHODS),
            framework_methods: strings(FRAMEWORK_METHODS),
            parallel: false,
        }
    }
}

impl CheckConfig {
    /// Load `path` if given, otherwise `<root>/fuse.json` when present,
    /// otherwise the defaults.
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let candidate = root.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let data = fs::read_to_string(&path).map_err(|e| FuseError::io(&path, e))?;
        Self::from_json(&data).map_err(|source| FuseError::Config { path, source })
    }

    pub fn from_json(data: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Built-in hooks, magic methods and user additions.
    pub fn deny_list(&self) -> MethodDenyList {
        MethodDenyList::new(
            BUILTIN_METHODS
                .iter()
                .chain(MAGIC_METHODS.iter())
                .map(|s| s.to_string())
                .chain(self.ignored_methods.iter().cloned()),
        )
    }

    /// Extractor vocabulary: method directives first, then property
    /// directives, each without the prefix.
    pub fn directives(&self) -> impl Iterator<Item = &str> {
        self.method_directives
            .iter()
            .chain(self.property_directives.iter())
            .map(String::as_str)
    }

    /// `wire:click` style kind for a bare directive name.
    pub fn directive_kind(&self, name: &str) -> String {
        format!("{}{}", self.directive_prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_directive_vocabulary() {
        let config = CheckConfig::default();
        assert_eq!(config.directives().count(), 20);
        assert!(config.method_directives.contains(&"click".to_string()));
        assert!(config.property_directives.contains(&"model".to_string()));

        let methods: HashSet<_> = config.method_directives.iter().collect();
        assert!(
            config.property_directives.iter().all(|d| !methods.contains(d)),
            "directive lists must be disjoint"
        );
    }

    #[test]
    fn test_deny_list_includes_hooks_magic_and_extras() {
        let config = CheckConfig {
            ignored_methods: vec!["placeholder".to_string()],
            ..Default::default()
        };
        let deny = config.deny_list();
        assert!(deny.contains("mount"));
        assert!(deny.contains("render"));
        assert!(deny.contains("__construct"));
        assert!(deny.contains("__toString"));
        assert!(deny.contains("placeholder"));
        assert!(!deny.contains("save"));
        // Case-sensitive
        assert!(!deny.contains("Mount"));
    }

    #[test]
    fn test_framework_methods_are_not_denied() {
        let config = CheckConfig::default();
        let deny = config.deny_list();
        assert!(config.framework_methods.contains(&"reset".to_string()));
        assert!(config.framework_methods.contains(&"resetPage".to_string()));
        assert!(config.framework_methods.iter().all(|m| !deny.contains(m)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CheckConfig::from_json(
            r#"{ "viewsDir": "views", "ignoredMethods": ["rules"], "parallel": true }"#,
        )
        .unwrap();
        assert_eq!(config.views_dir, PathBuf::from("views"));
        assert_eq!(config.ignored_methods, vec!["rules".to_string()]);
        assert!(config.parallel);
        assert_eq!(config.sentinel, "$wire");
        assert_eq!(config.component_dirs.len(), 2);
    }

    #[test]
    fn test_load_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CheckConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.views_group, "livewire");
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{ not json").unwrap();
        let err = CheckConfig::load(dir.path(), None).unwrap_err();
        assert!(matches!(err, FuseError::Config { .. }));
    }

    #[test]
    fn test_load_explicit_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CheckConfig::load(dir.path(), Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, FuseError::Io { .. }));
    }
}
