//! Component Introspection
//!
//! Builds a component's public, non-lifecycle API from its source file.
//! Every discovered file is declaration-parsed once into a [`ClassIndex`],
//! which stands in for a runtime type loader: ancestry is walked through it
//! to decide component-ness, and public members are collected from indexed
//! ancestors and the traits they use. Members the framework base class
//! provides come from configuration. Any failure degrades to an empty API.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{CheckConfig, MethodDenyList};
use crate::error::{FuseError, Result};
use crate::php::parse_declarations;

lazy_static! {
    /// First declared namespace, plain or braced.
    static ref NAMESPACE_RE: Regex = Regex::new(r"\bnamespace\s+([\w\\]+)\s*[;{]").unwrap();

    /// First declared class name.
    static ref CLASS_RE: Regex = Regex::new(r"\bclass\s+(\w+)").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT MODEL
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentIdentity {
    pub namespace: String,
    pub name: String,
}

impl ComponentIdentity {
    /// Minimal textual scan: the first `namespace` and the first `class`
    /// occurrence. Both must be present.
    pub fn from_source(source: &str) -> Option<Self> {
        let namespace = NAMESPACE_RE.captures(source)?.get(1)?.as_str();
        let name = CLASS_RE.captures(source)?.get(1)?.as_str();
        Some(Self {
            namespace: namespace.trim_start_matches('\\').to_string(),
            name: name.to_string(),
        })
    }

    pub fn fqn(&self) -> String {
        format!("{}\\{}", self.namespace, self.name)
    }

    pub fn namespace_segments(&self) -> impl Iterator<Item = &str> {
        self.namespace.split('\\').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.namespace, self.name)
    }
}

/// Public surface a template may bind to. Names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentApi {
    pub properties: BTreeSet<String>,
    pub methods: BTreeSet<String>,
}

impl ComponentApi {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.methods.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ancestry {
    Component,
    NotAComponent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub path: PathBuf,
    pub identity: Option<ComponentIdentity>,
    /// `None` when the declaration could not be read or parsed.
    pub ancestry: Option<Ancestry>,
    pub api: ComponentApi,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASS INDEX
// ═══════════════════════════════════════════════════════════════════════════════

/// A parsed class or trait with every name resolved to its fully qualified
/// form.
#[derive(Debug, Clone)]
pub struct IndexedClass {
    pub fqn: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    pub properties: Vec<String>,
    pub methods: Vec<String>,
}

fn class_key(fqn: &str) -> String {
    fqn.trim_start_matches('\\').to_ascii_lowercase()
}

#[derive(Debug, Default)]
pub struct ClassIndex {
    classes: HashMap<String, IndexedClass>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every file; unreadable or unparsable files are logged and left
    /// out.
    pub fn build(paths: &[PathBuf]) -> Self {
        let mut index = Self::new();
        for path in paths {
            let result = fs::read_to_string(path)
                .map_err(|e| FuseError::io(path, e))
                .and_then(|source| index.insert_source(path, &source));
            if let Err(e) = result {
                debug!(error = %e, "class declarations unavailable");
            }
        }
        index
    }

    /// Index every class and trait declared in `source`. The first
    /// declaration of a fully qualified name wins.
    pub fn insert_source(&mut self, path: &Path, source: &str) -> Result<()> {
        let decls = parse_declarations(source).map_err(|m| FuseError::parse(path, m))?;

        for class in decls.classes.iter().chain(decls.traits.iter()) {
            let fqn = match &decls.namespace {
                Some(ns) => format!("{}\\{}", ns, class.name),
                None => class.name.clone(),
            };
            let indexed = IndexedClass {
                parent: class.parent.as_deref().map(|p| decls.resolve(p)),
                interfaces: class.interfaces.iter().map(|i| decls.resolve(i)).collect(),
                traits: class.traits.iter().map(|t| decls.resolve(t)).collect(),
                properties: class.properties.clone(),
                methods: class.methods.clone(),
                fqn,
            };
            self.classes.entry(class_key(&indexed.fqn)).or_insert(indexed);
        }

        Ok(())
    }

    pub fn get(&self, fqn: &str) -> Option<&IndexedClass> {
        self.classes.get(&class_key(fqn))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The class followed by each indexed ancestor, nearest first. Stops at
    /// the first ancestor outside the index or on a cycle.
    pub fn lineage(&self, fqn: &str) -> Vec<&IndexedClass> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.get(fqn);

        while let Some(class) = current {
            if !visited.insert(class_key(&class.fqn)) {
                break;
            }
            chain.push(class);
            current = class.parent.as_deref().and_then(|p| self.get(p));
        }

        chain
    }

    /// Traits used by `class`, including traits used by those traits, in
    /// `use` order. Traits outside the index are skipped.
    pub fn traits_of<'a>(&'a self, class: &'a IndexedClass) -> Vec<&'a IndexedClass> {
        let mut found = Vec::new();
        let mut visited = HashSet::new();
        let mut pending: Vec<&str> = class.traits.iter().rev().map(String::as_str).collect();

        while let Some(name) = pending.pop() {
            if !visited.insert(class_key(name)) {
                continue;
            }
            match self.get(name) {
                Some(used) => {
                    found.push(used);
                    pending.extend(used.traits.iter().rev().map(String::as_str));
                }
                None => debug!(class = %class.fqn, used = name, "used trait not indexed"),
            }
        }

        found
    }

    /// Walk the `extends` chain looking for `marker`. A class listing the
    /// marker among its interfaces also counts.
    pub fn ancestry(&self, fqn: &str, marker: &str) -> Ancestry {
        let marker = class_key(marker);
        for class in self.lineage(fqn) {
            let names_marker = class
                .parent
                .iter()
                .chain(class.interfaces.iter())
                .any(|name| class_key(name) == marker);
            if names_marker {
                return Ancestry::Component;
            }
        }
        Ancestry::NotAComponent
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INTROSPECTOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct ComponentIntrospector<'a> {
    index: &'a ClassIndex,
    marker: String,
    deny: MethodDenyList,
    framework_methods: Vec<String>,
}

impl<'a> ComponentIntrospector<'a> {
    pub fn new(index: &'a ClassIndex, config: &CheckConfig) -> Self {
        Self {
            index,
            marker: config.component_marker.clone(),
            deny: config.deny_list(),
            framework_methods: config.framework_methods.clone(),
        }
    }

    /// Never fails: unreadable files, files without an identity, failed
    /// parses and non-components all yield an empty API.
    pub fn introspect(&self, path: &Path) -> Component {
        let mut component = Component {
            path: path.to_path_buf(),
            identity: None,
            ancestry: None,
            api: ComponentApi::default(),
        };

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "component source unreadable");
                return component;
            }
        };

        let Some(identity) = ComponentIdentity::from_source(&source) else {
            debug!(path = %path.display(), "no namespace/class declaration found");
            return component;
        };

        match self.reflect(path, &identity) {
            Ok((ancestry, api)) => {
                component.ancestry = Some(ancestry);
                component.api = api;
            }
            Err(e) => debug!(component = %identity, error = %e, "introspection failed"),
        }

        component.identity = Some(identity);
        component
    }

    fn reflect(&self, path: &Path, identity: &ComponentIdentity) -> Result<(Ancestry, ComponentApi)> {
        let fqn = identity.fqn();
        if self.index.get(&fqn).is_none() {
            return Err(FuseError::parse(path, format!("class {} is not declared", fqn)));
        }

        let ancestry = self.index.ancestry(&fqn, &self.marker);
        if ancestry == Ancestry::NotAComponent {
            debug!(component = %identity, "not a component, skipping");
            return Ok((ancestry, ComponentApi::default()));
        }

        let mut api = ComponentApi::default();
        for class in self.index.lineage(&fqn) {
            for decl in std::iter::once(class).chain(self.index.traits_of(class)) {
                api.properties.extend(decl.properties.iter().cloned());
                api.methods.extend(self.exposed(&decl.methods));
            }
        }
        api.methods.extend(self.exposed(&self.framework_methods));

        Ok((ancestry, api))
    }

    fn exposed<'m>(&'m self, methods: &'m [String]) -> impl Iterator<Item = String> + 'm {
        methods
            .iter()
            .filter(|m| !self.deny.contains(m))
            .cloned()
    }
}
