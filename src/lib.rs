//! # Fuse: Livewire Binding Checks
//!
//! Verifies that every `wire:*` directive and `$wire.*` expression in a Blade
//! template names a public member that exists on the Livewire component
//! rendering it.
//!
//! ## Pipeline
//!
//! 1. **Discovery**: every `.php` file under the component roots.
//! 2. **Introspection**: public, non-static properties and methods, read
//!    statically from source, including those of indexed ancestors and used
//!    traits. Lifecycle hooks and magic methods are excluded. Classes that do
//!    not descend from `Livewire\Component` get an empty API.
//! 3. **Location**: `resources/views/livewire/<kebab-name>.blade.php` and its
//!    siblings, deduplicated.
//! 4. **Extraction**: directive attributes and sentinel expressions, line by
//!    line.
//! 5. **Validation**: method targets by exact name, property targets by root
//!    segment only (`user.name` checks `user`).
//!
//! ## Leniency
//!
//! Only two findings exist: `Missing Method` and `Missing Property`. Missing
//! directories, absent templates, unreadable files and unparsable classes
//! are skipped. One bad file never stops the scan of the others.

mod check;
mod component;
mod config;
mod discovery;
mod error;
mod locate;
mod parse;
mod php;
mod validate;


#[cfg(feature = "napi")]
pub use check::check_wire_bindings_native;
pub use check::{check_app, CheckReport, Checker};
pub use component::{
    Ancestry, ClassIndex, Component, ComponentApi, ComponentIdentity, ComponentIntrospector,
};
pub use config::{CheckConfig, MethodDenyList, DEFAULT_CONFIG_FILE};
pub use discovery::discover_components;
pub use error::{FuseError, Result};
pub use locate::{kebab_case, TemplateLocator};
pub use parse::{BindingExtractor, BindingReference, ReferenceKind, SpanSet};
pub use validate::{ErrorKind, ErrorRecord, Lookup, Validator};
