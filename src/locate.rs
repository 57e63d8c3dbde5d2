//! Template location.
//!
//! Maps a component identity to the template files that render it, using the
//! views-folder naming convention.
//!
//! The class-name transform is intentionally shallow: a hyphen is inserted
//! only where a lowercase letter is directly followed by an uppercase one.
//! Acronyms and digits get no boundary of their own (`HTMLParser` becomes
//! `htmlparser` and `Step2Form` becomes `step2form`), so such components will
//! not find a conventionally named template.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::component::ComponentIdentity;
use crate::config::CheckConfig;

lazy_static! {
    static ref CASE_BOUNDARY_RE: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
}

/// `UserProfile` → `user-profile`
pub fn kebab_case(name: &str) -> String {
    CASE_BOUNDARY_RE
        .replace_all(name, "$1-$2")
        .to_lowercase()
}

pub struct TemplateLocator {
    views_root: PathBuf,
    group: String,
    extension: String,
    anchor: String,
}

impl TemplateLocator {
    pub fn new(app_root: &Path, config: &CheckConfig) -> Self {
        Self {
            views_root: app_root.join(&config.views_dir),
            group: config.views_group.clone(),
            extension: config.template_extension.clone(),
            anchor: config.namespace_anchor.clone(),
        }
    }

    /// Kebab-cased namespace segments after the anchor segment, e.g.
    /// `App\Livewire\Admin\Reports` → `admin/reports`. Empty when the anchor
    /// is absent or last.
    fn nested_dir(&self, identity: &ComponentIdentity) -> PathBuf {
        let segments: Vec<&str> = identity.namespace_segments().collect();
        let start = segments
            .iter()
            .rposition(|s| s.eq_ignore_ascii_case(&self.anchor))
            .map(|i| i + 1)
            .unwrap_or(segments.len());

        segments[start..].iter().map(|s| kebab_case(s)).collect()
    }

    /// Every path checked for `identity`, in priority order, duplicates
    /// included.
    pub fn candidates(&self, identity: &ComponentIdentity) -> Vec<PathBuf> {
        let file = format!("{}.{}", kebab_case(&identity.name), self.extension);
        let group = self.views_root.join(&self.group);

        vec![
            group.join(&file),
            group.join(self.nested_dir(identity)).join(&file),
            self.views_root.join(&file),
        ]
    }

    /// Existing candidates, in priority order, each at most once.
    pub fn locate(&self, identity: &ComponentIdentity) -> Vec<PathBuf> {
        let mut templates: Vec<PathBuf> = Vec::new();
        for path in self.candidates(identity) {
            if path.is_file() && !templates.contains(&path) {
                templates.push(path);
            }
        }
        templates
    }
}
