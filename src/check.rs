//! Binding check pipeline.
//!
//! discovery → class index → per component: introspect → locate templates →
//! extract references → validate. Per-component chains share nothing
//! mutable, so they may run on the rayon pool; results are always merged in
//! discovery order.

#[cfg(feature = "napi")]
use napi_derive::napi;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

use crate::component::{ClassIndex, ComponentApi, ComponentIntrospector};
use crate::config::CheckConfig;
use crate::discovery::discover_components;
use crate::error::{FuseError, Result};
use crate::locate::TemplateLocator;
use crate::parse::BindingExtractor;
use crate::validate::{ErrorRecord, Validator};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// Discovery order → template priority order → appearance order.
    pub errors: Vec<ErrorRecord>,
    pub components: usize,
    pub templates: usize,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error list as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.errors).map_err(FuseError::Serialize)
    }
}

#[derive(Debug, Default)]
struct ComponentOutcome {
    templates: usize,
    errors: Vec<ErrorRecord>,
}

pub struct Checker {
    app_root: PathBuf,
    config: CheckConfig,
    locator: TemplateLocator,
    extractor: BindingExtractor,
    validator: Validator,
}

impl Checker {
    pub fn new(app_root: impl Into<PathBuf>, config: CheckConfig) -> Result<Self> {
        let app_root = app_root.into();
        Ok(Self {
            locator: TemplateLocator::new(&app_root, &config),
            extractor: BindingExtractor::new(&config)?,
            validator: Validator::new(&config),
            app_root,
            config,
        })
    }

    pub fn run(&self) -> CheckReport {
        let _span = info_span!("check", root = %self.app_root.display()).entered();

        let files = discover_components(&self.app_root, &self.config);
        let index = ClassIndex::build(&files);
        let introspector = ComponentIntrospector::new(&index, &self.config);
        if index.is_empty() && !files.is_empty() {
            warn!(files = files.len(), "no class declarations could be parsed");
        } else {
            debug!(files = files.len(), classes = index.len(), "indexed component sources");
        }

        let outcomes: Vec<ComponentOutcome> = if self.config.parallel {
            files
                .par_iter()
                .map(|path| self.check_component(&introspector, path))
                .collect()
        } else {
            files
                .iter()
                .map(|path| self.check_component(&introspector, path))
                .collect()
        };

        let mut report = CheckReport {
            components: files.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            report.templates += outcome.templates;
            report.errors.extend(outcome.errors);
        }

        info!(
            components = report.components,
            templates = report.templates,
            errors = report.errors.len(),
            "binding check finished"
        );
        report
    }

    fn check_component(&self, introspector: &ComponentIntrospector, path: &Path) -> ComponentOutcome {
        let component = introspector.introspect(path);
        let Some(identity) = &component.identity else {
            return ComponentOutcome::default();
        };

        let templates = self.locator.locate(identity);
        let mut outcome = ComponentOutcome {
            templates: templates.len(),
            errors: Vec::new(),
        };
        for template in &templates {
            outcome
                .errors
                .extend(self.check_template(template, &component.api));
        }
        outcome
    }

    /// Validate every reference in one template. An unreadable template
    /// contributes nothing.
    pub fn check_template(&self, template: &Path, api: &ComponentApi) -> Vec<ErrorRecord> {
        let references = match self.extractor.extract_file(template) {
            Ok(references) => references,
            Err(e) => {
                warn!(error = %e, "skipping unreadable template");
                return Vec::new();
            }
        };

        references
            .iter()
            .filter_map(|reference| self.validator.validate(reference, api))
            .collect()
    }
}

/// Load configuration for `app_root` and run the full check.
pub fn check_app(app_root: &Path, config_path: Option<&Path>) -> Result<CheckReport> {
    let config = CheckConfig::load(app_root, config_path)?;
    Ok(Checker::new(app_root, config)?.run())
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn check_wire_bindings_native(app_root: String) -> napi::Result<serde_json::Value> {
    let report = check_app(Path::new(&app_root), None)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_value(report).map_err(|e| napi::Error::from_reason(e.to_string()))
}
