//! Engine configuration and option merging.
//!
//! [`JssOptions`] is what callers hand to [`Jss::setup`](crate::Jss::setup);
//! [`JssConfig`] is the effective record the engine keeps afterwards.
//! Rule and sheet options share the [`MergeableOptions`] contract so every
//! "defaults, then caller overrides" step merges the same way.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::class_name::{default_generator, ClassNameGenerator, DefaultClassNameGenerator};
use crate::plugin::Plugin;

/// Trait for option records that can be layered.
pub trait MergeableOptions {
    /// Merge another option record into this one.
    ///
    /// Values set in `overlay` override values in `self`; values left unset
    /// in `overlay` keep whatever `self` had.
    fn merge(&mut self, overlay: &Self);

    /// Create a new record by layering `overlay` on top of `base`.
    fn merged(base: &Self, overlay: &Self) -> Self
    where
        Self: Clone,
    {
        let mut result = base.clone();
        result.merge(overlay);
        result
    }
}

/// Merge extension keys, overlay keys winning.
pub(crate) fn merge_extra(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// Options accepted by [`Jss::new`](crate::Jss::new) and
/// [`Jss::setup`](crate::Jss::setup).
///
/// # Example
///
/// ```rust
/// use jss::JssOptions;
///
/// let options = JssOptions::new()
///     .with_generate_class_name(|name: &str, _: &jss::RuleOptions| format!("x-{}", name))
///     .with_extra("insertionPoint", "jss");
///
/// assert!(options.generate_class_name.is_some());
/// ```
#[derive(Clone, Default)]
pub struct JssOptions {
    /// Class-name generator; the built-in generator is used when absent
    pub generate_class_name: Option<Arc<dyn ClassNameGenerator>>,
    /// Plugins installed, in order, after the ones already registered
    pub plugins: Vec<Arc<dyn Plugin>>,
    /// Free-form keys passed through to renderers and rules
    pub extra: Map<String, Value>,
}

impl JssOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class-name generator.
    pub fn with_generate_class_name(mut self, generator: impl ClassNameGenerator + 'static) -> Self {
        self.generate_class_name = Some(Arc::new(generator));
        self
    }

    /// Set a shared class-name generator.
    pub fn with_shared_generate_class_name(mut self, generator: Arc<dyn ClassNameGenerator>) -> Self {
        self.generate_class_name = Some(generator);
        self
    }

    /// Append a plugin to install.
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Set a pass-through key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for JssOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JssOptions")
            .field("generate_class_name", &self.generate_class_name.is_some())
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("extra", &self.extra)
            .finish()
    }
}

/// Effective engine configuration.
///
/// Built from [`JssOptions`] by [`JssConfig::from_options`]; the class-name
/// generator is always concrete.
#[derive(Clone)]
pub struct JssConfig {
    /// Default generator for rules and sheets of this engine
    pub generate_class_name: Arc<dyn ClassNameGenerator>,
    /// Plugins that came with the options, as given
    pub plugins: Vec<Arc<dyn Plugin>>,
    /// Pass-through keys
    pub extra: Map<String, Value>,
}

impl JssConfig {
    /// Resolve caller options into an effective configuration.
    ///
    /// A missing generator always falls back to the shared default generator;
    /// nothing is inherited from a previous configuration.
    pub fn from_options(options: JssOptions) -> Self {
        let generate_class_name = options
            .generate_class_name
            .unwrap_or_else(default_generator);
        Self {
            generate_class_name,
            plugins: options.plugins,
            extra: options.extra,
        }
    }

    /// Returns whether the configured generator is the built-in one.
    pub fn uses_default_generator(&self) -> bool {
        self.generate_class_name
            .as_any()
            .is::<DefaultClassNameGenerator>()
    }
}

impl Default for JssConfig {
    fn default() -> Self {
        Self::from_options(JssOptions::default())
    }
}

impl fmt::Debug for JssConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JssConfig")
            .field("default_generator", &self.uses_default_generator())
            .field("plugins", &self.plugins.len())
            .field("extra", &self.extra)
            .finish()
    }
}
