//! Registry of plugins and hook dispatch.
//!
//! The `PluginsRegistry` keeps plugins in registration order and fans every
//! lifecycle hook out to all of them, first-registered-first-invoked.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{JssError, JssResult, PluginResult};
use crate::plugin::Plugin;
use crate::rule::{Rule, RuleOptions, Style};
use crate::sheet::StyleSheet;

/// An ordered collection of plugins.
///
/// Registration is unconditional: the same plugin registered twice runs
/// twice. Dispatch stops at the first failing plugin and returns its error;
/// mutations made by earlier plugins are kept.
///
/// # Example
///
/// ```rust
/// use jss::{Plugin, PluginsRegistry};
/// use std::any::Any;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Noop;
///
/// impl Plugin for Noop {
///     fn name(&self) -> &str { "noop" }
///     fn as_any(&self) -> &dyn Any { self }
/// }
///
/// let mut registry = PluginsRegistry::new();
/// registry.use_plugin(Arc::new(Noop));
///
/// assert_eq!(registry.names(), vec!["noop"]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct PluginsRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginsRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Append a plugin.
    pub fn use_plugin(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
        tracing::debug!(plugin = plugin.name(), position = self.plugins.len(), "registered plugin");
        self.plugins.push(plugin);
        self
    }

    /// Dispatch `on_create_rule` to every plugin.
    pub fn on_create_rule(
        &self,
        name: Option<&str>,
        style: &mut Style,
        options: &mut RuleOptions,
    ) -> JssResult<()> {
        self.dispatch("on_create_rule", |plugin| {
            plugin.on_create_rule(name, style, options)
        })
    }

    /// Dispatch `on_process_rule` to every plugin.
    pub fn on_process_rule(&self, rule: &mut Rule) -> JssResult<()> {
        self.dispatch("on_process_rule", |plugin| plugin.on_process_rule(rule))
    }

    /// Dispatch `on_process_sheet` to every plugin.
    pub fn on_process_sheet(&self, sheet: &mut StyleSheet) -> JssResult<()> {
        self.dispatch("on_process_sheet", |plugin| plugin.on_process_sheet(sheet))
    }

    /// Dispatch `on_change_value` to every plugin.
    pub fn on_change_value(&self, value: &mut Value, prop: &str, rule: &Rule) -> JssResult<()> {
        self.dispatch("on_change_value", |plugin| {
            plugin.on_change_value(value, prop, rule)
        })
    }

    fn dispatch<F>(&self, hook: &'static str, mut call: F) -> JssResult<()>
    where
        F: FnMut(&dyn Plugin) -> PluginResult<()>,
    {
        for plugin in &self.plugins {
            tracing::trace!(plugin = plugin.name(), hook, "dispatching hook");
            call(plugin.as_ref()).map_err(|source| JssError::Plugin {
                plugin: plugin.name().to_string(),
                hook,
                source,
            })?;
        }
        Ok(())
    }

    /// Get the names of all registered plugins, in order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Get the number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Iterate over all plugins in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.plugins.iter()
    }
}

/// Builder for creating plugin registries with fluent API.
#[derive(Debug, Default)]
pub struct PluginsRegistryBuilder {
    registry: PluginsRegistry,
}

impl PluginsRegistryBuilder {
    /// Create a new registry builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin to the registry.
    pub fn with(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.registry.use_plugin(plugin);
        self
    }

    /// Build the registry.
    pub fn build(self) -> PluginsRegistry {
        self.registry
    }
}
