//! Rules: the named or inline style unit produced by the engine.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::class_name::ClassNameGenerator;
use crate::config::{merge_extra, MergeableOptions};
use crate::jss::JssId;
use crate::renderer::Renderer;
use crate::sheet::SheetId;

/// Insertion-ordered mapping from property name to value.
pub type Style = Map<String, Value>;

/// Options a rule is constructed with.
#[derive(Debug, Clone, Default)]
pub struct RuleOptions {
    /// Engine the rule belongs to
    pub jss: Option<JssId>,
    /// Renderer resolved for the rule
    pub renderer: Option<Arc<dyn Renderer>>,
    /// Generator used for the rule's class name
    pub generate_class_name: Option<Arc<dyn ClassNameGenerator>>,
    /// Explicit selector, bypassing class-name generation
    pub selector: Option<String>,
    /// Owning sheet, if any
    pub sheet: Option<SheetId>,
    /// Sheet meta, forwarded to the class-name generator
    pub meta: Option<String>,
    /// Renderer- or rule-specific extension keys
    pub extra: Map<String, Value>,
}

impl RuleOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Set the class-name generator.
    pub fn with_generate_class_name(mut self, generator: Arc<dyn ClassNameGenerator>) -> Self {
        self.generate_class_name = Some(generator);
        self
    }

    /// Set an explicit selector.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Set a pass-through key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns whether both a renderer and a class-name generator are set.
    pub fn is_complete(&self) -> bool {
        self.renderer.is_some() && self.generate_class_name.is_some()
    }
}

impl MergeableOptions for RuleOptions {
    fn merge(&mut self, overlay: &Self) {
        if overlay.jss.is_some() {
            self.jss = overlay.jss;
        }
        if let Some(renderer) = &overlay.renderer {
            self.renderer = Some(renderer.clone());
        }
        if let Some(generator) = &overlay.generate_class_name {
            self.generate_class_name = Some(generator.clone());
        }
        if let Some(selector) = &overlay.selector {
            self.selector = Some(selector.clone());
        }
        if overlay.sheet.is_some() {
            self.sheet = overlay.sheet;
        }
        if let Some(meta) = &overlay.meta {
            self.meta = Some(meta.clone());
        }
        merge_extra(&mut self.extra, &overlay.extra);
    }
}

/// A named or inline style rule.
///
/// Named rules get a class name from their generator (unless an explicit
/// selector is given) and a `.class` selector. Inline rules have neither.
#[derive(Debug, Clone)]
pub struct Rule {
    name: Option<String>,
    style: Style,
    options: RuleOptions,
    class_name: Option<String>,
    selector: Option<String>,
    data: Map<String, Value>,
}

impl Rule {
    /// Construct a rule. Plugins are not run here.
    pub fn new(name: Option<String>, style: Style, options: RuleOptions) -> Self {
        let class_name = match (&name, &options.selector, &options.generate_class_name) {
            (Some(name), None, Some(generator)) => Some(generator.generate(name, &options)),
            _ => None,
        };
        let selector = options
            .selector
            .clone()
            .or_else(|| class_name.as_ref().map(|class| format!(".{}", class)));

        Self {
            name,
            style,
            options,
            class_name,
            selector,
            data: Map::new(),
        }
    }

    /// Rule name; `None` for inline rules.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns whether this rule has no name.
    pub fn is_inline(&self) -> bool {
        self.name.is_none()
    }

    /// Style properties in insertion order.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Mutable style properties; bypasses `on_change_value`.
    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    /// Options the rule was built with, as left by `on_create_rule`.
    pub fn options(&self) -> &RuleOptions {
        &self.options
    }

    /// Generated class name; `None` for inline rules and explicit selectors.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Selector, either explicit or `.{class_name}`.
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Replace the selector.
    pub fn set_selector(&mut self, selector: impl Into<String>) {
        self.selector = Some(selector.into());
    }

    /// Get a style property.
    pub fn get(&self, prop: &str) -> Option<&Value> {
        self.style.get(prop)
    }

    /// Set a style property without running `on_change_value`.
    ///
    /// Use [`Jss::set_rule_value`](crate::Jss::set_rule_value) to go through
    /// the plugin pipeline.
    pub fn set(&mut self, prop: impl Into<String>, value: impl Into<Value>) {
        self.style.insert(prop.into(), value.into());
    }

    /// Remove a style property.
    pub fn remove(&mut self, prop: &str) -> Option<Value> {
        self.style.remove(prop)
    }

    /// Plugin-attached data.
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Attach data for later plugins or the caller.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }
}
