//! Style sheets: ordered groups of rules sharing one renderer.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use serde_json::{Map, Value};

use crate::class_name::ClassNameGenerator;
use crate::config::{merge_extra, MergeableOptions};
use crate::jss::JssId;
use crate::renderer::Renderer;
use crate::rule::{Rule, RuleOptions};
use crate::sheets::SheetsRegistry;

static SHEET_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identity of a style sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(u64);

impl SheetId {
    pub(crate) fn next() -> Self {
        Self(SHEET_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet:{}", self.0)
    }
}

/// Options a sheet is constructed with.
#[derive(Debug, Clone, Default)]
pub struct SheetOptions {
    /// Engine that created the sheet
    pub jss: Option<JssId>,
    /// Generator used for every rule of the sheet
    pub generate_class_name: Option<Arc<dyn ClassNameGenerator>>,
    /// Renderer for the sheet; resolved when absent
    pub renderer: Option<Arc<dyn Renderer>>,
    /// Label forwarded to class-name generation
    pub meta: Option<String>,
    /// Position in the sheets registry; lower sorts first
    pub index: i32,
    /// Renderer- or rule-specific extension keys
    pub extra: Map<String, Value>,
}

impl SheetOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class-name generator.
    pub fn with_generate_class_name(mut self, generator: Arc<dyn ClassNameGenerator>) -> Self {
        self.generate_class_name = Some(generator);
        self
    }

    /// Set the renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Set the meta label.
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// Set the registry index.
    pub fn with_index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    /// Set a pass-through key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Options used to resolve the sheet renderer.
    pub(crate) fn to_rule_options(&self) -> RuleOptions {
        RuleOptions {
            jss: self.jss,
            renderer: self.renderer.clone(),
            generate_class_name: self.generate_class_name.clone(),
            selector: None,
            sheet: None,
            meta: self.meta.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl MergeableOptions for SheetOptions {
    fn merge(&mut self, overlay: &Self) {
        if overlay.jss.is_some() {
            self.jss = overlay.jss;
        }
        if let Some(generator) = &overlay.generate_class_name {
            self.generate_class_name = Some(generator.clone());
        }
        if let Some(renderer) = &overlay.renderer {
            self.renderer = Some(renderer.clone());
        }
        if let Some(meta) = &overlay.meta {
            self.meta = Some(meta.clone());
        }
        if overlay.index != 0 {
            self.index = overlay.index;
        }
        merge_extra(&mut self.extra, &overlay.extra);
    }
}

/// An ordered aggregate of rules.
///
/// Sheets are built by [`Jss::create_style_sheet`](crate::Jss::create_style_sheet),
/// which runs every rule through the plugin pipeline and registers the
/// sheet in a [`SheetsRegistry`](crate::SheetsRegistry).
#[derive(Debug)]
pub struct StyleSheet {
    id: SheetId,
    options: SheetOptions,
    renderer: Arc<dyn Renderer>,
    rules: Vec<Rule>,
    attached: AtomicBool,
    registry: Weak<SheetsRegistry>,
}

impl StyleSheet {
    pub(crate) fn new(
        id: SheetId,
        options: SheetOptions,
        renderer: Arc<dyn Renderer>,
        rules: Vec<Rule>,
    ) -> Self {
        Self {
            id,
            options,
            renderer,
            rules,
            attached: AtomicBool::new(false),
            registry: Weak::new(),
        }
    }

    /// Remember the registry the sheet is registered in.
    pub(crate) fn set_registry(&mut self, registry: &Arc<SheetsRegistry>) {
        self.registry = Arc::downgrade(registry);
    }

    /// Registry the sheet was created into, if it is still alive.
    pub fn registry(&self) -> Option<Arc<SheetsRegistry>> {
        self.registry.upgrade()
    }

    /// Unique sheet id.
    pub fn id(&self) -> SheetId {
        self.id
    }

    /// Effective options, engine defaults merged with the caller's.
    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    /// Renderer shared by every rule of the sheet.
    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Mutable rules, e.g. for `on_process_sheet` hooks.
    pub fn rules_mut(&mut self) -> &mut Vec<Rule> {
        &mut self.rules
    }

    /// Get a rule by name.
    pub fn get_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name() == Some(name))
    }

    /// Get a mutable rule by name.
    pub fn get_rule_mut(&mut self, name: &str) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|rule| rule.name() == Some(name))
    }

    /// Class name of the rule called `name`.
    pub fn class_of(&self, name: &str) -> Option<&str> {
        self.get_rule(name).and_then(Rule::class_name)
    }

    /// Rule name to class name, in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules
            .iter()
            .filter_map(|rule| Some((rule.name()?, rule.class_name()?)))
    }

    /// Hand the sheet to its renderer. No-op when already attached.
    pub fn attach(&self) -> &Self {
        if self
            .attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::debug!(sheet = %self.id, renderer = self.renderer.name(), "attached sheet");
            self.renderer.attach(self);
        }
        self
    }

    /// Take the sheet away from its renderer. No-op when not attached.
    pub fn detach(&self) -> &Self {
        if self
            .attached
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::debug!(sheet = %self.id, renderer = self.renderer.name(), "detached sheet");
            self.renderer.detach(self);
        }
        self
    }

    /// Returns whether the sheet is attached to its renderer.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}
