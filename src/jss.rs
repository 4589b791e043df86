//! The engine: plugin setup plus rule and sheet factories.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::{JssConfig, JssOptions, MergeableOptions};
use crate::error::{JssError, JssResult};
use crate::plugin::Plugin;
use crate::plugins::internal_plugins;
use crate::registry::PluginsRegistry;
use crate::renderer::{DefaultRendererResolver, RendererResolver};
use crate::rule::{Rule, RuleOptions, Style};
use crate::sheet::{SheetId, SheetOptions, StyleSheet};
use crate::sheets::{sheets, SheetsRegistry};

static JSS_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identity of an engine; the back-reference carried by rule and sheet options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JssId(u64);

impl JssId {
    fn next() -> Self {
        Self(JSS_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for JssId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "jss:{}", self.0)
    }
}

/// Create an engine registering into the process-wide sheets registry.
pub fn create(options: JssOptions) -> Jss {
    Jss::new(options)
}

/// Style engine owning one plugin pipeline and one configuration.
///
/// Internal plugins are installed at construction, before any plugin from
/// the options or from later [`use_plugin`](Jss::use_plugin) calls.
///
/// # Example
///
/// ```rust
/// use jss::{Jss, JssOptions, SheetOptions, SheetsRegistry};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let registry = Arc::new(SheetsRegistry::new());
/// let jss = Jss::with_sheets(JssOptions::new(), registry.clone());
///
/// let styles = json!({"button": {"color": "red"}}).as_object().cloned().unwrap();
/// let sheet = jss.create_style_sheet(styles, SheetOptions::new()).unwrap();
/// assert!(sheet.class_of("button").is_some());
/// assert_eq!(registry.len(), 1);
///
/// jss.remove_style_sheet(&sheet);
/// assert!(registry.is_empty());
/// ```
#[derive(Debug)]
pub struct Jss {
    id: JssId,
    plugins: PluginsRegistry,
    options: JssConfig,
    resolver: Arc<dyn RendererResolver>,
    sheets: Arc<SheetsRegistry>,
}

impl Jss {
    /// Create an engine registering into the process-wide sheets registry.
    pub fn new(options: JssOptions) -> Self {
        Self::with_sheets(options, sheets())
    }

    /// Create an engine registering into the given sheets registry.
    pub fn with_sheets(options: JssOptions, sheets: Arc<SheetsRegistry>) -> Self {
        let mut jss = Self {
            id: JssId::next(),
            plugins: PluginsRegistry::new(),
            options: JssConfig::default(),
            resolver: Arc::new(DefaultRendererResolver),
            sheets,
        };
        jss.use_plugins(internal_plugins());
        jss.setup(options);
        jss
    }

    /// Replace the renderer resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn RendererResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Crate version.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Unique engine id, carried by rule and sheet options.
    pub fn id(&self) -> JssId {
        self.id
    }

    /// Effective configuration.
    pub fn options(&self) -> &JssConfig {
        &self.options
    }

    /// Installed plugins, in dispatch order.
    pub fn plugins(&self) -> &PluginsRegistry {
        &self.plugins
    }

    /// Sheets registry this engine registers into.
    pub fn sheets(&self) -> &Arc<SheetsRegistry> {
        &self.sheets
    }

    /// Replace the configuration.
    ///
    /// A missing class-name generator resets to the default one. Plugins in
    /// the options are appended; plugins already installed stay.
    pub fn setup(&mut self, options: JssOptions) -> &mut Self {
        self.options = JssConfig::from_options(options);
        tracing::debug!(
            jss = %self.id,
            default_generator = self.options.uses_default_generator(),
            plugins = self.options.plugins.len(),
            "configured engine"
        );
        let plugins = self.options.plugins.clone();
        self.use_plugins(plugins)
    }

    /// Append a plugin after everything already installed.
    pub fn use_plugin(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
        self.plugins.use_plugin(plugin);
        self
    }

    /// Append plugins, in order, after everything already installed.
    pub fn use_plugins<I>(&mut self, plugins: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Plugin>>,
    {
        for plugin in plugins {
            self.plugins.use_plugin(plugin);
        }
        self
    }

    /// Create a named rule and run it through the plugin pipeline.
    pub fn create_rule(
        &self,
        name: impl Into<String>,
        style: Style,
        options: RuleOptions,
    ) -> JssResult<Rule> {
        self.build_rule(Some(name.into()), style, options)
    }

    /// Create a rule without a name, e.g. for inline styles.
    pub fn create_inline_rule(&self, style: Style, options: RuleOptions) -> JssResult<Rule> {
        self.build_rule(None, style, options)
    }

    fn build_rule(
        &self,
        name: Option<String>,
        mut style: Style,
        options: RuleOptions,
    ) -> JssResult<Rule> {
        let mut options = self.resolve_rule_options(options)?;
        self.plugins
            .on_create_rule(name.as_deref(), &mut style, &mut options)?;

        let mut rule = Rule::new(name, style, options);
        self.plugins.on_process_rule(&mut rule)?;

        tracing::trace!(
            jss = %self.id,
            name = rule.name().unwrap_or("<inline>"),
            class_name = rule.class_name().unwrap_or(""),
            "created rule"
        );
        Ok(rule)
    }

    /// Fill in engine defaults unless the caller already supplied both a
    /// renderer and a generator.
    ///
    /// Defaults are the engine id, the resolved renderer, the engine
    /// generator and the engine's pass-through keys; caller options win.
    fn resolve_rule_options(&self, options: RuleOptions) -> JssResult<RuleOptions> {
        // Hot path for sheet rules.
        if options.is_complete() {
            return Ok(options);
        }

        let renderer = self.resolver.find_renderer(&options)?;
        let mut effective = RuleOptions {
            jss: Some(self.id),
            renderer: Some(renderer),
            generate_class_name: Some(self.options.generate_class_name.clone()),
            extra: self.options.extra.clone(),
            ..Default::default()
        };
        effective.merge(&options);
        Ok(effective)
    }

    /// Create a sheet from `name -> style` entries and register it.
    ///
    /// Every entry becomes a rule through the same pipeline as
    /// [`create_rule`](Jss::create_rule); `on_process_sheet` runs once all
    /// rules exist. Entries whose value is not a mapping fail with
    /// [`JssError::InvalidStyle`].
    pub fn create_style_sheet(
        &self,
        styles: Map<String, Value>,
        options: SheetOptions,
    ) -> JssResult<Arc<StyleSheet>> {
        let mut sheet_options = SheetOptions {
            generate_class_name: Some(self.options.generate_class_name.clone()),
            extra: self.options.extra.clone(),
            ..Default::default()
        };
        sheet_options.merge(&options);
        sheet_options.jss = Some(self.id);

        let renderer = match &sheet_options.renderer {
            Some(renderer) => renderer.clone(),
            None => self
                .resolver
                .find_renderer(&sheet_options.to_rule_options())?,
        };
        let id = SheetId::next();

        let mut rule_options = sheet_options.to_rule_options();
        rule_options.renderer = Some(renderer.clone());
        rule_options.sheet = Some(id);

        let rules = styles
            .into_iter()
            .map(|(name, value)| match value {
                Value::Object(style) => self.build_rule(Some(name), style, rule_options.clone()),
                _ => Err(JssError::InvalidStyle(name)),
            })
            .collect::<JssResult<Vec<_>>>()?;

        let mut sheet = StyleSheet::new(id, sheet_options, renderer, rules);
        self.plugins.on_process_sheet(&mut sheet)?;
        sheet.set_registry(&self.sheets);

        let sheet = Arc::new(sheet);
        self.sheets.add(sheet.clone());
        tracing::debug!(
            jss = %self.id,
            sheet = %id,
            rules = sheet.rules().len(),
            renderer = sheet.renderer().name(),
            "created style sheet"
        );
        Ok(sheet)
    }

    /// Detach the sheet and remove it from the registry.
    ///
    /// The sheet leaves the registry it was created into, which is not
    /// necessarily this engine's one; sheets without a live registry handle
    /// are removed from this engine's registry.
    pub fn remove_style_sheet(&self, sheet: &StyleSheet) -> &Self {
        sheet.detach();
        let registry = sheet.registry().unwrap_or_else(|| self.sheets.clone());
        if registry.remove(sheet) {
            tracing::debug!(jss = %self.id, sheet = %sheet.id(), "removed style sheet");
        }
        self
    }

    /// Write `value` to `prop` of `rule` through `on_change_value`.
    ///
    /// A value that ends up `null` removes the property.
    pub fn set_rule_value(
        &self,
        rule: &mut Rule,
        prop: &str,
        value: impl Into<Value>,
    ) -> JssResult<()> {
        let mut value = value.into();
        self.plugins.on_change_value(&mut value, prop, rule)?;
        if value.is_null() {
            rule.remove(prop);
        } else {
            rule.set(prop, value);
        }
        Ok(())
    }
}

impl Default for Jss {
    fn default() -> Self {
        Self::new(JssOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_name::ClassNameGenerator;
    use crate::error::{PluginError, PluginResult, RendererError, RendererResult};
    use crate::plugins::NormalizeValues;
    use crate::renderer::{Renderer, VirtualRenderer};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::any::Any;
    use std::sync::atomic::AtomicUsize;

    fn style(value: Value) -> Style {
        value.as_object().cloned().unwrap_or_default()
    }

    fn isolated(options: JssOptions) -> Jss {
        Jss::with_sheets(options, Arc::new(SheetsRegistry::new()))
    }

    #[derive(Debug, Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl RendererResolver for CountingResolver {
        fn find_renderer(
            &self,
            options: &RuleOptions,
        ) -> RendererResult<Arc<dyn Renderer>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DefaultRendererResolver.find_renderer(options)
        }
    }

    #[derive(Debug)]
    struct NoRenderer;

    impl RendererResolver for NoRenderer {
        fn find_renderer(&self, _options: &RuleOptions) -> RendererResult<Arc<dyn Renderer>> {
            Err(RendererError::NotFound("no environment".to_string()))
        }
    }

    #[derive(Debug)]
    struct Tagger {
        name: &'static str,
        seen: Arc<Mutex<Vec<Option<Value>>>>,
    }

    impl Plugin for Tagger {
        fn name(&self) -> &str {
            self.name
        }

        fn on_process_rule(&self, rule: &mut Rule) -> PluginResult<()> {
            self.seen.lock().push(rule.data("foo").cloned());
            rule.set_data("foo", self.name);
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Renamer;

    impl Plugin for Renamer {
        fn name(&self) -> &str {
            "renamer"
        }

        fn on_create_rule(
            &self,
            _name: Option<&str>,
            style: &mut Style,
            options: &mut RuleOptions,
        ) -> PluginResult<()> {
            if let Some(value) = style.remove("colour") {
                style.insert("color".to_string(), value);
            }
            options.extra.insert("renamed".to_string(), json!(true));
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Veto;

    impl Plugin for Veto {
        fn name(&self) -> &str {
            "veto"
        }

        fn on_process_sheet(&self, _sheet: &mut StyleSheet) -> PluginResult<()> {
            Err(PluginError::Rejected("no sheets".to_string()))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_internal_plugins_installed_first() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut jss = isolated(JssOptions::new().with_plugin(Arc::new(Tagger {
            name: "from-setup",
            seen: seen.clone(),
        })));
        jss.use_plugin(Arc::new(Tagger {
            name: "from-use",
            seen,
        }));

        assert_eq!(
            jss.plugins().names(),
            vec!["normalize-values", "from-setup", "from-use"]
        );
        assert!(jss.plugins().iter().next().unwrap().as_any().is::<NormalizeValues>());
    }

    #[test]
    fn test_setup_is_additive_for_plugins() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let plugin: Arc<dyn Plugin> = Arc::new(Tagger {
            name: "p",
            seen,
        });
        let mut jss = isolated(JssOptions::new());

        jss.setup(JssOptions::new().with_plugin(plugin.clone()));
        jss.setup(JssOptions::new().with_plugin(plugin));
        jss.setup(JssOptions::new());

        assert_eq!(jss.plugins().names(), vec!["normalize-values", "p", "p"]);
    }

    #[test]
    fn test_setup_without_generator_resets_to_default() {
        let custom: Arc<dyn ClassNameGenerator> =
            Arc::new(|name: &str, _: &RuleOptions| format!("c-{}", name));
        let mut jss = isolated(JssOptions::new());

        jss.setup(JssOptions::new().with_shared_generate_class_name(custom.clone()));
        assert!(Arc::ptr_eq(&jss.options().generate_class_name, &custom));

        jss.setup(JssOptions::new());
        assert!(jss.options().uses_default_generator());
        jss.setup(JssOptions::new());
        assert!(jss.options().uses_default_generator());
    }

    #[test]
    fn test_inline_rule_has_no_name() {
        let jss = isolated(JssOptions::new());
        let rule = jss
            .create_inline_rule(style(json!({"color": "red"})), RuleOptions::new())
            .unwrap();

        assert!(rule.is_inline());
        assert_eq!(rule.class_name(), None);
        assert_eq!(rule.get("color"), Some(&json!("red")));
        assert_eq!(rule.options().jss, Some(jss.id()));
    }

    #[test]
    fn test_fast_path_skips_resolver() {
        let resolver = Arc::new(CountingResolver::default());
        let jss = isolated(JssOptions::new()).with_resolver(resolver.clone());
        let renderer: Arc<dyn Renderer> = Arc::new(VirtualRenderer);
        let generator: Arc<dyn ClassNameGenerator> =
            Arc::new(|name: &str, _: &RuleOptions| format!("g-{}", name));

        let rule = jss
            .create_rule(
                "a",
                style(json!({"color": "red"})),
                RuleOptions::new()
                    .with_renderer(renderer.clone())
                    .with_generate_class_name(generator.clone()),
            )
            .unwrap();

        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        assert!(Arc::ptr_eq(rule.options().renderer.as_ref().unwrap(), &renderer));
        assert!(Arc::ptr_eq(
            rule.options().generate_class_name.as_ref().unwrap(),
            &generator
        ));
        assert_eq!(rule.class_name(), Some("g-a"));
    }

    #[test]
    fn test_partial_options_merge_with_defaults() {
        let resolver = Arc::new(CountingResolver::default());
        let jss = isolated(JssOptions::new()).with_resolver(resolver.clone());
        let generator: Arc<dyn ClassNameGenerator> =
            Arc::new(|name: &str, _: &RuleOptions| format!("g-{}", name));

        let rule = jss
            .create_rule(
                "a",
                Style::new(),
                RuleOptions::new()
                    .with_generate_class_name(generator.clone())
                    .with_extra("link", true),
            )
            .unwrap();

        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert_eq!(rule.options().jss, Some(jss.id()));
        assert_eq!(rule.options().renderer.as_ref().unwrap().name(), "virtual");
        assert!(Arc::ptr_eq(
            rule.options().generate_class_name.as_ref().unwrap(),
            &generator
        ));
        assert_eq!(rule.options().extra["link"], json!(true));
    }

    #[test]
    fn test_resolution_error_propagates() {
        let jss = isolated(JssOptions::new()).with_resolver(Arc::new(NoRenderer));

        let err = jss.create_rule("a", Style::new(), RuleOptions::new()).unwrap_err();
        assert!(matches!(err, JssError::Renderer(RendererError::NotFound(_))));

        let err = jss
            .create_style_sheet(style(json!({"a": {}})), SheetOptions::new())
            .unwrap_err();
        assert!(matches!(err, JssError::Renderer(_)));
        assert!(jss.sheets().is_empty());
    }

    #[test]
    fn test_plugin_mutation_visible_to_later_plugins() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut jss = isolated(JssOptions::new());
        jss.use_plugin(Arc::new(Tagger {
            name: "p1",
            seen: seen.clone(),
        }))
        .use_plugin(Arc::new(Tagger {
            name: "p2",
            seen: seen.clone(),
        }));

        let rule = jss.create_rule("a", Style::new(), RuleOptions::new()).unwrap();

        assert_eq!(*seen.lock(), vec![None, Some(json!("p1"))]);
        assert_eq!(rule.data("foo"), Some(&json!("p2")));
    }

    #[test]
    fn test_on_create_rule_rewrites_inputs() {
        let mut jss = isolated(JssOptions::new());
        jss.use_plugin(Arc::new(Renamer));

        let rule = jss
            .create_rule("a", style(json!({"colour": "red"})), RuleOptions::new())
            .unwrap();

        assert_eq!(rule.get("color"), Some(&json!("red")));
        assert!(rule.get("colour").is_none());
        assert_eq!(rule.options().extra["renamed"], json!(true));
    }

    #[test]
    fn test_internal_plugin_normalizes_rules() {
        let jss = isolated(JssOptions::new());
        let rule = jss
            .create_rule("a", style(json!({"color": "red", "margin": null})), RuleOptions::new())
            .unwrap();

        assert!(rule.get("margin").is_none());
    }

    #[test]
    fn test_sheet_rules_go_through_pipeline() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut jss = isolated(JssOptions::new());
        jss.use_plugin(Arc::new(Tagger {
            name: "p",
            seen: seen.clone(),
        }));

        let sheet = jss
            .create_style_sheet(
                style(json!({"a": {"color": "red"}, "b": {"color": "blue"}})),
                SheetOptions::new().with_meta("Button"),
            )
            .unwrap();

        assert_eq!(seen.lock().len(), 2);
        let names: Vec<_> = sheet.rules().iter().filter_map(Rule::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        for rule in sheet.rules() {
            assert_eq!(rule.data("foo"), Some(&json!("p")));
            assert_eq!(rule.options().sheet, Some(sheet.id()));
            assert_eq!(rule.options().jss, Some(jss.id()));
        }
        assert!(sheet.class_of("a").unwrap().starts_with("Button-a-"));
    }

    #[test]
    fn test_sheet_options_injected() {
        let jss = isolated(JssOptions::new());
        let sheet = jss
            .create_style_sheet(Map::new(), SheetOptions::new().with_index(3))
            .unwrap();

        assert_eq!(sheet.options().jss, Some(jss.id()));
        assert_eq!(sheet.options().index, 3);
        assert!(Arc::ptr_eq(
            sheet.options().generate_class_name.as_ref().unwrap(),
            &jss.options().generate_class_name
        ));
    }

    #[test]
    fn test_invalid_sheet_entry() {
        let jss = isolated(JssOptions::new());
        let err = jss
            .create_style_sheet(style(json!({"a": "red"})), SheetOptions::new())
            .unwrap_err();

        assert!(matches!(err, JssError::InvalidStyle(name) if name == "a"));
        assert!(jss.sheets().is_empty());
    }

    #[test]
    fn test_failing_sheet_plugin_aborts_registration() {
        let mut jss = isolated(JssOptions::new());
        jss.use_plugin(Arc::new(Veto));

        let err = jss
            .create_style_sheet(style(json!({"a": {}})), SheetOptions::new())
            .unwrap_err();

        assert!(matches!(err, JssError::Plugin { hook: "on_process_sheet", .. }));
        assert!(jss.sheets().is_empty());
    }

    #[test]
    fn test_set_rule_value() {
        let jss = isolated(JssOptions::new());
        let mut rule = jss
            .create_rule("a", style(json!({"color": "red"})), RuleOptions::new())
            .unwrap();

        jss.set_rule_value(&mut rule, "color", "blue").unwrap();
        assert_eq!(rule.get("color"), Some(&json!("blue")));

        jss.set_rule_value(&mut rule, "color", false).unwrap();
        assert!(rule.get("color").is_none());
    }

    #[test]
    fn test_sheet_renderer_skips_resolver() {
        let jss = isolated(JssOptions::new()).with_resolver(Arc::new(NoRenderer));
        let renderer: Arc<dyn Renderer> = Arc::new(VirtualRenderer);

        let sheet = jss
            .create_style_sheet(
                style(json!({"a": {"color": "red"}})),
                SheetOptions::new().with_renderer(renderer.clone()),
            )
            .unwrap();

        assert!(Arc::ptr_eq(sheet.renderer(), &renderer));
        assert!(Arc::ptr_eq(
            sheet.rules()[0].options().renderer.as_ref().unwrap(),
            &renderer
        ));
        assert_eq!(jss.sheets().len(), 1);
    }

    #[test]
    fn test_sheet_renderer_resolved_once_when_absent() {
        let resolver = Arc::new(CountingResolver::default());
        let jss = isolated(JssOptions::new()).with_resolver(resolver.clone());

        jss.create_style_sheet(
            style(json!({"a": {}, "b": {}})),
            SheetOptions::new(),
        )
        .unwrap();
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);

        jss.create_style_sheet(
            style(json!({"a": {}})),
            SheetOptions::new().with_renderer(Arc::new(VirtualRenderer)),
        )
        .unwrap();
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_engine_extra_reaches_rules_and_sheets() {
        let jss = isolated(
            JssOptions::new()
                .with_extra("insertionPoint", "jss")
                .with_extra("link", false),
        );

        let rule = jss.create_rule("a", Style::new(), RuleOptions::new()).unwrap();
        assert_eq!(rule.options().extra["insertionPoint"], json!("jss"));

        let rule = jss
            .create_rule("a", Style::new(), RuleOptions::new().with_extra("link", true))
            .unwrap();
        assert_eq!(rule.options().extra["link"], json!(true));
        assert_eq!(rule.options().extra["insertionPoint"], json!("jss"));

        let sheet = jss
            .create_style_sheet(
                style(json!({"b": {}})),
                SheetOptions::new().with_extra("link", true),
            )
            .unwrap();
        assert_eq!(sheet.options().extra["insertionPoint"], json!("jss"));
        assert_eq!(sheet.options().extra["link"], json!(true));
        let rule = sheet.get_rule("b").unwrap();
        assert_eq!(rule.options().extra["insertionPoint"], json!("jss"));
        assert_eq!(rule.options().extra["link"], json!(true));
    }

    #[test]
    fn test_sheet_remembers_its_registry() {
        let jss = isolated(JssOptions::new());
        let sheet = jss.create_style_sheet(Map::new(), SheetOptions::new()).unwrap();

        assert!(Arc::ptr_eq(&sheet.registry().unwrap(), jss.sheets()));
    }

    #[test]
    fn test_engine_ids_are_unique() {
        assert_ne!(isolated(JssOptions::new()).id(), isolated(JssOptions::new()).id());
        assert!(!Jss::version().is_empty());
    }
}
