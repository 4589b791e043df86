//! Class-name generation for named rules.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::rule::RuleOptions;

static DEFAULT_GENERATOR: Lazy<Arc<DefaultClassNameGenerator>> =
    Lazy::new(|| Arc::new(DefaultClassNameGenerator::new()));

/// The process-wide default generator.
///
/// Every engine falling back to the built-in generator shares this one, so
/// class names stay unique across engines and `setup` calls.
pub fn default_generator() -> Arc<dyn ClassNameGenerator> {
    DEFAULT_GENERATOR.clone()
}

/// Produces the class identifier for a named rule.
///
/// Any `Fn(&str, &RuleOptions) -> String` closure is a generator.
///
/// # Example
///
/// ```rust
/// use jss::{ClassNameGenerator, RuleOptions};
///
/// let generator = |name: &str, _: &RuleOptions| format!("app-{}", name);
/// assert_eq!(generator.generate("button", &RuleOptions::default()), "app-button");
/// ```
pub trait ClassNameGenerator: Send + Sync {
    /// Generate a class name for the rule called `rule_name`.
    fn generate(&self, rule_name: &str, options: &RuleOptions) -> String;

    /// Downcast to concrete type for advanced usage.
    fn as_any(&self) -> &dyn Any;
}

impl<F> ClassNameGenerator for F
where
    F: Fn(&str, &RuleOptions) -> String + Send + Sync + 'static,
{
    fn generate(&self, rule_name: &str, options: &RuleOptions) -> String {
        self(rule_name, options)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Built-in generator: `{meta-}{name}-{n}` with a per-generator counter.
///
/// Engines without a custom generator share one instance, see
/// [`default_generator`].
#[derive(Debug, Default)]
pub struct DefaultClassNameGenerator {
    counter: AtomicU64,
}

impl DefaultClassNameGenerator {
    /// Create a generator with its own counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClassNameGenerator for DefaultClassNameGenerator {
    fn generate(&self, rule_name: &str, options: &RuleOptions) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        match options.meta.as_deref() {
            Some(meta) if !meta.is_empty() => format!("{}-{}-{}", meta, rule_name, n),
            _ => format!("{}-{}", rule_name, n),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for dyn ClassNameGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(default) = self.as_any().downcast_ref::<DefaultClassNameGenerator>() {
            fmt::Debug::fmt(default, f)
        } else {
            f.write_str("ClassNameGenerator")
        }
    }
}
