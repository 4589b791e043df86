//! Plugin trait for the rule/sheet processing pipeline.
//!
//! A plugin implements any subset of the lifecycle hooks. Every hook has a
//! no-op default, so a plugin that overrides nothing is legal and simply
//! never changes anything. Hooks communicate by mutating what they are
//! handed; none of them returns a value beyond success or failure.
//!
//! | Hook | Mutation target |
//! |---|---|
//! | `on_create_rule` | style and options, before the rule exists |
//! | `on_process_rule` | the constructed rule |
//! | `on_process_sheet` | the sheet, after all its rules are processed |
//! | `on_change_value` | the value about to be written into a rule |

use std::any::Any;
use std::fmt::Debug;

use serde_json::Value;

use crate::error::PluginResult;
use crate::rule::{Rule, RuleOptions, Style};
use crate::sheet::StyleSheet;

/// A capability object hooking into rule and sheet processing.
///
/// # Example
///
/// ```rust
/// use jss::{Plugin, PluginResult, Rule};
/// use std::any::Any;
///
/// #[derive(Debug)]
/// struct Important;
///
/// impl Plugin for Important {
///     fn name(&self) -> &str {
///         "important"
///     }
///
///     fn on_process_rule(&self, rule: &mut Rule) -> PluginResult<()> {
///         rule.set_data("important", true);
///         Ok(())
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Plugin: Send + Sync + Debug {
    /// Returns the name of this plugin, used in errors and logs.
    fn name(&self) -> &str;

    /// Runs before a rule is constructed.
    fn on_create_rule(
        &self,
        _name: Option<&str>,
        _style: &mut Style,
        _options: &mut RuleOptions,
    ) -> PluginResult<()> {
        Ok(())
    }

    /// Runs on every constructed rule, standalone or sheet-owned.
    fn on_process_rule(&self, _rule: &mut Rule) -> PluginResult<()> {
        Ok(())
    }

    /// Runs once per sheet after its rules are processed.
    fn on_process_sheet(&self, _sheet: &mut StyleSheet) -> PluginResult<()> {
        Ok(())
    }

    /// Runs before `value` is written to `prop` of `rule`.
    fn on_change_value(&self, _value: &mut Value, _prop: &str, _rule: &Rule) -> PluginResult<()> {
        Ok(())
    }

    /// Downcast to concrete type for advanced usage.
    fn as_any(&self) -> &dyn Any;
}

/// Extension trait for plugin type checking.
pub trait PluginExt: Plugin {
    /// Check if this plugin is of type T.
    fn is<T: Plugin + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to type T.
    fn downcast_ref<T: Plugin + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl<P: Plugin + ?Sized> PluginExt for P {}
