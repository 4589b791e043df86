//! Plugins every engine installs before any user plugin.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;

use crate::error::PluginResult;
use crate::plugin::Plugin;
use crate::rule::Rule;

/// The internal bundle, in installation order.
pub fn internal_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![Arc::new(NormalizeValues)]
}

/// Drops properties whose value is `null` or `false`.
///
/// Applies to every processed rule and turns a `false` written through
/// [`Jss::set_rule_value`](crate::Jss::set_rule_value) into `null`, which
/// removes the property.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeValues;

fn is_empty_value(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(false))
}

impl Plugin for NormalizeValues {
    fn name(&self) -> &str {
        "normalize-values"
    }

    fn on_process_rule(&self, rule: &mut Rule) -> PluginResult<()> {
        rule.style_mut().retain(|_, value| !is_empty_value(value));
        Ok(())
    }

    fn on_change_value(&self, value: &mut Value, _prop: &str, _rule: &Rule) -> PluginResult<()> {
        if is_empty_value(value) {
            *value = Value::Null;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
