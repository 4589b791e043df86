//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use jss::prelude::*;
//! ```

// Engine and configuration
pub use crate::config::{JssConfig, JssOptions, MergeableOptions};
pub use crate::jss::{create, Jss, JssId};

// Plugins
pub use crate::plugin::{Plugin, PluginExt};
pub use crate::registry::{PluginsRegistry, PluginsRegistryBuilder};

// Rules and sheets
pub use crate::class_name::{ClassNameGenerator, DefaultClassNameGenerator};
pub use crate::renderer::{DefaultRendererResolver, Renderer, RendererResolver, VirtualRenderer};
pub use crate::rule::{Rule, RuleOptions, Style};
pub use crate::sheet::{SheetId, SheetOptions, StyleSheet};
pub use crate::sheets::{sheets, SheetEvent, SheetsRegistry};

// Errors
pub use crate::error::{
    JssError, JssResult, PluginError, PluginResult, RendererError, RendererResult,
};
