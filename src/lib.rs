//! # JSS
//!
//! **JSS** turns declarative style descriptions into managed rules and style
//! sheets, with every rule and sheet passing through an ordered plugin
//! pipeline.
//!
//! ## Overview
//!
//! - **Plugins** hook into rule creation, rule processing, sheet processing
//!   and value changes. They run in registration order and communicate by
//!   mutating what they are handed.
//! - **Rules** are named (with a generated class name) or inline.
//! - **Style sheets** group rules, share one renderer, and register
//!   themselves in a [`SheetsRegistry`].
//!
//! ## Pipeline
//!
//! ```text
//! Jss::create_rule
//!   -> resolve options (engine defaults + RendererResolver, unless complete)
//!   -> on_create_rule (style, options)
//!   -> Rule::new (class name, selector)
//!   -> on_process_rule (rule)
//!
//! Jss::create_style_sheet
//!   -> resolve sheet renderer
//!   -> create_rule pipeline for every entry
//!   -> on_process_sheet (sheet)
//!   -> SheetsRegistry::add
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use jss::prelude::*;
//! use serde_json::json;
//!
//! let jss = Jss::new(JssOptions::new());
//!
//! let style = json!({"color": "red"}).as_object().cloned().unwrap();
//! let rule = jss.create_rule("button", style, RuleOptions::new()).unwrap();
//! assert_eq!(rule.selector(), Some(format!(".{}", rule.class_name().unwrap()).as_str()));
//! ```

mod class_name;
mod config;
mod error;
mod jss;
mod plugin;
pub mod plugins;
mod registry;
mod renderer;
mod rule;
mod sheet;
mod sheets;
pub mod stream;

pub mod prelude;

pub use class_name::{default_generator, ClassNameGenerator, DefaultClassNameGenerator};
pub use config::{JssConfig, JssOptions, MergeableOptions};
pub use error::{
    JssError, JssResult, PluginError, PluginResult, RendererError, RendererResult,
};
pub use jss::{create, Jss, JssId};
pub use plugin::{Plugin, PluginExt};
pub use registry::{PluginsRegistry, PluginsRegistryBuilder};
pub use renderer::{DefaultRendererResolver, Renderer, RendererResolver, VirtualRenderer};
pub use rule::{Rule, RuleOptions, Style};
pub use sheet::{SheetId, SheetOptions, StyleSheet};
pub use sheets::{sheets, SheetEvent, SheetsRegistry};
pub use stream::EventStream;
