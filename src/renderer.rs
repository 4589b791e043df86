//! Renderer contract and renderer resolution.
//!
//! A renderer turns a [`StyleSheet`] into some output representation; the
//! engine only ever attaches and detaches sheets through it. Which renderer
//! a rule or sheet gets is decided by a [`RendererResolver`].

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::RendererResult;
use crate::rule::RuleOptions;
use crate::sheet::StyleSheet;

/// Output backend for style sheets.
pub trait Renderer: Send + Sync + Debug {
    /// Returns the name of this renderer.
    fn name(&self) -> &str;

    /// Called when a sheet is attached.
    fn attach(&self, _sheet: &StyleSheet) {}

    /// Called when a sheet is detached.
    fn detach(&self, _sheet: &StyleSheet) {}

    /// Downcast to concrete type for advanced usage.
    fn as_any(&self) -> &dyn Any;
}

/// Renderer with no output target.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualRenderer;

impl Renderer for VirtualRenderer {
    fn name(&self) -> &str {
        "virtual"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Selects the renderer for a rule or sheet.
pub trait RendererResolver: Send + Sync + Debug {
    /// Resolve a renderer from possibly partial options.
    fn find_renderer(&self, options: &RuleOptions) -> RendererResult<Arc<dyn Renderer>>;
}

/// Uses the renderer already present in the options, else [`VirtualRenderer`].
#[derive(Debug, Default)]
pub struct DefaultRendererResolver;

impl RendererResolver for DefaultRendererResolver {
    fn find_renderer(&self, options: &RuleOptions) -> RendererResult<Arc<dyn Renderer>> {
        Ok(options
            .renderer
            .clone()
            .unwrap_or_else(|| Arc::new(VirtualRenderer)))
    }
}
