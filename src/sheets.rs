//! Registry of live style sheets.
//!
//! Every engine registers the sheets it creates here and deregisters them on
//! removal. A process-wide instance is available through [`sheets()`]; tests
//! and embedders that want isolation construct their own and hand it to
//! [`Jss::with_sheets`](crate::Jss::with_sheets).

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::sheet::{SheetId, StyleSheet};
use crate::stream::{create_stream, EventSender, EventStream, SendFailure, DEFAULT_BUFFER_SIZE};

static SHEETS: Lazy<Arc<SheetsRegistry>> = Lazy::new(|| Arc::new(SheetsRegistry::new()));

/// The process-wide sheets registry.
pub fn sheets() -> Arc<SheetsRegistry> {
    SHEETS.clone()
}

/// Membership change in a [`SheetsRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetEvent {
    Added(SheetId),
    Removed(SheetId),
}

#[derive(Debug, Default)]
struct Inner {
    sheets: Vec<Arc<StyleSheet>>,
    subscribers: Vec<EventSender<SheetEvent>>,
}

/// Set of live sheets, ordered by `options.index`.
///
/// Membership is by sheet identity. Adding a sheet twice or removing a sheet
/// that is not registered does nothing.
#[derive(Debug, Default)]
pub struct SheetsRegistry {
    inner: Mutex<Inner>,
}

impl SheetsRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sheet. Returns `false` if it was already registered.
    pub fn add(&self, sheet: Arc<StyleSheet>) -> bool {
        let mut inner = self.inner.lock();
        if inner.sheets.iter().any(|s| s.id() == sheet.id()) {
            return false;
        }

        let index = sheet.options().index;
        let position = inner
            .sheets
            .iter()
            .position(|s| s.options().index > index)
            .unwrap_or(inner.sheets.len());
        let id = sheet.id();
        inner.sheets.insert(position, sheet);
        tracing::debug!(sheet = %id, position, "registered sheet");

        Self::notify(&mut inner, SheetEvent::Added(id));
        true
    }

    /// Deregister a sheet. Returns `false` if it was not registered.
    pub fn remove(&self, sheet: &StyleSheet) -> bool {
        let mut inner = self.inner.lock();
        let Some(position) = inner.sheets.iter().position(|s| s.id() == sheet.id()) else {
            return false;
        };

        inner.sheets.remove(position);
        tracing::debug!(sheet = %sheet.id(), "deregistered sheet");

        Self::notify(&mut inner, SheetEvent::Removed(sheet.id()));
        true
    }

    /// Check if a sheet is registered.
    pub fn contains(&self, sheet: &StyleSheet) -> bool {
        self.inner.lock().sheets.iter().any(|s| s.id() == sheet.id())
    }

    /// Get a registered sheet by id.
    pub fn get(&self, id: SheetId) -> Option<Arc<StyleSheet>> {
        self.inner.lock().sheets.iter().find(|s| s.id() == id).cloned()
    }

    /// Snapshot of all registered sheets, in index order.
    pub fn sheets(&self) -> Vec<Arc<StyleSheet>> {
        self.inner.lock().sheets.clone()
    }

    /// Get the number of registered sheets.
    pub fn len(&self) -> usize {
        self.inner.lock().sheets.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().sheets.is_empty()
    }

    /// Drop every registered sheet without detaching it.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let removed: Vec<SheetId> = inner.sheets.drain(..).map(|s| s.id()).collect();
        tracing::debug!(count = removed.len(), "reset sheets registry");
        for id in removed {
            Self::notify(&mut inner, SheetEvent::Removed(id));
        }
    }

    /// Subscribe to membership changes from now on.
    pub fn subscribe(&self) -> EventStream<SheetEvent> {
        let (sender, stream) = create_stream(DEFAULT_BUFFER_SIZE);
        self.inner.lock().subscribers.push(sender);
        stream
    }

    fn notify(inner: &mut Inner, event: SheetEvent) {
        inner.subscribers.retain(|subscriber| match subscriber.try_send(event) {
            Ok(()) => true,
            Err(SendFailure::Full) => {
                tracing::debug!(?event, "subscriber lagging, dropped sheet event");
                true
            }
            Err(SendFailure::Closed) => false,
        });
    }
}
