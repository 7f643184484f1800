//! Ports to the external collaborators, plus in-memory implementations.
//!
//! The engine talks to the remote value store, the page template store and
//! the display through these traits only. The in-memory implementations back
//! the demo binary and every test; a hardware bridge supplies its own.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use cdu_types::{
    DatapointMetadata, DisplayColor, DisplayFrame, PageConfig, PageId, PageTemplates, Quality,
    RemoteError, RemoteValue, TemplateError, Value,
};

/// The remote value store: reads, writes and the per-address metadata cache.
pub trait RemoteStore {
    fn read(&self, address: &str) -> Result<RemoteValue, RemoteError>;
    fn write(&mut self, address: &str, value: Value) -> Result<(), RemoteError>;
    fn metadata(&self, address: &str) -> Option<DatapointMetadata>;
}

/// The page/line configuration provider.
pub trait PageStore {
    fn root(&self) -> &PageId;
    fn page(&self, id: &PageId) -> Option<&PageConfig>;
}

/// The display publisher.
pub trait DisplayPublisher {
    fn publish_line(&mut self, row: usize, text: &str, color: DisplayColor);
    fn publish_full(&mut self, frame: &DisplayFrame);
}

/// Caller-supplied confirm/cancel behavior for a dialog.
///
/// Injected per `show_*` call instead of captured closures, so the dialog
/// never holds ambient mutable state. An erring action is caught and logged;
/// the dialog still closes.
pub trait DialogAction {
    fn confirm(&mut self) -> anyhow::Result<()>;
    fn cancel(&mut self) -> anyhow::Result<()>;
}

/// Read-only value lookup handed to custom validation rules.
///
/// Reads that fail or come back with bad quality yield `None`; rules decide
/// for themselves whether that fails open or closed.
pub trait ValueAccessor {
    fn value(&self, address: &str) -> Option<Value>;
}

impl<R: RemoteStore> ValueAccessor for R {
    fn value(&self, address: &str) -> Option<Value> {
        match self.read(address) {
            Ok(RemoteValue {
                value,
                quality: Quality::Good,
            }) => Some(value),
            Ok(_) | Err(_) => None,
        }
    }
}

// ============================================================================
// In-memory implementations
// ============================================================================

#[derive(Debug, Clone)]
struct Point {
    value: Value,
    quality: Quality,
    meta: DatapointMetadata,
}

/// HashMap-backed remote store with failure injection for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    points: HashMap<String, Point>,
    failing_writes: HashSet<String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: impl Into<String>, value: Value, meta: DatapointMetadata) {
        self.points.insert(
            address.into(),
            Point {
                value,
                quality: Quality::Good,
                meta,
            },
        );
    }

    /// Make subsequent writes to `address` fail with `WriteRejected`.
    pub fn fail_writes_to(&mut self, address: impl Into<String>) {
        self.failing_writes.insert(address.into());
    }

    /// Mark the point's quality bad without touching its value.
    pub fn degrade(&mut self, address: &str) {
        if let Some(point) = self.points.get_mut(address) {
            point.quality = Quality::Bad;
        }
    }

    /// Current value, for assertions.
    #[must_use]
    pub fn current(&self, address: &str) -> Option<&Value> {
        self.points.get(address).map(|point| &point.value)
    }
}

impl RemoteStore for MemoryStore {
    fn read(&self, address: &str) -> Result<RemoteValue, RemoteError> {
        let point = self
            .points
            .get(address)
            .ok_or_else(|| RemoteError::UnknownAddress(address.to_string()))?;
        Ok(RemoteValue {
            value: point.value.clone(),
            quality: point.quality,
        })
    }

    fn write(&mut self, address: &str, value: Value) -> Result<(), RemoteError> {
        if self.failing_writes.contains(address) {
            return Err(RemoteError::WriteRejected(address.to_string()));
        }
        let point = self
            .points
            .get_mut(address)
            .ok_or_else(|| RemoteError::UnknownAddress(address.to_string()))?;
        point.value = value;
        point.quality = Quality::Good;
        Ok(())
    }

    fn metadata(&self, address: &str) -> Option<DatapointMetadata> {
        self.points.get(address).map(|point| point.meta.clone())
    }
}

/// Page store built from a validated template set.
#[derive(Debug)]
pub struct StaticPages {
    root: PageId,
    pages: HashMap<PageId, PageConfig>,
}

impl StaticPages {
    pub fn from_templates(templates: PageTemplates) -> Result<Self, TemplateError> {
        let (root, pages) = templates.into_index()?;
        Ok(Self { root, pages })
    }
}

impl PageStore for StaticPages {
    fn root(&self) -> &PageId {
        &self.root
    }

    fn page(&self, id: &PageId) -> Option<&PageConfig> {
        self.pages.get(id)
    }
}

/// Shared frame buffer: the engine publishes into it, the front end draws
/// from it. Cloning shares the same frame.
#[derive(Debug, Default, Clone)]
pub struct FrameBuffer {
    frame: Arc<Mutex<DisplayFrame>>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current frame for drawing or assertions.
    #[must_use]
    pub fn snapshot(&self) -> DisplayFrame {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Row text without trailing padding.
    #[must_use]
    pub fn text(&self, row: usize) -> String {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .text(row)
            .to_string()
    }
}

impl DisplayPublisher for FrameBuffer {
    fn publish_line(&mut self, row: usize, text: &str, color: DisplayColor) {
        self.frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(row, text, color);
    }

    fn publish_full(&mut self, frame: &DisplayFrame) {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = frame.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayPublisher, MemoryStore, RemoteStore, ValueAccessor};
    use cdu_types::{DatapointKind, DatapointMetadata, DisplayColor, RemoteError, Value};

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        store.insert(
            "dev.temp",
            Value::Number(21.0),
            DatapointMetadata::writable(DatapointKind::Number),
        );
        store
            .write("dev.temp", Value::Number(22.5))
            .expect("write succeeds");
        assert_eq!(store.current("dev.temp"), Some(&Value::Number(22.5)));
    }

    #[test]
    fn unknown_address_is_an_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.read("missing"),
            Err(RemoteError::UnknownAddress(_))
        ));
    }

    #[test]
    fn injected_write_failure_leaves_value_untouched() {
        let mut store = MemoryStore::new();
        store.insert(
            "dev.temp",
            Value::Number(21.0),
            DatapointMetadata::writable(DatapointKind::Number),
        );
        store.fail_writes_to("dev.temp");
        assert!(store.write("dev.temp", Value::Number(99.0)).is_err());
        assert_eq!(store.current("dev.temp"), Some(&Value::Number(21.0)));
    }

    #[test]
    fn accessor_hides_degraded_values() {
        let mut store = MemoryStore::new();
        store.insert(
            "dev.temp",
            Value::Number(21.0),
            DatapointMetadata::writable(DatapointKind::Number),
        );
        assert_eq!(store.value("dev.temp"), Some(Value::Number(21.0)));
        store.degrade("dev.temp");
        assert_eq!(store.value("dev.temp"), None);
    }

    #[test]
    fn frame_buffer_shares_state_across_clones() {
        let mut writer = super::FrameBuffer::new();
        let reader = writer.clone();
        writer.publish_line(0, "HELLO", DisplayColor::Title);
        assert_eq!(reader.text(0), "HELLO");
    }
}
