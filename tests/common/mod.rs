//! Test doubles shared by the integration tests

#![allow(dead_code)]

use nativeboot::{properties, EmbeddedResources, NativeBinding, NativeError, ResourceRef, ResourceSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub static PAYLOAD: &[u8] = b"\x7fELF\x02\x01\x01 pretend shared object bytes";
pub const LIB_NAME: &str = "testlib.1.0.0";
pub const LIB_FILE: &str = "libtestlib.1.0.0.so";

/// Resource set that counts lookups
pub struct CountingResources {
    inner: EmbeddedResources,
    pub lookups: Arc<AtomicUsize>,
}

impl CountingResources {
    pub fn with_payload() -> Self {
        Self {
            inner: EmbeddedResources::default().with(LIB_FILE, PAYLOAD),
            lookups: Arc::default(),
        }
    }

    pub fn empty() -> Self {
        Self {
            inner: EmbeddedResources::default(),
            lookups: Arc::default(),
        }
    }
}

impl ResourceSet for CountingResources {
    fn locate(&self, file_name: &str) -> Option<ResourceRef> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.locate(file_name)
    }
}

/// What the binding saw when `open` ran
#[derive(Debug, Clone)]
pub struct OpenSnapshot {
    pub registered: Option<PathBuf>,
    pub bytes: Option<Vec<u8>>,
}

/// Binding that registers through the property channel and records what `open` sees
pub struct RecordingBinding {
    key: String,
    status: i32,
    pub registrations: Arc<AtomicUsize>,
    pub opens: Arc<AtomicUsize>,
    pub snapshots: Arc<Mutex<Vec<OpenSnapshot>>>,
}

impl RecordingBinding {
    pub fn new(key: &str, status: i32) -> Self {
        Self {
            key: key.to_string(),
            status,
            registrations: Arc::default(),
            opens: Arc::default(),
            snapshots: Arc::default(),
        }
    }
}

impl NativeBinding for RecordingBinding {
    fn register_path(&self, path: &Path) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        properties::set(self.key.as_str(), path.as_os_str());
    }

    fn open(&self) -> Result<i32, NativeError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let registered = properties::get(&self.key).map(PathBuf::from);
        let bytes = registered.as_ref().and_then(|p| std::fs::read(p).ok());
        self.snapshots
            .lock()
            .unwrap()
            .push(OpenSnapshot { registered, bytes });
        Ok(self.status)
    }
}

pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// In-memory log sink for asserting on emitted records
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a subscriber capturing records on this thread
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
