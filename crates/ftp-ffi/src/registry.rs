//! Thread-safe global engine registry for FFI handles.
//!
//! Engines live behind opaque `u64` handles so that a stale or repeated
//! handle is detected instead of dereferenced.
//!
//! # Thread Safety
//!
//! The handle map sits behind an `RwLock`; each engine has its own `Mutex`,
//! so a long compute on one handle does not block lookups of another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use ftp_core::Engine;
use once_cell::sync::Lazy;

/// Handle type for FFI engines. Zero indicates an invalid handle.
pub type Handle = u64;

/// Invalid handle constant.
pub const INVALID_HANDLE: Handle = 0;

type Slot = Arc<Mutex<Engine>>;

/// Global engine registry.
struct Registry {
    /// Next handle to assign.
    next_handle: AtomicU64,
    /// Map from handle to engine.
    engines: RwLock<HashMap<Handle, Slot>>,
}

impl Registry {
    fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(100),
            engines: RwLock::new(HashMap::new()),
        }
    }

    fn register(&self, engine: Engine) -> Handle {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, Arc::new(Mutex::new(engine)));
        handle
    }

    fn slot(&self, handle: Handle) -> Option<Slot> {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .cloned()
    }

    fn release(&self, handle: Handle) -> bool {
        self.engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle)
            .is_some()
    }

    fn count(&self) -> usize {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Global registry instance.
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

// ============================================================================
// Public API
// ============================================================================

/// Registers an engine and returns its handle.
pub fn register(engine: Engine) -> Handle {
    REGISTRY.register(engine)
}

/// Runs `f` with exclusive access to the engine behind `handle`.
///
/// Returns `None` if the handle is unknown or already released.
pub fn with_engine<R, F: FnOnce(&mut Engine) -> R>(handle: Handle, f: F) -> Option<R> {
    let slot = REGISTRY.slot(handle)?;
    let mut engine = slot.lock().unwrap_or_else(PoisonError::into_inner);
    Some(f(&mut *engine))
}

/// Releases an engine by handle.
///
/// # Returns
///
/// `true` if the engine was found and released, `false` otherwise.
pub fn release(handle: Handle) -> bool {
    REGISTRY.release(handle)
}

/// Returns the number of live engines.
pub fn engine_count() -> usize {
    REGISTRY.count()
}
