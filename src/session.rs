//! Session handles: configuration plus resource limits for loads

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use log::{debug, info, warn};

use crate::config::{ByteSize, SessionConfig};
use crate::error::{Error, Result};
use crate::reader::DataFrameReader;

/// The process-wide session handed out by `get_or_create`
static ACTIVE: Mutex<Weak<Session>> = Mutex::new(Weak::new());

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A configured session. Released when the last `Arc` is dropped.
#[derive(Debug)]
pub struct Session {
    id: u64,
    config: SessionConfig,
    stopped: AtomicBool,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// The live process-wide session, if any
    pub fn active() -> Option<Arc<Session>> {
        let slot = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner);
        slot.upgrade().filter(|s| !s.is_stopped())
    }

    fn new(config: SessionConfig) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        info!(
            "session {} ({}) started: driver memory {}, max result size {}",
            id, config.app_name, config.driver_memory, config.max_result_size
        );
        Self {
            id,
            config,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn app_name(&self) -> &str {
        &self.config.app_name
    }

    /// Start a CSV load bound to this session's limits
    pub fn read(&self) -> DataFrameReader<'_> {
        DataFrameReader::for_session(self)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Stop the session. Later reads fail with `SessionStopped`.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut slot = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner);
        if std::ptr::eq(slot.as_ptr(), self) {
            *slot = Weak::new();
        }
        info!("session {} stopped", self.id);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("session {} released", self.id);
    }
}

/// Builder for sessions
#[derive(Debug, Default)]
pub struct SessionBuilder {
    config: SessionConfig,
    error: Option<Error>,
}

impl SessionBuilder {
    /// Apply a setting such as `spark.driver.memory = 4g`
    pub fn config(mut self, key: &str, value: impl AsRef<str>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set(key, value.as_ref()) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.config.settings.insert("spark.app.name".to_string(), name.clone());
        self.config.app_name = name;
        self
    }

    pub fn driver_memory(mut self, size: ByteSize) -> Self {
        self.config
            .settings
            .insert("spark.driver.memory".to_string(), size.to_string());
        self.config.driver_memory = size;
        self
    }

    pub fn max_result_size(mut self, size: ByteSize) -> Self {
        self.config
            .settings
            .insert("spark.driver.maxResultSize".to_string(), size.to_string());
        self.config.max_result_size = size;
        self
    }

    /// Build an independent session that is not registered as active
    pub fn create(self) -> Result<Arc<Session>> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(Arc::new(Session::new(self.config)))
    }

    /// Return the active session, or create and register a new one.
    ///
    /// Settings passed to the builder do not apply to an existing session.
    pub fn get_or_create(self) -> Result<Arc<Session>> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let mut slot = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slot.upgrade().filter(|s| !s.is_stopped()) {
            for (key, value) in existing.config.conflicts(&self.config) {
                warn!(
                    "using existing session {}; ignoring {} = {}",
                    existing.id, key, value
                );
            }
            return Ok(existing);
        }

        let session = Arc::new(Session::new(self.config));
        *slot = Arc::downgrade(&session);
        Ok(session)
    }
}
