//! Scoped model sessions
//!
//! A `ZooModel` owns the engine-native handle produced by `Engine::load`.
//! The handle is released exactly once: on `close()`, or on drop if the
//! model was never explicitly closed. Predictors observe closure through
//! the shared session state and fail with `SessionClosed` afterwards.

use crate::catalog::ModelReference;
use crate::engine::ModelHandle;
use crate::predictor::Predictor;
use crate::translator::Translator;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;
use vahana_core::error::{Result, ZooError};

pub(crate) struct SessionState {
    pub(crate) handle: Option<Box<dyn ModelHandle>>,
}

impl SessionState {
    pub(crate) fn is_open(&self) -> bool {
        self.handle.is_some()
    }
}

/// A model loaded from a zoo, bound to one engine-native handle.
///
/// Opening and inference are not cancellable once started; callers
/// racing a timeout against either must abandon the session rather than
/// reclaim it mid-operation.
pub struct ZooModel {
    reference: ModelReference,
    state: Arc<RwLock<SessionState>>,
}

impl ZooModel {
    pub(crate) fn new(reference: ModelReference, handle: Box<dyn ModelHandle>) -> Self {
        Self {
            reference,
            state: Arc::new(RwLock::new(SessionState {
                handle: Some(handle),
            })),
        }
    }

    pub fn reference(&self) -> &ModelReference {
        &self.reference
    }

    pub fn is_open(&self) -> bool {
        self.state.read().is_open()
    }

    /// Bind a translator to this session. Fails with `SessionClosed` if
    /// the model was already closed.
    pub fn new_predictor<T: Translator>(&self, translator: T) -> Result<Predictor<T>> {
        if !self.is_open() {
            return Err(ZooError::SessionClosed);
        }
        Ok(Predictor::new(
            Arc::clone(&self.state),
            self.reference.clone(),
            translator,
        ))
    }

    /// Release the engine-native handle. The session is unusable
    /// afterwards; a second close fails with `SessionClosed`.
    pub fn close(&self) -> Result<()> {
        let handle = self.state.write().handle.take();
        match handle {
            Some(handle) => {
                drop(handle);
                info!(
                    "closed {} session for model \"{}\"",
                    self.reference.engine, self.reference.name
                );
                Ok(())
            }
            None => Err(ZooError::SessionClosed),
        }
    }
}

impl std::fmt::Debug for ZooModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZooModel")
            .field("reference", &self.reference)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for ZooModel {
    fn drop(&mut self) {
        // Guaranteed release on all exit paths; ignore the already-closed
        // case.
        let _ = self.close();
    }
}
