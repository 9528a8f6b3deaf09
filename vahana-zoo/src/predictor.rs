//! Predictors bound to one session and one translator

use crate::catalog::ModelReference;
use crate::session::SessionState;
use crate::translator::Translator;
use image::DynamicImage;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use vahana_core::error::{Result, ZooError};

/// Runs the translator pipeline against the bound session's engine
/// handle. Each `predict` call is independent; no state is carried
/// between calls beyond the session and the immutable translator.
///
/// A predictor is not safe for concurrent invocation from multiple
/// threads unless the underlying engine documents its handles as
/// thread-safe; the default assumption is one caller at a time.
pub struct Predictor<T: Translator> {
    state: Arc<RwLock<SessionState>>,
    reference: ModelReference,
    translator: T,
}

impl<T: Translator> Predictor<T> {
    pub(crate) fn new(
        state: Arc<RwLock<SessionState>>,
        reference: ModelReference,
        translator: T,
    ) -> Self {
        Self {
            state,
            reference,
            translator,
        }
    }

    pub fn reference(&self) -> &ModelReference {
        &self.reference
    }

    /// Synchronous single-image inference. Fails with `SessionClosed`
    /// when the owning session has been closed; a `ShapeMismatch` from
    /// postprocessing fails only this call and leaves the session usable.
    pub fn predict(&self, image: &DynamicImage) -> Result<T::Output> {
        let inputs = self.translator.preprocess(image)?;
        debug!(
            "running {} inference for model \"{}\"",
            self.reference.engine, self.reference.name
        );

        let outputs = {
            let state = self.state.read();
            let handle = state.handle.as_ref().ok_or(ZooError::SessionClosed)?;
            handle.infer(&inputs)?
        };

        self.translator.postprocess(outputs)
    }
}
