//! Math rendering hook
//!
//! Math spans render as `<latex>` placeholders holding the escaped source. A
//! [`MathEngine`] can be plugged into the renderer to fill them in instead;
//! its output is memoized in a [`MathCache`] that may be shared by any number
//! of renderers and threads.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MathError {
    pub message: String,
}

impl MathError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Converts LaTeX source to HTML.
pub trait MathEngine: Send + Sync {
    fn render(&self, latex: &str, display: bool) -> Result<String, MathError>;
}

/// Memoized engine output, keyed by the raw math source and display mode.
///
/// Failures are not cached.
#[derive(Debug, Default)]
pub struct MathCache {
    entries: Mutex<HashMap<(String, bool), String>>,
}

impl MathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_render(
        &self,
        engine: &dyn MathEngine,
        latex: &str,
        display: bool,
    ) -> Result<String, MathError> {
        let key = (latex.to_string(), display);
        if let Some(hit) = self.lock().get(&key) {
            tracing::trace!(latex, "math cache hit");
            return Ok(hit.clone());
        }
        tracing::trace!(latex, "math cache miss");
        // The engine runs without holding the lock.
        let html = engine.render(latex, display)?;
        self.lock().insert(key, html.clone());
        Ok(html)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, bool), String>> {
        // Entries are complete strings, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
