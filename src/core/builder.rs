use std::sync::Arc;

use crate::{
    core::Config,
    diagnostics::{DiagnosticSet, Diagnostics, Noop},
};
use super::context::ReloadContext;

/// Builder for constructing a [`ReloadContext`] with optional diagnostics.
pub struct ReloadContextBuilder {
    cfg: Config,
    diagnostics: Vec<Arc<dyn Diagnostics>>,
}

impl ReloadContextBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            diagnostics: Vec::new(),
        }
    }

    /// Replaces the context-wide defaults.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Adds a diagnostics sink.
    ///
    /// Sinks receive every event that passes the reporting slot's
    /// [`DebugMode`](crate::DebugMode) gate, in the order they were added.
    pub fn with_diagnostics(mut self, sink: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics.push(sink);
        self
    }

    /// Builds and returns the context.
    ///
    /// With no sink the context reports into [`Noop`]; several sinks are
    /// combined into a [`DiagnosticSet`].
    pub fn build(self) -> Arc<ReloadContext> {
        let mut sinks = self.diagnostics;
        let diagnostics: Arc<dyn Diagnostics> = match sinks.len() {
            0 => Arc::new(Noop),
            1 => sinks.remove(0),
            _ => Arc::new(DiagnosticSet::new(sinks)),
        };
        Arc::new(ReloadContext::new_internal(self.cfg, diagnostics))
    }
}
