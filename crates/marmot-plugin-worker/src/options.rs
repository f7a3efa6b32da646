//! Configuration for the worker-call rewriter.

/// Options recognized by [`WorkerPlugin`](crate::WorkerPlugin).
///
/// Evaluated once at plugin construction and fixed for the life of one
/// build.
#[derive(Debug, Clone, Default)]
pub struct WorkerPluginOptions {
    /// When set, the `type` option of every accepted call is rewritten to
    /// this literal string instead of being blanked.
    pub worker_type: Option<String>,

    /// When `true`, the `type` option's source text is left exactly as
    /// authored.
    /// Default: false (the entry is blanked).
    pub preserve_type_module: bool,
}

impl WorkerPluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite accepted `type` options to `worker_type` instead of blanking
    /// them.
    pub fn worker_type(mut self, worker_type: impl Into<String>) -> Self {
        self.worker_type = Some(worker_type.into());
        self
    }

    /// Leave accepted `type` options exactly as authored.
    pub fn preserve_type_module(mut self, preserve: bool) -> Self {
        self.preserve_type_module = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = WorkerPluginOptions::default();
        assert!(options.worker_type.is_none());
        assert!(!options.preserve_type_module);
    }

    #[test]
    fn test_builder_pattern() {
        let options = WorkerPluginOptions::new()
            .worker_type("classic")
            .preserve_type_module(true);

        assert_eq!(options.worker_type.as_deref(), Some("classic"));
        assert!(options.preserve_type_module);
    }
}
