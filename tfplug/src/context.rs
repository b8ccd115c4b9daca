//! Request context carrying the provider stop signal

use tokio::sync::watch;

/// Context passed as the first parameter to every async trait method
#[derive(Clone)]
pub struct Context {
    stopped: watch::Receiver<bool>,
}

impl Context {
    /// A context that is never stopped
    pub fn new() -> Self {
        let (_, stopped) = watch::channel(false);
        Self { stopped }
    }

    /// Context bound to a stop signal owned elsewhere (the gRPC server)
    pub fn with_stop_signal(stopped: watch::Receiver<bool>) -> Self {
        Self { stopped }
    }

    /// True once Terraform has asked the provider to stop
    pub fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
