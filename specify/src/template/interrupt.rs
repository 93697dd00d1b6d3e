//! Cooperative interrupt flag shared with a signal handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::{TemplateError, TemplateResult};

/// Flag raised by a Ctrl-C handler and polled by the pipeline.
///
/// Clones share the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the running pipeline stop.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with [`TemplateError::Interrupted`] if the flag is raised.
    pub fn check(&self) -> TemplateResult<()> {
        if self.is_raised() {
            Err(TemplateError::Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = InterruptFlag::new();
        let handler_copy = flag.clone();
        assert!(flag.check().is_ok());

        handler_copy.raise();
        assert!(flag.is_raised());
        assert!(matches!(flag.check(), Err(TemplateError::Interrupted)));
    }
}
