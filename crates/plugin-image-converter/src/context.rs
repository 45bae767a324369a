//! Scoped edit contexts.
//!
//! A [`ContextScope`] opens a container's edit context and guarantees it is
//! closed again on every path out of the scope. [`ContextScope::close`]
//! reports a failed close; dropping an unclosed scope closes it and only
//! logs. When the host refuses to close a context the parent path is
//! restored with `set_active_path`; if that is refused too the walk cannot
//! continue and [`ConversionError::RestoreFailed`] is returned.

use tracing::{debug, error, warn};

use imgconv_core::traits::host::SceneHost;
use imgconv_core::types::id::EntityId;
use imgconv_core::types::path::ContextPath;

use crate::error::ConversionError;

/// An open edit context of one container.
#[derive(Debug)]
pub struct ContextScope<'h, H: SceneHost + ?Sized> {
    host: &'h mut H,
    container: EntityId,
    parent: ContextPath,
    path: ContextPath,
    closed: bool,
}

impl<'h, H: SceneHost + ?Sized> ContextScope<'h, H> {
    /// Open `container`, which must be owned by the context at `parent`.
    ///
    /// Fails with [`ConversionError::ContextMismatch`] if the host is not at
    /// `parent` before, or not at `parent/container` after, and with
    /// [`ConversionError::EnterFailed`] if the host refuses. A host that ends
    /// up anywhere else after entering is put back at `parent` first.
    pub fn enter(
        host: &'h mut H,
        parent: &ContextPath,
        container: EntityId,
    ) -> Result<Self, ConversionError> {
        let actual = host.active_path();
        if actual != *parent {
            return Err(ConversionError::ContextMismatch {
                expected: parent.clone(),
                actual,
            });
        }

        host.enter_context(container)
            .map_err(|source| ConversionError::EnterFailed { container, source })?;

        let path = parent.child(container);
        let actual = host.active_path();
        if actual != path {
            error!(expected = %path, actual = %actual, "Host opened the wrong edit context");
            host.set_active_path(parent.as_slice())
                .map_err(|e| ConversionError::RestoreFailed {
                    path: parent.clone(),
                    reason: e.to_string(),
                })?;
            return Err(ConversionError::ContextMismatch {
                expected: path,
                actual,
            });
        }

        debug!(path = %path, "Opened edit context");
        Ok(Self {
            host,
            container,
            parent: parent.clone(),
            path,
            closed: false,
        })
    }

    /// Path of the open context.
    pub fn path(&self) -> &ContextPath {
        &self.path
    }

    /// The host, positioned inside this context.
    pub fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    /// Close the context and return to the parent.
    pub fn close(mut self) -> Result<(), ConversionError> {
        self.closed = true;
        leave(&mut *self.host, &self.parent, self.container)
    }
}

impl<H: SceneHost + ?Sized> Drop for ContextScope<'_, H> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = leave(&mut *self.host, &self.parent, self.container) {
            error!(path = %self.path, error = %e, "Failed to close edit context on unwind");
        }
    }
}

fn leave<H: SceneHost + ?Sized>(
    host: &mut H,
    parent: &ContextPath,
    container: EntityId,
) -> Result<(), ConversionError> {
    match host.exit_context() {
        Ok(()) => {
            let actual = host.active_path();
            if actual == *parent {
                Ok(())
            } else {
                Err(ConversionError::ContextMismatch {
                    expected: parent.clone(),
                    actual,
                })
            }
        }
        Err(source) => {
            warn!(
                container = %container.short(),
                parent = %parent,
                error = %source,
                "Host failed to close edit context, restoring parent"
            );
            host.set_active_path(parent.as_slice()).map_err(|e| {
                ConversionError::RestoreFailed {
                    path: parent.clone(),
                    reason: e.to_string(),
                }
            })?;
            Err(ConversionError::ExitFailed { container, source })
        }
    }
}

/// Close every open edit context so the host is at the model root.
///
/// Exits one level at a time; if the host refuses, jumps to the root with
/// `set_active_path`.
pub fn close_to_root<H: SceneHost + ?Sized>(host: &mut H) -> Result<(), ConversionError> {
    let mut remaining = host.active_path().depth();
    while remaining > 0 {
        if let Err(e) = host.exit_context() {
            warn!(error = %e, "Host failed to close edit context while returning to root");
            break;
        }
        remaining -= 1;
    }

    if host.active_path().is_root() {
        return Ok(());
    }
    host.set_active_path(&[])
        .map_err(|e| ConversionError::RestoreFailed {
            path: ContextPath::root(),
            reason: e.to_string(),
        })
}
