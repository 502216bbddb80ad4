use std::ops::{Deref, DerefMut};

use jointkit_core::JointResult;
use jointkit_scene::NodeId;

use crate::host::SceneHost;

/// Holds the host for the length of an operation and puts its selection
/// back afterwards.
///
/// Call [`finish`](SelectionScope::finish) to see whether the restore worked.
/// A scope that is simply dropped still restores, logging any failure.
pub struct SelectionScope<'a, H: SceneHost + ?Sized> {
    host: &'a mut H,
    saved: Option<Vec<NodeId>>,
    done: bool,
}

impl<'a, H: SceneHost + ?Sized> SelectionScope<'a, H> {
    pub fn enter(host: &'a mut H) -> Self {
        let saved = match host.selection() {
            Ok(selection) => Some(selection),
            Err(err) => {
                tracing::debug!("could not read the current selection: {}", err);
                None
            }
        };
        Self {
            host,
            saved,
            done: false,
        }
    }

    /// Restore the saved selection and release the host.
    pub fn finish(mut self) -> JointResult<()> {
        self.restore()
    }

    fn restore(&mut self) -> JointResult<()> {
        self.done = true;
        match self.saved.take() {
            Some(selection) => self.host.set_selection(&selection),
            None => Ok(()),
        }
    }
}

impl<H: SceneHost + ?Sized> Deref for SelectionScope<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: SceneHost + ?Sized> DerefMut for SelectionScope<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: SceneHost + ?Sized> Drop for SelectionScope<'_, H> {
    fn drop(&mut self) {
        if !self.done {
            if let Err(err) = self.restore() {
                tracing::debug!("could not restore the selection: {}", err);
            }
        }
    }
}
