//! Page mount state
//!
//! The browser hides a page both when it is closed and when it is parked in
//! the back/forward cache. Only the first is an unmount; a cached page comes
//! back with its timers and frame loop intact.

/// Whether the page still owns the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mount {
    #[default]
    Mounted,
    Unmounted,
}

impl Mount {
    pub fn is_mounted(&self) -> bool {
        *self == Mount::Mounted
    }

    /// Unmount. Returns true only the first time, when teardown should run.
    pub fn unmount(&mut self) -> bool {
        let was_mounted = self.is_mounted();
        *self = Mount::Unmounted;
        was_mounted
    }

    /// `pagehide`. A persisted page stays mounted.
    pub fn page_hide(&mut self, persisted: bool) -> bool {
        if persisted {
            log::info!("Page cached, keeping the game mounted");
            return false;
        }
        self.unmount()
    }

    /// Accept something that finished arriving asynchronously, or hand back
    /// `None` if the page went away while it was in flight.
    pub fn admit<T>(&self, resource: T) -> Option<T> {
        if self.is_mounted() {
            Some(resource)
        } else {
            None
        }
    }
}
