use tracing::debug;

/// Persistent "start over" control.
///
/// Created lazily on first use and reused for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HomeControl {
    visible: bool,
}

impl HomeControl {
    /// Returns the control in `slot`, creating it hidden if absent.
    pub fn ensure(slot: &mut Option<HomeControl>) -> &mut HomeControl {
        slot.get_or_insert_with(|| {
            debug!("home control created");
            HomeControl::default()
        })
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_creates_once_and_reuses() {
        let mut slot = None;
        HomeControl::ensure(&mut slot).set_visible(true);
        let again = HomeControl::ensure(&mut slot);
        assert!(again.is_visible(), "existing instance must be returned");
    }

    #[test]
    fn test_new_control_starts_hidden() {
        let mut slot = None;
        assert!(!HomeControl::ensure(&mut slot).is_visible());
    }
}
