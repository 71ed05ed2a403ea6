//! Render-in-flight tracking.
//!
//! A renderer runs at most one render at a time. A request that arrives
//! while another is in flight is dropped, not queued: if the configuration
//! changed in between, the frame on screen stays stale until the next
//! render request.

use std::cell::RefCell;

use crate::config::IconConfig;

/// State of the single render slot.
#[derive(Debug, Default)]
pub enum RenderState {
    #[default]
    Idle,
    /// A render is running with this configuration snapshot.
    Busy(Box<IconConfig>),
}

/// A single-slot gate around the render algorithm.
#[derive(Debug, Default)]
pub struct RenderSlot {
    state: RefCell<RenderState>,
}

impl RenderSlot {
    /// Claims the slot for a render of `config`.
    ///
    /// Returns `None` when a render is already in flight. The slot is
    /// released when the returned session is dropped, including on early
    /// return or error.
    pub fn try_begin(&self, config: &IconConfig) -> Option<RenderSession<'_>> {
        let mut state = self.state.borrow_mut();
        if matches!(*state, RenderState::Busy(_)) {
            return None;
        }
        *state = RenderState::Busy(Box::new(config.clone()));
        Some(RenderSession { slot: self })
    }

    pub fn is_busy(&self) -> bool {
        matches!(*self.state.borrow(), RenderState::Busy(_))
    }

    /// Configuration of the render in flight, if any.
    pub fn in_flight(&self) -> Option<IconConfig> {
        match &*self.state.borrow() {
            RenderState::Busy(config) => Some(config.as_ref().clone()),
            RenderState::Idle => None,
        }
    }
}

/// Proof of an active render; releases the slot on drop.
#[derive(Debug)]
pub struct RenderSession<'a> {
    slot: &'a RenderSlot,
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        *self.slot.state.borrow_mut() = RenderState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_release() {
        let slot = RenderSlot::default();
        let config = IconConfig::new("<svg/>");

        let session = slot.try_begin(&config).unwrap();
        assert!(slot.is_busy());
        assert!(slot.try_begin(&config).is_none());
        assert_eq!(slot.in_flight().unwrap().svg_text, "<svg/>");

        drop(session);
        assert!(!slot.is_busy());
        assert!(slot.in_flight().is_none());
        assert!(slot.try_begin(&config).is_some());
    }
}
