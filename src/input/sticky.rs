//! Sticky-key latch.
//!
//! Sits between the grid's key transitions and the vocabulary. A normal key
//! follows the finger; a stuck key stays asserted until it is pressed again.

/// Latch state of one key, independent of whether a finger is on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StickyRecord {
    #[default]
    Unstuck,
    Stuck,
    /// Released by a press; the matching finger-up is swallowed
    UnstuckPendingRelease,
}

/// Which editor a key press is routed to instead of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    None,
    Binding,
    Name,
    Color,
}

impl EditMode {
    /// Next mode in the `None → Binding → Name → Color → None` rotation.
    pub fn cycle(self) -> Self {
        match self {
            EditMode::None => EditMode::Binding,
            EditMode::Binding => EditMode::Name,
            EditMode::Name => EditMode::Color,
            EditMode::Color => EditMode::None,
        }
    }

    pub fn is_editing(self) -> bool {
        self != EditMode::None
    }
}

/// What the caller should do for a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchEffect {
    Nothing,
    /// Send the key's press command
    Press,
    /// Send the key's release command
    Release,
    /// Route the key to an editor
    Edit(EditMode),
}

#[derive(Debug, Clone, Default)]
pub struct StickyLatch {
    records: Vec<StickyRecord>,
    sticky_editing: bool,
}

impl StickyLatch {
    pub fn new(len: usize) -> Self {
        Self {
            records: vec![StickyRecord::Unstuck; len],
            sticky_editing: false,
        }
    }

    /// Resets every record for a grid of `len` keys.
    pub fn reset(&mut self, len: usize) {
        self.records.clear();
        self.records.resize(len, StickyRecord::Unstuck);
    }

    pub fn sticky_editing(&self) -> bool {
        self.sticky_editing
    }

    /// Toggles whether newly pressed keys latch. Returns the new setting.
    pub fn toggle_sticky_editing(&mut self) -> bool {
        self.sticky_editing = !self.sticky_editing;
        log::debug!("Sticky editing {}", if self.sticky_editing { "on" } else { "off" });
        self.sticky_editing
    }

    pub fn set_sticky_editing(&mut self, enabled: bool) {
        self.sticky_editing = enabled;
    }

    pub fn record(&self, index: usize) -> StickyRecord {
        self.slot(index).copied().unwrap_or_default()
    }

    pub fn key_down(&mut self, index: usize, edit_mode: EditMode) -> LatchEffect {
        if edit_mode.is_editing() {
            return LatchEffect::Edit(edit_mode);
        }
        let sticky_editing = self.sticky_editing;
        let Some(record) = self.slot_mut(index) else {
            return LatchEffect::Nothing;
        };
        match *record {
            StickyRecord::Unstuck | StickyRecord::UnstuckPendingRelease => {
                *record = if sticky_editing {
                    log::debug!("Key {index} stuck");
                    StickyRecord::Stuck
                } else {
                    StickyRecord::Unstuck
                };
                LatchEffect::Press
            }
            StickyRecord::Stuck => {
                *record = StickyRecord::UnstuckPendingRelease;
                log::debug!("Key {index} unstuck");
                LatchEffect::Release
            }
        }
    }

    pub fn key_up(&mut self, index: usize, edit_mode: EditMode) -> LatchEffect {
        if edit_mode.is_editing() {
            return LatchEffect::Nothing;
        }
        let Some(record) = self.slot_mut(index) else {
            return LatchEffect::Nothing;
        };
        match *record {
            StickyRecord::Unstuck => LatchEffect::Release,
            StickyRecord::UnstuckPendingRelease => {
                *record = StickyRecord::Unstuck;
                LatchEffect::Nothing
            }
            StickyRecord::Stuck => LatchEffect::Nothing,
        }
    }

    /// Unlatches every stuck key and returns the indices whose release must
    /// be sent.
    pub fn unstick_all(&mut self) -> Vec<usize> {
        let mut released = Vec::new();
        for (i, record) in self.records.iter_mut().enumerate() {
            if *record == StickyRecord::Stuck {
                released.push(i + 1);
            }
            *record = StickyRecord::Unstuck;
        }
        if !released.is_empty() {
            log::debug!("Unstuck keys {released:?}");
        }
        released
    }

    /// Unlatches one key. Returns true if it was stuck and needs a release.
    pub fn unstick(&mut self, index: usize) -> bool {
        match self.slot_mut(index) {
            Some(record) => std::mem::take(record) == StickyRecord::Stuck,
            None => false,
        }
    }

    fn slot(&self, index: usize) -> Option<&StickyRecord> {
        let slot = index.checked_sub(1).and_then(|i| self.records.get(i));
        debug_assert!(slot.is_some(), "sticky index {index} out of range");
        slot
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut StickyRecord> {
        let slot = index.checked_sub(1).and_then(|i| self.records.get_mut(i));
        debug_assert!(slot.is_some(), "sticky index {index} out of range");
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unstuck_key_follows_finger() {
        let mut latch = StickyLatch::new(4);
        assert_eq!(latch.key_down(2, EditMode::None), LatchEffect::Press);
        assert_eq!(latch.key_up(2, EditMode::None), LatchEffect::Release);
        assert_eq!(latch.record(2), StickyRecord::Unstuck);
    }

    #[test]
    fn sticky_toggle_presses_then_releases_once() {
        let mut latch = StickyLatch::new(4);
        latch.toggle_sticky_editing();

        assert_eq!(latch.key_down(3, EditMode::None), LatchEffect::Press);
        assert_eq!(latch.key_up(3, EditMode::None), LatchEffect::Nothing);
        assert_eq!(latch.record(3), StickyRecord::Stuck);

        assert_eq!(latch.key_down(3, EditMode::None), LatchEffect::Release);
        assert_eq!(latch.key_up(3, EditMode::None), LatchEffect::Nothing);
        assert_eq!(latch.record(3), StickyRecord::Unstuck);
    }

    #[test]
    fn edit_mode_routes_presses_to_editor() {
        let mut latch = StickyLatch::new(2);
        assert_eq!(
            latch.key_down(1, EditMode::Name),
            LatchEffect::Edit(EditMode::Name)
        );
        assert_eq!(latch.key_up(1, EditMode::Name), LatchEffect::Nothing);
    }

    #[test]
    fn unstick_all_reports_only_stuck_keys() {
        let mut latch = StickyLatch::new(3);
        latch.set_sticky_editing(true);
        latch.key_down(1, EditMode::None);
        latch.key_up(1, EditMode::None);
        latch.key_down(2, EditMode::None);
        latch.key_up(2, EditMode::None);
        latch.key_down(2, EditMode::None);

        assert_eq!(latch.unstick_all(), vec![1]);
        assert!(latch.unstick_all().is_empty());
    }

    #[test]
    fn edit_modes_cycle_back_to_none() {
        let mut mode = EditMode::None;
        for _ in 0..4 {
            mode = mode.cycle();
        }
        assert_eq!(mode, EditMode::None);
        assert_eq!(EditMode::None.cycle(), EditMode::Binding);
    }
}
