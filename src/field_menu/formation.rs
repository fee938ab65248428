use super::host::PartyOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormationPhase {
    #[default]
    Inactive,
    AwaitingFirstPick,
    PendingSwap(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationOutcome {
    Entered,
    Pending(usize),
    Swapped(usize, usize),
    PendingCleared,
    Exited,
    Ignored,
}

/// Party reorder sub-mode: pick one slot, then another to swap with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formation {
    phase: FormationPhase,
    cursor: usize,
    last_slot: usize,
}

impl Formation {
    /// Inactive formation whose next entry focuses `last_slot`.
    pub fn resuming_at(last_slot: usize) -> Self {
        Self {
            last_slot,
            ..Self::default()
        }
    }

    pub fn last_slot(&self) -> usize {
        self.last_slot
    }

    pub fn phase(&self) -> FormationPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != FormationPhase::Inactive
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn pending_slot(&self) -> Option<usize> {
        match self.phase {
            FormationPhase::PendingSwap(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn enter(&mut self, party_len: usize) -> FormationOutcome {
        if self.is_active() {
            return FormationOutcome::Ignored;
        }
        self.phase = FormationPhase::AwaitingFirstPick;
        self.cursor = self.last_slot.min(party_len.saturating_sub(1));
        FormationOutcome::Entered
    }

    pub fn move_cursor(&mut self, step: isize, party_len: usize) {
        if !self.is_active() || party_len == 0 {
            return;
        }
        let len = party_len as isize;
        self.cursor = (self.cursor as isize + step).rem_euclid(len) as usize;
    }

    pub fn confirm(&mut self, party: &mut dyn PartyOrder) -> FormationOutcome {
        self.confirm_at(self.cursor, party)
    }

    pub fn confirm_at(&mut self, slot: usize, party: &mut dyn PartyOrder) -> FormationOutcome {
        if slot >= party.len() {
            return FormationOutcome::Ignored;
        }
        let outcome = match self.phase {
            FormationPhase::Inactive => return FormationOutcome::Ignored,
            FormationPhase::AwaitingFirstPick => {
                self.phase = FormationPhase::PendingSwap(slot);
                FormationOutcome::Pending(slot)
            }
            FormationPhase::PendingSwap(pending) => {
                party.swap_order(pending, slot);
                self.phase = FormationPhase::AwaitingFirstPick;
                FormationOutcome::Swapped(pending, slot)
            }
        };
        self.cursor = slot;
        self.last_slot = slot;
        outcome
    }

    pub fn cancel(&mut self) -> FormationOutcome {
        match self.phase {
            FormationPhase::Inactive => FormationOutcome::Ignored,
            FormationPhase::PendingSwap(_) => {
                self.phase = FormationPhase::AwaitingFirstPick;
                FormationOutcome::PendingCleared
            }
            FormationPhase::AwaitingFirstPick => {
                self.phase = FormationPhase::Inactive;
                FormationOutcome::Exited
            }
        }
    }
}
