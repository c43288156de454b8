//! Single-slot confirmation for destructive or state-changing actions.

use crate::model::ArticleStatus;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this article?";
pub const STATUS_PROMPT: &str = "Are you sure you want to change the status?";

/// Backend call to run once the user confirms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedAction {
    Delete { id: String },
    SetStatus { id: String, status: ArticleStatus },
}

impl GuardedAction {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Delete { .. } => DELETE_PROMPT,
            Self::SetStatus { .. } => STATUS_PROMPT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    AwaitingConfirmation,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Idle,
    Awaiting(GuardedAction),
    Confirmed { ticket: u64 },
}

/// Ticket handed out on confirm; gives the slot back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    slot: Slot,
    next_ticket: u64,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self {
            slot: Slot::Idle,
            next_ticket: 0,
        }
    }
}

impl ConfirmationGate {
    pub fn state(&self) -> GateState {
        match self.slot {
            Slot::Idle => GateState::Idle,
            Slot::Awaiting(_) => GateState::AwaitingConfirmation,
            Slot::Confirmed { .. } => GateState::Confirmed,
        }
    }

    pub fn pending(&self) -> Option<&GuardedAction> {
        match &self.slot {
            Slot::Awaiting(action) => Some(action),
            _ => None,
        }
    }

    /// Parks `action` until confirmed. Last request wins: a still pending
    /// action is replaced and returned.
    pub fn request(&mut self, action: GuardedAction) -> Option<GuardedAction> {
        match std::mem::replace(&mut self.slot, Slot::Awaiting(action)) {
            Slot::Awaiting(replaced) => Some(replaced),
            _ => None,
        }
    }

    pub fn confirm(&mut self) -> Option<(GuardedAction, Ticket)> {
        if !matches!(self.slot, Slot::Awaiting(_)) {
            return None;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        match std::mem::replace(&mut self.slot, Slot::Confirmed { ticket }) {
            Slot::Awaiting(action) => Some((action, Ticket(ticket))),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<GuardedAction> {
        match std::mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Awaiting(action) => Some(action),
            other => {
                self.slot = other;
                None
            }
        }
    }

    /// Back to idle once the confirmed call finished. Returns `false` when a
    /// newer request already owns the slot.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        match self.slot {
            Slot::Confirmed { ticket: current } if current == ticket.0 => {
                self.slot = Slot::Idle;
                true
            }
            _ => false,
        }
    }
}
