//! Messages exchanged between nodes within a round.
//!
//! Messages are short-lived: they are produced by a round tick or as a reply,
//! survive or get dropped by the loss model, and are consumed by the
//! recipient in the same round (or after a delay in the asynchronous
//! scheduler).

use serde::{Deserialize, Serialize};

/// Kind of a [`Message`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Update,
    UpdateRequest,
    Feedback,
    FlowUpdate,
}

/// A message between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Carries the rumor to `to`
    Update { from: usize, to: usize },
    /// Asks `to` to send the rumor back if it has it
    UpdateRequest { from: usize, to: usize },
    /// Tells `to` that `from` already knew the rumor
    Feedback { from: usize, to: usize },
    /// Averaging payload. Push-Sum treats `x`/`w` as mass to add, Push-Flow
    /// as the absolute flow from `from` to `to`.
    FlowUpdate { from: usize, to: usize, x: f64, w: f64 },
}

impl Message {
    /// Index of the sending node
    pub fn sender(&self) -> usize {
        match *self {
            Message::Update { from, .. }
            | Message::UpdateRequest { from, .. }
            | Message::Feedback { from, .. }
            | Message::FlowUpdate { from, .. } => from,
        }
    }

    /// Index of the receiving node
    pub fn recipient(&self) -> usize {
        match *self {
            Message::Update { to, .. }
            | Message::UpdateRequest { to, .. }
            | Message::Feedback { to, .. }
            | Message::FlowUpdate { to, .. } => to,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Update { .. } => MessageKind::Update,
            Message::UpdateRequest { .. } => MessageKind::UpdateRequest,
            Message::Feedback { .. } => MessageKind::Feedback,
            Message::FlowUpdate { .. } => MessageKind::FlowUpdate,
        }
    }
}
