//! Call lifecycle state machine.
//!
//! A call only ever moves forward:
//! `Pending -> {Ringing, InProgress} -> {Resolved, Escalated, Failed}`.
//! Webhook deliveries arrive out of order, so writers never assign a state
//! directly; they merge the incoming state into the stored one with
//! [`CallLifecycle::merge`], which ignores regressions and never leaves a
//! terminal state.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallLifecycle {
    /// Known to the provider but not yet ringing (queued).
    Pending,
    /// Ringing at the destination.
    Ringing,
    /// Connected to the agent.
    InProgress,
    /// Ended normally.
    Resolved,
    /// Handed off to a human.
    Escalated,
    /// Ended because of an error or a connection failure.
    Failed,
}

impl CallLifecycle {
    /// Ordering used to reject regressions. All terminal states share a rank.
    pub fn rank(&self) -> u8 {
        match self {
            CallLifecycle::Pending => 0,
            CallLifecycle::Ringing => 1,
            CallLifecycle::InProgress => 2,
            CallLifecycle::Resolved | CallLifecycle::Escalated | CallLifecycle::Failed => 3,
        }
    }

    /// Merges an incoming state into the stored one.
    ///
    /// Terminal states are kept as-is (re-writing the same value is a no-op),
    /// older states are ignored, and strictly newer states win.
    pub fn merge(self, incoming: CallLifecycle) -> CallLifecycle {
        if self.is_terminal() {
            return self;
        }
        if incoming.rank() > self.rank() {
            incoming
        } else {
            self
        }
    }

    /// Maps a provider `status-update` status to a lifecycle state.
    ///
    /// Returns `None` for statuses that carry no lifecycle meaning.
    pub fn from_provider_status(status: &str) -> Option<CallLifecycle> {
        match status.trim().to_ascii_lowercase().as_str() {
            "queued" => Some(CallLifecycle::Pending),
            "ringing" => Some(CallLifecycle::Ringing),
            "in-progress" | "in_progress" => Some(CallLifecycle::InProgress),
            "forwarding" => Some(CallLifecycle::Escalated),
            "ended" | "completed" => Some(CallLifecycle::Resolved),
            "failed" => Some(CallLifecycle::Failed),
            _ => None,
        }
    }

    /// Derives the terminal state reported by an end-of-call report.
    pub fn from_ended_reason(reason: Option<&str>) -> CallLifecycle {
        let Some(reason) = reason else {
            return CallLifecycle::Resolved;
        };
        let reason = reason.to_ascii_lowercase();
        if reason.contains("forward") || reason.contains("transfer") {
            CallLifecycle::Escalated
        } else if reason.contains("error") || reason.contains("failed") {
            CallLifecycle::Failed
        } else {
            CallLifecycle::Resolved
        }
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallLifecycle::Pending => "pending",
            CallLifecycle::Ringing => "ringing",
            CallLifecycle::InProgress => "in_progress",
            CallLifecycle::Resolved => "resolved",
            CallLifecycle::Escalated => "escalated",
            CallLifecycle::Failed => "failed",
        }
    }
}

impl fmt::Display for CallLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallLifecycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CallLifecycle::Pending),
            "ringing" => Ok(CallLifecycle::Ringing),
            "in_progress" => Ok(CallLifecycle::InProgress),
            "resolved" => Ok(CallLifecycle::Resolved),
            "escalated" => Ok(CallLifecycle::Escalated),
            "failed" => Ok(CallLifecycle::Failed),
            other => Err(ValidationError::invalid_format(
                "lifecycle_state",
                format!("unknown lifecycle state '{}'", other),
            )),
        }
    }
}

impl StateMachine for CallLifecycle {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CallLifecycle::*;
        matches!(
            (self, target),
            (Pending, Ringing)
                | (Pending, InProgress)
                | (Pending, Resolved)
                | (Pending, Escalated)
                | (Pending, Failed)
                | (Ringing, InProgress)
                | (Ringing, Resolved)
                | (Ringing, Escalated)
                | (Ringing, Failed)
                | (InProgress, Resolved)
                | (InProgress, Escalated)
                | (InProgress, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CallLifecycle::*;
        match self {
            Pending => vec![Ringing, InProgress, Resolved, Escalated, Failed],
            Ringing => vec![InProgress, Resolved, Escalated, Failed],
            InProgress => vec![Resolved, Escalated, Failed],
            Resolved | Escalated | Failed => vec![],
        }
    }
}
