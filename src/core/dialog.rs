/// Every confirmation the settings screen can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    ClearHistory,
}

impl DialogKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::ClearHistory => "Clear history",
        }
    }
    pub const fn message(self) -> &'static str {
        match self {
            Self::ClearHistory => {
                "Delete all K-9 Mail events shown on the accessory? This can't be undone."
            }
        }
    }
    /// Glyph shown next to the title
    pub const fn icon(self) -> &'static str {
        match self {
            Self::ClearHistory => "\u{232B}",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    AwaitingConfirmation,
    Confirmed,
    Cancelled,
}

/// How the user answered the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
    /// Closed without answering, e.g. with Escape
    Dismiss,
}

/// One pending yes/no confirmation.
///
/// A workflow is created per click and consumed by [`ConfirmWorkflow::resolve`],
/// so an answer can never be replayed onto a later prompt.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct ConfirmWorkflow {
    kind: DialogKind,
    state: WorkflowState,
}

impl ConfirmWorkflow {
    pub fn new(kind: DialogKind) -> Self {
        Self {
            kind,
            state: WorkflowState::Idle,
        }
    }

    /// `Idle` → `AwaitingConfirmation`. No-op in any other state.
    pub fn open(mut self) -> Self {
        if self.state == WorkflowState::Idle {
            self.state = WorkflowState::AwaitingConfirmation;
        }
        self
    }

    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Applies the answer and returns the terminal state.
    ///
    /// Only `Yes` on an open prompt confirms; anything else cancels.
    pub fn resolve(self, choice: Choice) -> WorkflowState {
        let resolved = match (self.state, choice) {
            (WorkflowState::AwaitingConfirmation, Choice::Yes) => WorkflowState::Confirmed,
            _ => WorkflowState::Cancelled,
        };
        debug!("[DIALOG] {:?}: {choice:?} -> {resolved:?}", self.kind);
        resolved
    }
}
