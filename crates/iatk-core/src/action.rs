//! Automaton actions and state handles.

use std::fmt;

/// Name of the single synchronization label in guarded composition.
pub const TAU_NAME: &str = "__tau";

/// Rendering of internal actions.
pub const TAU_SYMBOL: &str = "\u{1D70F}";

/// The kind of an action. A name belongs to exactly one kind within an
/// automaton's alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Input,
    Output,
    Internal,
}

impl ActionKind {
    pub fn suffix(self) -> &'static str {
        match self {
            ActionKind::Input => "?",
            ActionKind::Output => "!",
            ActionKind::Internal => "",
        }
    }
}

/// An action, identified by name and kind. Ordering is by name first so
/// iteration over action sets is deterministic and name-grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action {
    pub name: String,
    pub kind: ActionKind,
}

impl Action {
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Input,
        }
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Output,
        }
    }

    pub fn internal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Internal,
        }
    }

    /// The synchronization label produced by guarded composition.
    pub fn tau() -> Self {
        Self::internal(TAU_NAME)
    }

    pub fn is_input(&self) -> bool {
        self.kind == ActionKind::Input
    }

    pub fn is_output(&self) -> bool {
        self.kind == ActionKind::Output
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ActionKind::Internal
    }

    pub fn is_io(&self) -> bool {
        !self.is_internal()
    }

    /// Display form: internal actions render as the tau symbol, inputs and
    /// outputs with their kind suffix.
    pub fn formatted(&self) -> String {
        match self.kind {
            ActionKind::Internal => TAU_SYMBOL.to_string(),
            _ => format!("{}{}", self.name, self.kind.suffix()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.kind.suffix())
    }
}

/// Arena handle of a state within one automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
