#![forbid(unsafe_code)]

//! Command contracts for reversible operations.
//!
//! This module provides the [`Command`] and [`ReversibleCommand`] traits and a
//! closure-backed [`FnCommand`] for ad-hoc reversible actions.
//!
//! # Design Principles
//!
//! 1. **Guarded entry points**: `execute()` / `undo()` consult `can_execute()` /
//!    `can_undo()` and only then run the `*_core` body
//! 2. **One contract for void and valued commands**: the associated `Output`
//!    type is `()` for commands that produce nothing
//! 3. **Errors pass through**: the guard layer never wraps or swallows what the
//!    `*_core` body returns
//!
//! # Invariants
//!
//! - A vetoed `execute()` or `undo()` performs no side effects and yields
//!   `Output::default()`
//! - `execute()` followed by `undo()` restores the state the command touched
//!
//! # Failure Modes
//!
//! - **State drift**: something else mutated the target between execute and
//!   undo; the command restores its own snapshot regardless
//! - **Partial failure**: a `*_core` body that errors halfway must leave its
//!   target in a well-defined state; callers see the error unchanged

use std::fmt;

/// Result of command execution or undo.
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Errors that can occur while building, executing or undoing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// A constructor or builder received an unusable argument.
    InvalidArgument(&'static str),
    /// Command cannot run in the current state.
    InvalidState(String),
    /// The command's own logic failed.
    Failed(String),
}

impl CommandError {
    /// Shorthand for [`CommandError::Failed`].
    #[must_use]
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(name) => write!(f, "invalid argument: {name}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// A guarded executable action.
///
/// Implementors supply [`execute_core`](Command::execute_core) and optionally
/// override [`can_execute`](Command::can_execute). Callers go through
/// [`execute`](Command::execute), which should not be overridden.
pub trait Command {
    /// Value produced by `execute()`. Use `()` for commands with no result.
    type Output: Default;

    /// Whether the command may run right now.
    fn can_execute(&self) -> bool {
        true
    }

    /// The command body.
    fn execute_core(&mut self) -> CommandResult<Self::Output>;

    /// Run the command if the guard allows it.
    ///
    /// Returns `Output::default()` without side effects when vetoed.
    fn execute(&mut self) -> CommandResult<Self::Output> {
        if self.can_execute() {
            self.execute_core()
        } else {
            Ok(Self::Output::default())
        }
    }

    /// Human-readable description used by history inspection and logs.
    fn description(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A [`Command`] with a guarded inverse.
pub trait ReversibleCommand: Command {
    /// Whether the command may be undone right now.
    fn can_undo(&self) -> bool {
        true
    }

    /// The inverse body.
    fn undo_core(&mut self) -> CommandResult<Self::Output>;

    /// Revert the command if the guard allows it.
    ///
    /// Returns `Output::default()` without side effects when vetoed.
    fn undo(&mut self) -> CommandResult<Self::Output> {
        if self.can_undo() {
            self.undo_core()
        } else {
            Ok(Self::Output::default())
        }
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    type Output = C::Output;

    fn can_execute(&self) -> bool {
        (**self).can_execute()
    }

    fn execute_core(&mut self) -> CommandResult<Self::Output> {
        (**self).execute_core()
    }

    fn execute(&mut self) -> CommandResult<Self::Output> {
        (**self).execute()
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}

impl<C: ReversibleCommand + ?Sized> ReversibleCommand for Box<C> {
    fn can_undo(&self) -> bool {
        (**self).can_undo()
    }

    fn undo_core(&mut self) -> CommandResult<Self::Output> {
        (**self).undo_core()
    }

    fn undo(&mut self) -> CommandResult<Self::Output> {
        (**self).undo()
    }
}

// ============================================================================
// Closure-backed command
// ============================================================================

/// Callback type for the forward half of an [`FnCommand`].
pub type ExecuteFn<O> = Box<dyn FnMut() -> CommandResult<O> + Send>;
/// Callback type for the inverse half of an [`FnCommand`].
pub type UndoFn<O> = Box<dyn FnMut() -> CommandResult<O> + Send>;

/// A reversible command assembled from callbacks.
///
/// Without an undo callback the command is still accepted by the manager, but
/// its `undo()` is vetoed and becomes a no-op.
pub struct FnCommand<O = ()> {
    description: String,
    execute: ExecuteFn<O>,
    undo: Option<UndoFn<O>>,
}

impl<O> fmt::Debug for FnCommand<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("description", &self.description)
            .field("has_undo", &self.undo.is_some())
            .finish()
    }
}

impl<O> FnCommand<O> {
    /// Create a command from its forward callback.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        execute: impl FnMut() -> CommandResult<O> + Send + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            execute: Box::new(execute),
            undo: None,
        }
    }

    /// Set the inverse callback.
    #[must_use]
    pub fn with_undo(mut self, undo: impl FnMut() -> CommandResult<O> + Send + 'static) -> Self {
        self.undo = Some(Box::new(undo));
        self
    }
}

impl<O: Default> Command for FnCommand<O> {
    type Output = O;

    fn execute_core(&mut self) -> CommandResult<O> {
        (self.execute)()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl<O: Default> ReversibleCommand for FnCommand<O> {
    fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    fn undo_core(&mut self) -> CommandResult<O> {
        match self.undo.as_mut() {
            Some(undo) => undo(),
            None => Ok(O::default()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
