#![forbid(unsafe_code)]

//! Command manager with a LIFO undo history.
//!
//! [`CommandManager`] executes reversible commands and remembers the ones that
//! succeeded so they can be undone newest-first.
//!
//! # Invariants
//!
//! 1. A command enters the history only after its `execute()` returned `Ok`
//! 2. A command leaves the history only after its `undo()` returned `Ok`, or
//!    through [`clear`](CommandManager::clear)
//! 3. The top of the history is the most recently executed command that has
//!    not been successfully undone
//! 4. No command is undone by two threads at once
//!
//! # Concurrency
//!
//! Every method takes `&self` and the manager is `Send + Sync`.
//!
//! ```text
//!  thread A: execute_command ──► cmd.execute() ──► lock(history) push
//!  thread B: execute_command ──► cmd.execute() ──► lock(history) push
//!  thread C: undo_previous   ──► lock(undo gate)
//!                                  lock(history) peek top (id, entry)
//!                                  entry.undo()
//!                                  lock(history) remove id
//!                                unlock(undo gate)
//! ```
//!
//! Commands execute outside every manager lock, so executes from different
//! threads run in parallel. The compound undo step is serialized by the undo
//! gate. Removal is by entry id rather than by position, so commands pushed
//! while an undo is running are never removed by it. An entry being undone
//! stays counted until its undo succeeds.
//!
//! # Failure Semantics
//!
//! The manager never rolls back a command's effects on its target. It only
//! decides whether the command is tracked: a failed execute is not pushed and
//! a failed undo is not popped, so a later `undo_previous_command()` retries
//! the same command.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, debug_span, warn};

use super::command::{CommandResult, ReversibleCommand};
use super::config::{MAX_INITIAL_CAPACITY, ManagerConfig};
use super::property::{PropertyAccessor, ReversibleSetPropertyCommand, SharedTarget};

const LOG_TARGET: &str = "rewind.manager";

/// Type-erased view of a history entry; undo output is discarded.
trait ErasedUndo: Send {
    fn undo_erased(&mut self) -> CommandResult;
}

impl<C> ErasedUndo for C
where
    C: ReversibleCommand + Send,
{
    fn undo_erased(&mut self) -> CommandResult {
        self.undo().map(drop)
    }
}

struct HistoryEntry {
    id: u64,
    description: String,
    command: Arc<Mutex<Box<dyn ErasedUndo>>>,
}

/// Executes reversible commands and keeps their undo history.
///
/// One manager belongs to one editing session. Dropping it drops every
/// command still in the history without undoing them.
pub struct CommandManager {
    /// Undo history, newest at the back.
    history: Mutex<Vec<HistoryEntry>>,
    /// Serializes the inspect + undo + remove step.
    undo_gate: Mutex<()>,
    /// Source of entry ids.
    next_id: AtomicU64,
    config: ManagerConfig,
}

impl fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("undo_depth", &self.count_of_commands_to_undo())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl CommandManager {
    /// Create a manager with the given configuration.
    ///
    /// The configuration is not validated here; pre-allocation is capped at
    /// [`MAX_INITIAL_CAPACITY`](crate::config::MAX_INITIAL_CAPACITY).
    #[must_use]
    pub fn new(config: ManagerConfig) -> Self {
        let capacity = config.initial_capacity.min(MAX_INITIAL_CAPACITY);
        Self {
            history: Mutex::new(Vec::with_capacity(capacity)),
            undo_gate: Mutex::new(()),
            next_id: AtomicU64::new(0),
            config,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Execute a command and record it for undo.
    ///
    /// # Errors
    ///
    /// Whatever the command's `execute()` returns. The command is then dropped
    /// and the history is unchanged.
    pub fn execute_command<C>(&self, command: C) -> CommandResult
    where
        C: ReversibleCommand + Send + 'static,
    {
        self.execute_command_function(command).map(drop)
    }

    /// Execute a command, record it for undo and return its result.
    ///
    /// A command whose `can_execute()` vetoes the call is still recorded,
    /// and `Output::default()` is returned.
    ///
    /// # Errors
    ///
    /// Same as [`execute_command`](Self::execute_command).
    pub fn execute_command_function<C>(&self, mut command: C) -> CommandResult<C::Output>
    where
        C: ReversibleCommand + Send + 'static,
    {
        let description = command.description().to_owned();

        let output = match command.execute() {
            Ok(output) => output,
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    session = %self.config.label,
                    command = %description,
                    error = %err,
                    "execute failed; command not recorded"
                );
                return Err(err);
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let erased: Box<dyn ErasedUndo> = Box::new(command);
        let depth = {
            let mut history = self.lock_history();
            history.push(HistoryEntry {
                id,
                description,
                command: Arc::new(Mutex::new(erased)),
            });
            history.len()
        };

        if self.config.trace_commands {
            debug!(
                target: LOG_TARGET,
                session = %self.config.label,
                entry_id = id,
                undo_depth = depth,
                "command executed"
            );
        }

        Ok(output)
    }

    /// Build a [`ReversibleSetPropertyCommand`] and execute it.
    ///
    /// # Errors
    ///
    /// [`CommandError::InvalidArgument`](crate::CommandError::InvalidArgument)
    /// if the accessor is unusable, otherwise as
    /// [`execute_command`](Self::execute_command).
    pub fn execute_set_property<T, A>(
        &self,
        target: &SharedTarget<T>,
        accessor: A,
        value: A::Value,
    ) -> CommandResult
    where
        T: Send + 'static,
        A: PropertyAccessor<T> + 'static,
        A::Value: 'static,
    {
        let command = ReversibleSetPropertyCommand::for_property(
            Arc::clone(target),
            Arc::new(accessor),
            value,
        )?;
        self.execute_command(command)
    }

    /// Undo the most recent command.
    ///
    /// Does nothing when the history is empty.
    ///
    /// # Errors
    ///
    /// Whatever the command's `undo()` returns. The command then stays on top
    /// of the history so the undo can be retried.
    pub fn undo_previous_command(&self) -> CommandResult {
        let _gate = self.undo_gate.lock().unwrap_or_else(|e| e.into_inner());

        let Some((id, description, command)) = self.peek_top() else {
            return Ok(());
        };

        let _span = debug_span!(
            "rewind.undo",
            session = %self.config.label,
            command = %description,
            entry_id = id,
        )
        .entered();

        let result = command.lock().unwrap_or_else(|e| e.into_inner()).undo_erased();

        match result {
            Ok(()) => {
                let depth = {
                    let mut history = self.lock_history();
                    if let Some(pos) = history.iter().rposition(|entry| entry.id == id) {
                        history.remove(pos);
                    }
                    history.len()
                };
                if self.config.trace_commands {
                    debug!(
                        target: LOG_TARGET,
                        session = %self.config.label,
                        entry_id = id,
                        undo_depth = depth,
                        "command undone"
                    );
                }
                Ok(())
            }
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    session = %self.config.label,
                    command = %description,
                    entry_id = id,
                    error = %err,
                    "undo failed; command kept for retry"
                );
                Err(err)
            }
        }
    }

    /// Undo commands until the history is empty.
    ///
    /// Returns how many commands were undone.
    ///
    /// # Errors
    ///
    /// Stops at the first failing undo and returns its error; the failing
    /// command and everything below it stay in the history.
    pub fn undo_all_commands(&self) -> CommandResult<usize> {
        let mut undone = 0;
        while self.has_commands_to_undo() {
            self.undo_previous_command()?;
            undone += 1;
        }
        Ok(undone)
    }

    /// Drop the whole history without undoing anything.
    pub fn clear(&self) {
        let dropped = {
            let mut history = self.lock_history();
            let dropped = history.len();
            history.clear();
            dropped
        };
        debug!(
            target: LOG_TARGET,
            session = %self.config.label,
            dropped = dropped,
            "history cleared"
        );
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of commands that can be undone.
    #[must_use]
    pub fn count_of_commands_to_undo(&self) -> usize {
        self.lock_history().len()
    }

    /// Whether any command can be undone.
    #[must_use]
    pub fn has_commands_to_undo(&self) -> bool {
        !self.lock_history().is_empty()
    }

    /// Description of the command the next undo would revert.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<String> {
        self.lock_history()
            .last()
            .map(|entry| entry.description.clone())
    }

    /// Descriptions of undoable commands, most recent first.
    #[must_use]
    pub fn undo_descriptions(&self, limit: usize) -> Vec<String> {
        self.lock_history()
            .iter()
            .rev()
            .take(limit)
            .map(|entry| entry.description.clone())
            .collect()
    }

    /// The manager configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn lock_history(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn peek_top(&self) -> Option<(u64, String, Arc<Mutex<Box<dyn ErasedUndo>>>)> {
        self.lock_history()
            .last()
            .map(|entry| (entry.id, entry.description.clone(), Arc::clone(&entry.command)))
    }
}

// ============================================================================
// Tests
// ============================================================================
