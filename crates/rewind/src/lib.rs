#![forbid(unsafe_code)]

//! rewind public facade crate.
//!
//! Re-exports the command engine from `rewind-core` and, with the `retry`
//! feature (on by default), the transient-fault helpers from `rewind-retry`.
//! Most applications only need the [`prelude`].
//!
//! ```
//! use rewind::prelude::*;
//!
//! struct Wizard { step: u8, name: String }
//!
//! let manager = CommandManager::default();
//! let wizard = shared(Wizard { step: 0, name: String::new() });
//!
//! manager.execute_set_property(&wizard, property!(Wizard, step), 1)?;
//! manager.execute_set_property(&wizard, property!(Wizard, name), "Ada".to_string())?;
//!
//! // Back out of the whole wizard.
//! assert_eq!(manager.undo_all_commands()?, 2);
//! assert_eq!(wizard.lock().unwrap().step, 0);
//! assert!(wizard.lock().unwrap().name.is_empty());
//! # Ok::<(), CommandError>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use rewind_core::{
    Command, CommandError, CommandManager, CommandResult, ConfigError, ExecuteFn, FnCommand,
    ManagerConfig, Property, PropertyAccessor, ReversibleCommand, ReversibleSetPropertyCommand,
    SetPropertyCommand, SharedTarget, UndoFn, property, shared,
};

// --- Retry re-exports ------------------------------------------------------

#[cfg(feature = "retry")]
pub use rewind_retry::{BackoffStrategy, BoundedRetry, RetryPolicy};

// --- Crate re-exports ------------------------------------------------------

pub use rewind_core as core;
#[cfg(feature = "retry")]
pub use rewind_retry as retry;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        Command, CommandError, CommandManager, CommandResult, FnCommand, ManagerConfig,
        PropertyAccessor, ReversibleCommand, SharedTarget, property, shared,
    };

    #[cfg(feature = "retry")]
    pub use crate::{BackoffStrategy, BoundedRetry, RetryPolicy};
}
