#![forbid(unsafe_code)]

//! Reversible command engine.
//!
//! Apply a sequence of mutations to live objects and revert them later in
//! exact reverse order, without the caller tracking what changed.
//!
//! # Key Components
//!
//! - [`Command`] / [`ReversibleCommand`] - guarded execute and undo contracts
//! - [`SetPropertyCommand`] - assigns one property through a [`PropertyAccessor`]
//! - [`ReversibleSetPropertyCommand`] - snapshots the old value when it executes
//! - [`CommandManager`] - executes commands and keeps a LIFO undo history
//! - [`property!`] - derives a [`Property`] accessor from a field path
//!
//! # Quick Start
//!
//! ```
//! use rewind_core::{CommandManager, property, shared};
//!
//! #[derive(Default)]
//! struct Doc { zoom: u32 }
//!
//! let manager = CommandManager::default();
//! let doc = shared(Doc { zoom: 1 });
//!
//! manager.execute_set_property(&doc, property!(Doc, zoom), 100)?;
//! manager.execute_set_property(&doc, property!(Doc, zoom), 200)?;
//! manager.undo_previous_command()?;
//! assert_eq!(doc.lock().unwrap().zoom, 100);
//! manager.undo_previous_command()?;
//! assert_eq!(doc.lock().unwrap().zoom, 1);
//! # Ok::<(), rewind_core::CommandError>(())
//! ```

pub mod command;
pub mod config;
pub mod manager;
pub mod property;

pub use command::{
    Command, CommandError, CommandResult, ExecuteFn, FnCommand, ReversibleCommand, UndoFn,
};
pub use config::{ConfigError, ManagerConfig};
pub use manager::CommandManager;
pub use property::{
    Property, PropertyAccessor, ReversibleSetPropertyCommand, SetPropertyCommand, SharedTarget,
    shared,
};
