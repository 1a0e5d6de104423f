#![forbid(unsafe_code)]

//! Property mutation commands.
//!
//! A [`PropertyAccessor`] is a typed get/set pair bound to one property of a
//! target type. [`SetPropertyCommand`] applies a new value through it, and
//! [`ReversibleSetPropertyCommand`] additionally snapshots the old value into
//! an inverse command at the moment it executes.
//!
//! Targets are shared with the caller as [`SharedTarget`] handles; commands
//! never take exclusive ownership of the object they mutate.
//!
//! ```text
//! execute()                               undo()
//! ┌──────────────────────────────────┐    ┌─────────────────────────────┐
//! │ lock target                      │    │ inverse.execute()           │
//! │   captured = accessor.get(t)     │    │   accessor.set(t, captured) │
//! │   inverse  = Set(t, captured)    │    └─────────────────────────────┘
//! │   accessor.set(t, new_value)     │
//! │ unlock                           │
//! └──────────────────────────────────┘
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use super::command::{Command, CommandError, CommandResult, ReversibleCommand};

/// Handle to a target object shared between the caller and its commands.
pub type SharedTarget<T> = Arc<Mutex<T>>;

/// Wrap a value in a [`SharedTarget`].
#[must_use]
pub fn shared<T>(target: T) -> SharedTarget<T> {
    Arc::new(Mutex::new(target))
}

/// Lock a shared target, recovering the guard if a previous holder panicked.
pub(crate) fn lock_target<T>(target: &SharedTarget<T>) -> MutexGuard<'_, T> {
    target.lock().unwrap_or_else(|e| e.into_inner())
}

/// A get/set capability bound to one named property of `T`.
pub trait PropertyAccessor<T>: Send + Sync {
    /// Type of the property value.
    type Value: Clone + Send;

    /// Logical property name.
    fn name(&self) -> &str;

    /// Read the property.
    fn get(&self, target: &T) -> Self::Value;

    /// Write the property.
    fn set(&self, target: &mut T, value: Self::Value);
}

type Getter<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;
type Setter<T, V> = Arc<dyn Fn(&mut T, V) + Send + Sync>;

/// Closure-backed [`PropertyAccessor`].
///
/// Usually produced by the [`property!`](crate::property!) macro.
pub struct Property<T, V> {
    name: Cow<'static, str>,
    getter: Getter<T, V>,
    setter: Setter<T, V>,
}

impl<T, V> Property<T, V> {
    /// Create an accessor from a name and a getter/setter pair.
    pub fn new<G, S>(name: impl Into<Cow<'static, str>>, getter: G, setter: S) -> Self
    where
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            getter: Arc::new(getter),
            setter: Arc::new(setter),
        }
    }
}

impl<T, V> Clone for Property<T, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            getter: Arc::clone(&self.getter),
            setter: Arc::clone(&self.setter),
        }
    }
}

impl<T, V> fmt::Debug for Property<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property").field("name", &self.name).finish()
    }
}

impl<T, V: Clone + Send> PropertyAccessor<T> for Property<T, V> {
    type Value = V;

    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, target: &T) -> V {
        (self.getter)(target)
    }

    fn set(&self, target: &mut T, value: V) {
        (self.setter)(target, value);
    }
}

/// Build a [`Property`] accessor from a field path.
///
/// ```
/// use rewind_core::property;
/// use rewind_core::property::PropertyAccessor;
///
/// #[derive(Default)]
/// struct Window { size: Size }
/// #[derive(Default)]
/// struct Size { width: u32 }
///
/// let width = property!(Window, size.width);
/// let mut w = Window::default();
/// width.set(&mut w, 640);
/// assert_eq!(width.get(&w), 640);
/// assert_eq!(width.name(), "size.width");
/// ```
#[macro_export]
macro_rules! property {
    ($target:ty, $first:ident $(. $rest:ident)*) => {
        $crate::property::Property::<$target, _>::new(
            concat!(stringify!($first) $(, ".", stringify!($rest))*),
            |t: &$target| ::std::clone::Clone::clone(&t.$first $(.$rest)*),
            |t: &mut $target, value| t.$first $(.$rest)* = value,
        )
    };
}

// ============================================================================
// Forward command
// ============================================================================

/// Sets a property on a shared target to a fixed value.
///
/// Has no inverse of its own; see [`ReversibleSetPropertyCommand`].
pub struct SetPropertyCommand<T, A: PropertyAccessor<T>> {
    target: SharedTarget<T>,
    accessor: Arc<A>,
    new_value: A::Value,
    description: String,
}

impl<T, A: PropertyAccessor<T>> SetPropertyCommand<T, A> {
    /// Create a command that assigns `new_value` through `accessor`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidArgument`] when the accessor does not
    /// name a property.
    pub fn new(
        target: SharedTarget<T>,
        accessor: Arc<A>,
        new_value: A::Value,
    ) -> CommandResult<Self> {
        if accessor.name().trim().is_empty() {
            return Err(CommandError::InvalidArgument("accessor"));
        }
        Ok(Self::assemble(target, accessor, new_value))
    }

    fn assemble(target: SharedTarget<T>, accessor: Arc<A>, new_value: A::Value) -> Self {
        let description = format!("Set {}", accessor.name());
        Self {
            target,
            accessor,
            new_value,
            description,
        }
    }

    /// Sibling command on the same target and accessor with another value.
    fn with_value(&self, value: A::Value) -> Self {
        Self::assemble(Arc::clone(&self.target), Arc::clone(&self.accessor), value)
    }

    /// Apply the new value to an already locked target.
    fn apply(&self, target: &mut T) {
        self.accessor.set(target, self.new_value.clone());
    }

    /// The shared target.
    #[must_use]
    pub fn target(&self) -> &SharedTarget<T> {
        &self.target
    }

    /// The property accessor.
    #[must_use]
    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// The value this command assigns.
    #[must_use]
    pub fn new_value(&self) -> &A::Value {
        &self.new_value
    }
}

impl<T, A: PropertyAccessor<T>> Clone for SetPropertyCommand<T, A> {
    fn clone(&self) -> Self {
        self.with_value(self.new_value.clone())
    }
}

impl<T, A> fmt::Debug for SetPropertyCommand<T, A>
where
    A: PropertyAccessor<T>,
    A::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetPropertyCommand")
            .field("property", &self.accessor.name())
            .field("new_value", &self.new_value)
            .finish()
    }
}

impl<T, A: PropertyAccessor<T>> Command for SetPropertyCommand<T, A> {
    type Output = ();

    fn execute_core(&mut self) -> CommandResult {
        let mut target = lock_target(&self.target);
        self.apply(&mut target);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ============================================================================
// Reversible command
// ============================================================================

/// Sets a property and can put the previous value back.
///
/// The previous value is captured inside every `execute()`, immediately before
/// the new value is applied and under the same target lock. Nothing is read at
/// construction time, so callers must not rely on the value the property had
/// when the command was built.
///
/// `undo()` before the first `execute()` is vetoed and does nothing.
pub struct ReversibleSetPropertyCommand<T, A: PropertyAccessor<T>> {
    forward: SetPropertyCommand<T, A>,
    inverse: Option<SetPropertyCommand<T, A>>,
}

impl<T, A: PropertyAccessor<T>> ReversibleSetPropertyCommand<T, A> {
    /// Wrap an existing forward command.
    #[must_use]
    pub fn new(forward: SetPropertyCommand<T, A>) -> Self {
        Self {
            forward,
            inverse: None,
        }
    }

    /// Build the forward command and wrap it.
    ///
    /// # Errors
    ///
    /// Same as [`SetPropertyCommand::new`].
    pub fn for_property(
        target: SharedTarget<T>,
        accessor: Arc<A>,
        new_value: A::Value,
    ) -> CommandResult<Self> {
        SetPropertyCommand::new(target, accessor, new_value).map(Self::new)
    }

    /// The forward command.
    #[must_use]
    pub fn forward(&self) -> &SetPropertyCommand<T, A> {
        &self.forward
    }

    /// The inverse captured by the most recent `execute()`, if any.
    #[must_use]
    pub fn inverse(&self) -> Option<&SetPropertyCommand<T, A>> {
        self.inverse.as_ref()
    }

    /// The value the property held right before the most recent `execute()`.
    #[must_use]
    pub fn captured_value(&self) -> Option<&A::Value> {
        self.inverse.as_ref().map(SetPropertyCommand::new_value)
    }
}

impl<T, A> fmt::Debug for ReversibleSetPropertyCommand<T, A>
where
    A: PropertyAccessor<T>,
    A::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReversibleSetPropertyCommand")
            .field("property", &self.forward.accessor.name())
            .field("new_value", &self.forward.new_value)
            .field("captured", &self.captured_value())
            .finish()
    }
}

impl<T, A: PropertyAccessor<T>> Command for ReversibleSetPropertyCommand<T, A> {
    type Output = ();

    fn execute_core(&mut self) -> CommandResult {
        let mut target = lock_target(&self.forward.target);
        let previous = self.forward.accessor.get(&target);
        self.inverse = Some(self.forward.with_value(previous));
        self.forward.apply(&mut target);
        Ok(())
    }

    fn description(&self) -> &str {
        self.forward.description()
    }
}

impl<T, A: PropertyAccessor<T>> ReversibleCommand for ReversibleSetPropertyCommand<T, A> {
    fn can_undo(&self) -> bool {
        self.inverse.is_some()
    }

    fn undo_core(&mut self) -> CommandResult {
        match self.inverse.as_mut() {
            Some(inverse) => inverse.execute(),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
