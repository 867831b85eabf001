use std::any::Any;

/// Snapshot support for states and computes.
///
/// Commands run on background tasks and therefore receive *clones* of the
/// current state world, not references into it. A type that returns `None`
/// here is invisible to command snapshots.
pub trait SnapshotClone {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>>;
}

/// A piece of plain application state held by the [`StateCtx`].
///
/// States are written synchronously from the UI thread (form inputs, route,
/// configuration) and read by commands through snapshots.
///
/// [`StateCtx`]: crate::StateCtx
pub trait State: Any + Send + SnapshotClone {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Replaces `self` with a boxed new value of the same concrete type.
    ///
    /// Implementations normally delegate to [`state_assign_impl`].
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Default `assign_box` body for [`State`] implementations.
///
/// A box of the wrong concrete type is ignored rather than panicking; the
/// mismatch is a wiring bug that must not take the UI down.
pub fn state_assign_impl<T: State + Sized>(slot: &mut T, new_self: Box<dyn Any + Send>) {
    if let Ok(value) = new_self.downcast::<T>() {
        *slot = *value;
    } else {
        log::error!(
            "assign_box: dropped value of unexpected type for {}",
            std::any::type_name::<T>()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        value: i32,
    }

    impl SnapshotClone for Counter {
        fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }
    }

    impl State for Counter {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            state_assign_impl(self, new_self);
        }
    }

    #[test]
    fn assign_replaces_value() {
        let mut state = Counter { value: 1 };
        state.assign_box(Box::new(Counter { value: 7 }));
        assert_eq!(state, Counter { value: 7 });
    }

    #[test]
    fn assign_ignores_foreign_type() {
        let mut state = Counter { value: 1 };
        state.assign_box(Box::new("not a counter"));
        assert_eq!(state, Counter { value: 1 });
    }
}
