use std::any::{Any, type_name};

/// A plain value owned by [`StateCtx`](crate::StateCtx).
///
/// States are written from the UI thread through [`StateCtx::update`](crate::StateCtx::update)
/// or from background work through an [`Updater`](crate::Updater). Every write marks the
/// computes depending on the state as dirty.
pub trait State: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Replace `self` with a value that arrived through an [`Updater`](crate::Updater).
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Default [`State::assign_box`] body: downcast and overwrite.
pub fn state_assign_impl<T: State>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *target = *value,
        Err(_) => log::warn!(
            target: "shareasqr::states",
            "dropped update with mismatched type for state {}",
            type_name::<T>()
        ),
    }
}
