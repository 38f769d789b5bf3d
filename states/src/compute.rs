use std::any::{Any, TypeId, type_name};

use crate::{Dep, State, Updater};

/// The states and computes a [`Compute`] reads.
///
/// When any of them changes, the compute is marked dirty and re-run by
/// [`StateCtx::run_computed`](crate::StateCtx::run_computed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputeDeps {
    states: Vec<TypeId>,
    computes: Vec<TypeId>,
}

impl ComputeDeps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state<T: State>(mut self) -> Self {
        self.states.push(TypeId::of::<T>());
        self
    }

    pub fn compute<T: Compute>(mut self) -> Self {
        self.computes.push(TypeId::of::<T>());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeId> {
        self.states.iter().chain(self.computes.iter())
    }
}

/// Derived value that is recomputed when its dependencies change.
///
/// `compute` must not block: long work is handed off (see [`spawn_work`](crate::spawn_work))
/// and its result published with [`Updater::set`].
pub trait Compute: Any {
    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>, updater: Updater);

    fn as_any(&self) -> &dyn Any;

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Default [`Compute::assign_box`] body: downcast and overwrite.
pub fn assign_impl<T: Compute>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *target = *value,
        Err(_) => log::warn!(
            target: "shareasqr::states",
            "dropped update with mismatched type for compute {}",
            type_name::<T>()
        ),
    }
}
