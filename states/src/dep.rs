use std::{any::TypeId, collections::BTreeMap};

use crate::{Compute, State, error::Error};

/// Read-only view of the registered states and computes, handed to
/// [`Compute::compute`] and [`Command::run`](crate::Command::run).
pub struct Dep<'a> {
    states: &'a BTreeMap<TypeId, Box<dyn State>>,
    computes: &'a BTreeMap<TypeId, Box<dyn Compute>>,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(
        states: &'a BTreeMap<TypeId, Box<dyn State>>,
        computes: &'a BTreeMap<TypeId, Box<dyn Compute>>,
    ) -> Self {
        Self { states, computes }
    }

    pub fn get_state_ref<T: State>(&self) -> Result<&'a T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
            .ok_or_else(Error::state_not_found::<T>)
    }

    pub fn get_compute_ref<T: Compute>(&self) -> Result<&'a T, Error> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|compute| compute.as_any().downcast_ref::<T>())
            .ok_or_else(Error::compute_not_found::<T>)
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.states.contains_key(&id) || self.computes.contains_key(&id)
    }
}

impl std::fmt::Debug for Dep<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("states", &self.states.len())
            .field("computes", &self.computes.len())
            .finish()
    }
}
