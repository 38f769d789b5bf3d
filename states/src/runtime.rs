use std::any::{Any, TypeId, type_name};
use std::collections::BTreeSet;

use flume::{Receiver, Sender};

use crate::{ComputeDeps, Graph, graph::TopologyError};

pub(crate) type Update = (TypeId, Box<dyn Any + Send>);

/// Sends replacement values for states and computes back to the owning
/// [`StateCtx`](crate::StateCtx).
///
/// Cloneable and `Send`, so background work can carry it. Values are applied on the
/// next [`StateCtx::sync_computes`](crate::StateCtx::sync_computes).
#[derive(Debug, Clone)]
pub struct Updater {
    send: Sender<Update>,
}

impl Updater {
    pub fn set<T: Any + Send>(&self, value: T) {
        if self
            .send
            .send((TypeId::of::<T>(), Box::new(value)))
            .is_err()
        {
            log::debug!(
                target: "shareasqr::states",
                "state context is gone, dropping update for {}",
                type_name::<T>()
            );
        }
    }
}

/// Update channel plus the compute dependency graph.
#[derive(Debug)]
pub struct StateRuntime {
    send: Sender<Update>,
    recv: Receiver<Update>,

    graph: Graph<TypeId>,
}

impl Default for StateRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl StateRuntime {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            send,
            recv,
            graph: Graph::new(),
        }
    }

    pub fn updater(&self) -> Updater {
        Updater {
            send: self.send.clone(),
        }
    }

    pub(crate) fn receiver(&self) -> &Receiver<Update> {
        &self.recv
    }

    pub fn record(&mut self, compute: TypeId, deps: &ComputeDeps) {
        for dep in deps.iter() {
            self.graph.route_to(*dep, compute);
        }
    }

    pub fn verify_deps(&self) -> Result<Vec<TypeId>, TopologyError<TypeId>> {
        self.graph.topology_sort()
    }

    pub fn dependents(&self, id: TypeId) -> BTreeSet<TypeId> {
        self.graph.dependents(id)
    }
}
