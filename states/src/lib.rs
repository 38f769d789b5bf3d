//! Reactive state runtime for Share as QR.
//!
//! [`State`]s are plain values, [`Compute`]s are derived values that re-run when
//! the states they read change, and [`Command`]s are one-shot actions. Everything
//! lives in a [`StateCtx`]; background work reports back through an [`Updater`].

mod command;
mod compute;
mod ctx;
mod dep;
mod error;
mod graph;
mod runtime;
mod state;
mod state_sync_status;
mod task;

pub use command::Command;
pub use compute::{Compute, ComputeDeps, assign_impl};
pub use ctx::StateCtx;
pub use dep::Dep;
pub use error::Error;
pub use graph::{DepRoute, Graph, TopologyError};
pub use runtime::{StateRuntime, Updater};
pub use state::{State, state_assign_impl};
pub use state_sync_status::StateSyncStatus;
pub use task::{TaskHandle, TaskId, spawn_work};
