use std::any::Any;

use crate::{Dep, Updater};

/// One-shot action dispatched from the UI through [`StateCtx::dispatch`](crate::StateCtx::dispatch).
///
/// Commands read the current snapshot through [`Dep`] and publish their
/// effects through the [`Updater`], same as computes. Unlike computes they
/// only run when asked to.
pub trait Command: Any {
    fn run(&self, deps: Dep<'_>, updater: Updater);
}
