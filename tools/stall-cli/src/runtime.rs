//! Glue between the checkout coordinator and the tokio runtime.

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};

/// Spawns coordinator tasks with `tokio::task::spawn_local`.
///
/// Must only be used from inside a [`tokio::task::LocalSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTaskSpawner;

impl LocalSpawn for LocalTaskSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        tokio::task::spawn_local(future);
        Ok(())
    }
}
