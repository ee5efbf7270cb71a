pub mod config_cmd;
pub mod run_cmd;
pub mod status;

use sessionbridge_core::{Config, Paths};
use sessionbridge_storage::{FileKvStore, StateStore};
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) fn open_state_store(config: &Config, paths: &Paths) -> Arc<StateStore> {
    let state_file = config
        .state_file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| paths.state_file());
    Arc::new(StateStore::new(Arc::new(FileKvStore::new(state_file))))
}
