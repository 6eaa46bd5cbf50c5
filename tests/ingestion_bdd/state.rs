//! Scenario state for the ingestion BDD tests.

use std::rc::Rc;

use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tallyman::{IngestionFailure, IngestionReport};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::MockServer;

use crate::support::{create_temp_dir, database_url_in};

/// Runtime handle that can live in a `Slot` and be cloned into steps.
pub(crate) type SharedRuntime = Rc<Runtime>;

#[derive(ScenarioState, Default)]
pub(crate) struct IngestionState {
    pub(crate) runtime: Slot<SharedRuntime>,
    pub(crate) server: Slot<MockServer>,
    pub(crate) temp_dir: Slot<TempDir>,
    pub(crate) database_url: Slot<String>,
    pub(crate) per_page: Slot<u32>,
    pub(crate) outcome: Slot<Result<IngestionReport, IngestionFailure>>,
}

impl IngestionState {
    /// The scenario's runtime.
    pub(crate) fn runtime(&self) -> SharedRuntime {
        self.runtime
            .get()
            .unwrap_or_else(|| panic!("runtime not initialised"))
    }
}

/// Starts the runtime and mock server and picks a fresh database file,
/// once per scenario.
pub(crate) fn ensure_runtime_and_server(state: &IngestionState) {
    if state.runtime.with_ref(|_| ()).is_none() {
        let runtime =
            Runtime::new().unwrap_or_else(|error| panic!("failed to create Tokio runtime: {error}"));
        state.runtime.set(Rc::new(runtime));
    }
    let runtime = state.runtime();

    if state.server.with_ref(|_| ()).is_none() {
        state.server.set(runtime.block_on(MockServer::start()));
    }

    if state.temp_dir.with_ref(|_| ()).is_none() {
        let temp_dir = create_temp_dir()
            .unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"));
        state
            .database_url
            .set(database_url_in(&temp_dir, "ingestion.sqlite"));
        state.temp_dir.set(temp_dir);
    }
}
