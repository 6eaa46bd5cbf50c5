//! Support code for the ingestion BDD tests.

pub(crate) mod harness;
pub(crate) mod state;

pub(crate) use harness::{
    PULLS_PATH, detail_path, mount, mount_listing, requests_for_page, run_ingestion, stored,
    stored_count,
};
pub(crate) use state::{IngestionState, ensure_runtime_and_server};
