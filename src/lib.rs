//! Shared helpers for the workspace integration tests.

use std::path::PathBuf;

/// Backend snapshot used by the scenario tests and the CLI end-to-end tests.
pub const BACKEND_FIXTURE: &str = "backend_fixture.json";

/// Path of a file under `tests/testdata`.
#[must_use]
pub fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
}
