//! Test harnesses for the apilint pipeline.
//!
//! Provides `MockManagementPlane` (a wiremock stand-in for the export and
//! report endpoints), `StubEngine` for canned lint output, and trigger fixtures.

pub mod engine;
pub mod fixtures;
pub mod management;

#[cfg(test)]
mod pipeline;

pub use engine::StubEngine;
pub use fixtures::{definition_event, event_with_resources, packaged_ruleset, RESOURCE_ID};
pub use management::MockManagementPlane;
