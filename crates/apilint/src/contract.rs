//! Trigger payload shapes and the input contract derived from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LintError;
use crate::resource::ApiDefinitionResource;

/// Descriptive fields of the changed definition, captured once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputContract {
    pub title: String,
    pub description: String,
    pub specification: SpecificationRef,
}

/// Specification type and version declared on the definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationRef {
    pub name: String,
    pub version: String,
}

/// One entry of `data.resources` in the change notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedResource {
    pub arm_resource: ArmResource,
}

/// The management-plane view of the changed definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ArmResource {
    pub id: String,
    pub properties: DefinitionProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionProperties {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub specification: SpecificationRef,
}

impl From<DefinitionProperties> for InputContract {
    fn from(props: DefinitionProperties) -> Self {
        Self {
            title: props.title,
            description: props.description,
            specification: props.specification,
        }
    }
}

/// A trigger that passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTrigger {
    pub contract: InputContract,
    pub resource: ApiDefinitionResource,
}

fn shape(reason: impl Into<String>) -> LintError {
    LintError::TriggerShape(reason.into())
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Check the event carries exactly one well-formed resource.
///
/// Performs no I/O, so a rejected trigger never reaches the network.
pub fn validate_trigger(event: Option<&Value>) -> Result<ValidatedTrigger, LintError> {
    let event = present(event).ok_or_else(|| shape("event payload is missing"))?;
    let data = present(event.get("data")).ok_or_else(|| shape("event has no data"))?;
    let resources = present(data.get("resources"))
        .ok_or_else(|| shape("event data has no resources"))?
        .as_array()
        .ok_or_else(|| shape("event data resources is not an array"))?;

    if resources.len() != 1 {
        return Err(shape(format!(
            "expected exactly one resource, found {}",
            resources.len()
        )));
    }

    let changed = ChangedResource::deserialize(&resources[0])
        .map_err(|e| shape(format!("malformed resource: {}", e)))?;

    let resource = changed
        .arm_resource
        .id
        .parse::<ApiDefinitionResource>()
        .map_err(|e| shape(format!("malformed resource id: {}", e)))?;

    Ok(ValidatedTrigger {
        contract: changed.arm_resource.properties.into(),
        resource,
    })
}
