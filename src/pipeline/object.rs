//! Data exchanged between pipeline stages

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, UnpackError};
use crate::source::Bundle;

/// Free-form template values
pub type Values = Map<String, Value>;

/// Object metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// A generic declarative object, such as a manifest read from a bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Every other top-level field, kept as-is
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl Object {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            metadata: ObjectMeta {
                name: name.into(),
                ..ObjectMeta::default()
            },
            content: Map::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Parse a multi-document YAML stream.
    ///
    /// Empty documents (for example a trailing `---`) are skipped.
    pub fn from_yaml_documents(input: &str, origin: &str) -> Result<Vec<Self>> {
        let mut objects = Vec::new();
        for document in serde_yaml::Deserializer::from_str(input) {
            let value = serde_yaml::Value::deserialize(document).map_err(|e| parse_error(origin, &e))?;
            if value.is_null() {
                continue;
            }
            objects.push(serde_yaml::from_value(value).map_err(|e| parse_error(origin, &e))?);
        }
        Ok(objects)
    }
}

fn parse_error(origin: &str, err: &serde_yaml::Error) -> UnpackError {
    UnpackError::ConfigParseFailed {
        path: origin.to_string(),
        reason: err.to_string(),
    }
}

/// A renderable package of templates, produced by the Process stage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub templates: Vec<Object>,
}

/// Request to deploy a bundle to a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDeployment {
    pub name: String,
    /// Which provisioner handles this deployment
    #[serde(default)]
    pub provisioner_class_name: String,
    /// The bundle to fetch, process and apply
    pub template: Bundle,
}

impl BundleDeployment {
    pub fn new(name: impl Into<String>, template: Bundle) -> Self {
        Self {
            name: name.into(),
            provisioner_class_name: String::new(),
            template,
        }
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        serde_yaml::from_str(input).map_err(|e| parse_error("<input>", &e))
    }
}
