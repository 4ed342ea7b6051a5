//! Generation snapshots
//!
//! Renderers consume a finished generation together with the module names, so a snapshot
//! records each module's id, its registered name and its parameters. Ids without a name
//! are kept with `name: null` and left for the renderer to ignore.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::{Generation, ModuleId};
use crate::expression::Scalar;
use crate::grammar::ModuleNames;

/// Serialization format of a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug)]
pub enum ExportError {
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Json(err) => write!(f, "JSON export failed: {}", err),
            ExportError::Yaml(err) => write!(f, "YAML export failed: {}", err),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Json(err) => Some(err),
            ExportError::Yaml(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Json(err)
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        ExportError::Yaml(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSnapshot<T> {
    pub id: ModuleId,
    pub name: Option<String>,
    pub parameters: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSnapshot<T> {
    pub age: usize,
    pub modules: Vec<ModuleSnapshot<T>>,
}

impl<T: Scalar> GenerationSnapshot<T> {
    pub fn capture(generation: &Generation<T>, names: &ModuleNames) -> Self {
        let modules = generation
            .iter()
            .map(|module| ModuleSnapshot {
                id: module.id,
                name: names.name_of(module.id).map(str::to_string),
                parameters: module.parameters.clone(),
            })
            .collect();
        Self {
            age: generation.age(),
            modules,
        }
    }

    /// Serialize in `format`; `pretty` only affects JSON
    pub fn render(&self, format: ExportFormat, pretty: bool) -> Result<String, ExportError> {
        let rendered = match format {
            ExportFormat::Json if pretty => serde_json::to_string_pretty(self)?,
            ExportFormat::Json => serde_json::to_string(self)?,
            ExportFormat::Yaml => serde_yaml::to_string(self)?,
        };
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Module;

    #[test]
    fn test_unknown_ids_have_no_name() {
        let names = ModuleNames::from_names(["F"]).unwrap();
        let generation = Generation::new(vec![Module::new(0, vec![1i64]), Module::bare(7)], 2);
        let snapshot = GenerationSnapshot::capture(&generation, &names);
        assert_eq!(snapshot.age, 2);
        assert_eq!(snapshot.modules[0].name.as_deref(), Some("F"));
        assert_eq!(snapshot.modules[1].name, None);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(
            serde_json::from_str::<ExportFormat>(r#""yaml""#).unwrap(),
            ExportFormat::Yaml
        );
        assert_eq!(ExportFormat::default(), ExportFormat::Json);
    }
}
