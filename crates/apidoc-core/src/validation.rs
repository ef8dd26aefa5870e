//! Result schema validation and path checks.

use crate::error::{Error, Result};
use crate::types::AnalysisResult;
use serde_json::Value;
use std::path::Path;

/// JSON Schema every persisted [`AnalysisResult`] must conform to.
pub const ANALYSIS_RESULT_SCHEMA: &str = include_str!("../schema/analysis-result.schema.json");

/// Validator for assembled analysis records.
///
/// Wraps a compiled `jsonschema` validator for [`ANALYSIS_RESULT_SCHEMA`].
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compiles the built-in result schema.
    pub fn new() -> Result<Self> {
        let schema: Value = serde_json::from_str(ANALYSIS_RESULT_SCHEMA)?;
        Self::with_schema(&schema)
    }

    /// Compiles a custom schema.
    pub fn with_schema(schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema).map_err(|e| Error::Validation {
            errors: vec![format!("invalid schema: {}", e)],
        })?;
        Ok(Self { validator })
    }

    /// Validates an arbitrary value, collecting every violation.
    pub fn validate_value(&self, value: &Value) -> Result<()> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|e| e.to_string())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { errors })
        }
    }

    /// Validates an assembled result in its serialized shape.
    pub fn validate(&self, result: &AnalysisResult) -> Result<()> {
        let value = serde_json::to_value(result)?;
        self.validate_value(&value)
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

/// Validates that path is within root (prevents path traversal)
pub fn validate_path(path: &Path, root: &Path) -> Result<()> {
    let canonical_path = path.canonicalize().map_err(|e| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: format!("Cannot canonicalize: {}", e),
    })?;

    let canonical_root = root.canonicalize().map_err(|e| Error::InvalidPath {
        path: root.to_path_buf(),
        reason: format!("Cannot canonicalize root: {}", e),
    })?;

    if !canonical_path.starts_with(&canonical_root) {
        return Err(Error::PathTraversal {
            attempted_path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NamespaceDoc, Platform, PlatformDocTree};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn sample_result() -> AnalysisResult {
        let mut codox = BTreeMap::new();
        codox.insert(
            Platform::Clj,
            PlatformDocTree {
                namespaces: vec![NamespaceDoc::new("foo.core")],
            },
        );
        AnalysisResult {
            group_id: "foo".to_string(),
            artifact_id: "foo".to_string(),
            version: "0.1.0".to_string(),
            codox,
            pom_str: String::new(),
        }
    }

    #[test]
    fn test_valid_result_passes() {
        let validator = SchemaValidator::new().unwrap();
        assert!(validator.validate(&sample_result()).is_ok());
    }

    #[test]
    fn test_codox_shaped_tree_passes() {
        let validator = SchemaValidator::new().unwrap();
        let mut value = serde_json::to_value(sample_result()).unwrap();
        value["codox"]["clj"] = json!([{
            "name": "foo.core",
            "doc": null,
            "publics": [
                {"name": "f", "arglists": [["x"], ["x", "&", "more"]], "line": "12"},
                {"name": "g", "arglists": ["[x]"], "line": 3, "deprecated": "0.2"}
            ]
        }]);
        assert!(validator.validate_value(&value).is_ok());
    }

    #[test]
    fn test_shape_constraints_live_in_schema() {
        let validator = SchemaValidator::new().unwrap();
        let mut value = serde_json::to_value(sample_result()).unwrap();
        value["codox"]["clj"][0]["doc"] = json!(42);
        assert!(matches!(
            validator.validate_value(&value),
            Err(Error::Validation { .. })
        ));

        let mut value = serde_json::to_value(sample_result()).unwrap();
        value["codox"]["clj"][0]["publics"] = json!([{"name": "f", "arglists": 7}]);
        assert!(validator.validate_value(&value).is_err());
    }

    #[test]
    fn test_missing_version_fails() {
        let validator = SchemaValidator::new().unwrap();
        let mut value = serde_json::to_value(sample_result()).unwrap();
        value.as_object_mut().unwrap().remove("version");

        let err = validator.validate_value(&value).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_empty_version_fails() {
        let validator = SchemaValidator::new().unwrap();
        let mut result = sample_result();
        result.version = String::new();
        assert!(validator.validate(&result).is_err());
    }

    #[test]
    fn test_unexpected_top_level_key_fails() {
        let validator = SchemaValidator::new().unwrap();
        let mut value = serde_json::to_value(sample_result()).unwrap();
        value["extra"] = json!(1);
        assert!(validator.validate_value(&value).is_err());
    }

    #[test]
    fn test_unknown_platform_key_fails() {
        let validator = SchemaValidator::new().unwrap();
        let mut value = serde_json::to_value(sample_result()).unwrap();
        value["codox"]["cljr"] = json!([]);
        assert!(validator.validate_value(&value).is_err());
    }

    #[test]
    fn test_namespace_without_name_fails() {
        let validator = SchemaValidator::new().unwrap();
        let mut value = serde_json::to_value(sample_result()).unwrap();
        value["codox"]["clj"] = json!([{"publics": []}]);
        assert!(validator.validate_value(&value).is_err());
    }

    #[test]
    fn test_valid_path() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let valid_path = root.join("foo/bar/0.1.0/apidoc.json");

        fs::create_dir_all(valid_path.parent().unwrap()).unwrap();
        fs::write(&valid_path, "").unwrap();

        assert!(validate_path(&valid_path, root).is_ok());
    }

    #[test]
    fn test_path_traversal_blocked() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("output");
        fs::create_dir_all(&root).unwrap();

        let outside_file = temp.path().join("outside.json");
        fs::write(&outside_file, "").unwrap();

        let result = validate_path(&outside_file, &root);
        assert!(matches!(result.unwrap_err(), Error::PathTraversal { .. }));
    }
}
