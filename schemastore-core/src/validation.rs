//! Schema compilation and item validation.
//!
//! Schemas are compiled with the [`jsonschema`] crate, which also checks the schema
//! itself against its meta-schema. A compiled schema validates an item and reports
//! every violated rule, not just the first one.
//!
//! # Example
//!
//! ```ignore
//! use schemastore_core::validation::CompiledSchema;
//! use serde_json::json;
//!
//! let schema = CompiledSchema::compile(json!({
//!     "type": "object",
//!     "required": ["firstName"],
//! }).as_object().unwrap())?;
//!
//! let errors = schema.validate(&serde_json::Map::new()).unwrap_err();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors.issues()[0].keyword, "required");
//! ```

use std::fmt::{self, Debug, Display};

use jsonschema::{ValidationError, Validator, error::ValidationErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    collection::Schema,
    error::{StoreError, StoreResult},
    item::Item,
};

/// Keywords whose value maps names to subschemas.
const SUBSCHEMA_MAPS: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// A JSON Schema compiled and ready to validate items.
///
/// `format` is always asserted, whatever draft the schema declares.
pub struct CompiledSchema {
    validator: Validator,
}

impl CompiledSchema {
    /// Compiles a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaCompile`] when the document is not a valid JSON Schema.
    pub fn compile(schema: &Schema) -> StoreResult<Self> {
        let document = Value::Object(schema.clone());
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(&document)
            .map_err(|err| StoreError::SchemaCompile(err.to_string()))?;

        Ok(Self { validator })
    }

    /// Validates an item, collecting every violation in document order.
    pub fn validate(&self, item: &Item) -> Result<(), ValidationErrors> {
        let instance = Value::Object(item.clone());
        let issues = self
            .validator
            .iter_errors(&instance)
            .map(|err| ValidationIssue::from(&err))
            .collect::<Vec<_>>();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(issues))
        }
    }

    /// Returns `true` if the item satisfies the schema.
    pub fn is_valid(&self, item: &Item) -> bool {
        self.validator.is_valid(&Value::Object(item.clone()))
    }
}

impl Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema").finish_non_exhaustive()
    }
}

/// A single violated schema rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value inside the item (empty for the root).
    pub instance_path: String,
    /// JSON pointer to the rule inside the schema.
    pub schema_path: String,
    /// The schema keyword that failed, e.g. `required` or `minLength`.
    pub keyword: String,
    /// Human readable description of the violation.
    pub message: String,
}

impl<'a> From<&ValidationError<'a>> for ValidationIssue {
    fn from(err: &ValidationError<'a>) -> Self {
        let schema_path = err.schema_path.to_string();
        let keyword = keyword_of(
            &schema_path,
            matches!(err.kind, ValidationErrorKind::FalseSchema),
        )
        .to_string();

        Self {
            instance_path: err.instance_path.to_string(),
            schema_path,
            keyword,
            message: err.to_string(),
        }
    }
}

/// The failing keyword is the last schema path segment, except for `false`
/// subschemas, whose leaf is a property name or index under the real keyword.
fn keyword_of(schema_path: &str, false_schema: bool) -> &str {
    let mut segments = schema_path.rsplit('/');
    let leaf = segments.next().unwrap_or_default();

    if false_schema {
        if let Some(parent) = segments.next() {
            if SUBSCHEMA_MAPS.contains(&parent) || leaf.parse::<usize>().is_ok() {
                return parent;
            }
        }
    }

    leaf
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.instance_path.is_empty() {
            "/"
        } else {
            &self.instance_path
        };

        write!(f, "{path}: {}", self.message)
    }
}

/// The ordered list of every rule an item violates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self(issues)
    }

    /// The individual violations, in the order the validator reported them.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationIssue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<ValidationIssue> {
        self.0
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.0 {
            writeln!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationIssue;
    type IntoIter = std::vec::IntoIter<ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
