//! Named validation schemas for annotation payloads
//!
//! A [`SchemaRegistry`] is passed explicitly to every component that needs
//! schema resolution. It always holds a `"default"` schema, which starts out
//! as the active one.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};

use crate::error::SchemaError;
use crate::model::Metadata;

pub const DEFAULT_SCHEMA_NAME: &str = "default";
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0.0";

/// Primitive JSON types a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Boolean,
    Number,
    Integer,
    Null,
}

/// Shape of one schema field, resolved once when the schema is built.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    Scalar(ScalarType),
    List(Option<Box<FieldSpec>>),
    Object(BTreeMap<String, FieldSpec>),
    /// No usable `type`; any JSON value is accepted.
    Untyped,
}

impl FieldSpec {
    pub fn resolve(definition: &Value) -> Self {
        let declared: Vec<&str> = match definition.get("type") {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };

        if declared.contains(&"object") || (declared.is_empty() && definition.get("properties").is_some()) {
            return FieldSpec::Object(resolve_properties(definition));
        }
        if declared.contains(&"array") {
            let items = definition
                .get("items")
                .map(|items| Box::new(FieldSpec::resolve(items)));
            return FieldSpec::List(items);
        }
        match declared.first() {
            Some(&"string") => FieldSpec::Scalar(ScalarType::String),
            Some(&"boolean") => FieldSpec::Scalar(ScalarType::Boolean),
            Some(&"number") => FieldSpec::Scalar(ScalarType::Number),
            Some(&"integer") => FieldSpec::Scalar(ScalarType::Integer),
            Some(&"null") => FieldSpec::Scalar(ScalarType::Null),
            _ => FieldSpec::Untyped,
        }
    }

    /// Whether a value of this field may be a JSON object.
    pub fn can_hold_object(&self) -> bool {
        matches!(self, FieldSpec::Object(_) | FieldSpec::Untyped)
    }

    /// Nested sub-fields, for object fields.
    pub fn properties(&self) -> Option<&BTreeMap<String, FieldSpec>> {
        match self {
            FieldSpec::Object(props) => Some(props),
            _ => None,
        }
    }
}

fn resolve_properties(definition: &Value) -> BTreeMap<String, FieldSpec> {
    definition
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, spec)| (name.clone(), FieldSpec::resolve(spec)))
                .collect()
        })
        .unwrap_or_default()
}

/// A named JSON-Schema plus its resolved field table.
#[derive(Clone)]
pub struct Schema {
    name: String,
    description: String,
    version: String,
    definition: Value,
    fields: BTreeMap<String, FieldSpec>,
    entity_fields: Vec<String>,
    validator: Arc<JSONSchema>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Schema {
    /// Compile a JSON-Schema (draft 7) definition under the given name.
    pub fn new(name: impl Into<String>, definition: Value) -> Result<Self, SchemaError> {
        let name = name.into();
        let validator = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&definition)
            .map_err(|e| SchemaError::InvalidDefinition {
                name: name.clone(),
                message: e.to_string(),
            })?;

        let fields = resolve_properties(&definition);
        let entity_fields = fields
            .iter()
            .filter(|(_, spec)| spec.can_hold_object())
            .map(|(name, _)| name.clone())
            .collect();

        Ok(Schema {
            name,
            description: String::new(),
            version: DEFAULT_SCHEMA_VERSION.to_string(),
            definition,
            fields,
            entity_fields,
            validator: Arc::new(validator),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Build from a `{name, schema, description, version}` document.
    pub fn from_definition(document: &Value) -> Result<Self, SchemaError> {
        let text = |key: &str| document.get(key).and_then(Value::as_str);
        let name = text("name").unwrap_or("custom");
        let definition = document.get("schema").cloned().unwrap_or_else(|| json!({}));

        Ok(Schema::new(name, definition)?
            .with_description(text("description").unwrap_or_default())
            .with_version(text("version").unwrap_or(DEFAULT_SCHEMA_VERSION)))
    }

    /// Load a definition document from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let document: Value = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| SchemaError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| SchemaError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        tracing::debug!("Loaded schema definition from {}", path.display());
        Schema::from_definition(&document)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// Top-level field name → field spec.
    pub fn fields(&self) -> &BTreeMap<String, FieldSpec> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Fields whose values may be objects, in name order.
    pub fn entity_fields(&self) -> &[String] {
        &self.entity_fields
    }

    pub fn validate(&self, metadata: &Metadata) -> bool {
        self.validator.is_valid(&Value::Object(metadata.clone()))
    }

    /// One message per violation, each naming the offending path.
    pub fn errors(&self, metadata: &Metadata) -> Vec<String> {
        let instance = Value::Object(metadata.clone());
        match self.validator.validate(&instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    let path = if path.is_empty() { "/".to_string() } else { path };
                    format!("{} at {}", e, path)
                })
                .collect(),
        }
    }
}

/// Anything a schema can be registered from.
#[derive(Debug)]
pub enum SchemaSource {
    Schema(Schema),
    Definition(Value),
    Path(PathBuf),
}

impl From<Schema> for SchemaSource {
    fn from(schema: Schema) -> Self {
        SchemaSource::Schema(schema)
    }
}

impl From<Value> for SchemaSource {
    fn from(definition: Value) -> Self {
        SchemaSource::Definition(definition)
    }
}

impl From<PathBuf> for SchemaSource {
    fn from(path: PathBuf) -> Self {
        SchemaSource::Path(path)
    }
}

impl From<&Path> for SchemaSource {
    fn from(path: &Path) -> Self {
        SchemaSource::Path(path.to_path_buf())
    }
}

/// Registry of named schemas with an explicit active default.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    active: String,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let default = Schema::new(DEFAULT_SCHEMA_NAME, default_definition())
            .expect("built-in default schema compiles")
            .with_description("Default ADP metadata schema");

        let mut schemas = HashMap::new();
        schemas.insert(DEFAULT_SCHEMA_NAME.to_string(), Arc::new(default));
        SchemaRegistry {
            schemas,
            active: DEFAULT_SCHEMA_NAME.to_string(),
        }
    }

    /// Register a schema. An existing entry with the same name is replaced.
    pub fn register(&mut self, source: impl Into<SchemaSource>) -> Result<Arc<Schema>, SchemaError> {
        let schema = match source.into() {
            SchemaSource::Schema(schema) => schema,
            SchemaSource::Definition(document) => Schema::from_definition(&document)?,
            SchemaSource::Path(path) => Schema::from_file(&path)?,
        };

        let schema = Arc::new(schema);
        if self.schemas.insert(schema.name().to_string(), Arc::clone(&schema)).is_some() {
            tracing::debug!("Replaced schema '{}'", schema.name());
        } else {
            tracing::debug!("Registered schema '{}'", schema.name());
        }
        Ok(schema)
    }

    /// Load a schema file and register it.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Schema>, SchemaError> {
        self.register(path.as_ref())
    }

    /// Look up a schema by name; `None` resolves the active schema.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<Schema>, SchemaError> {
        let name = name.unwrap_or(&self.active);
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    pub fn set_active(&mut self, name: &str) -> Result<(), SchemaError> {
        if !self.schemas.contains_key(name) {
            return Err(SchemaError::NotFound(name.to_string()));
        }
        self.active = name.to_string();
        Ok(())
    }

    pub fn active(&self) -> Arc<Schema> {
        Arc::clone(&self.schemas[&self.active])
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    pub fn default_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schemas[DEFAULT_SCHEMA_NAME])
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Baseline field set shipped as the `"default"` schema.
pub fn default_definition() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "description": "Name of the component or entity"},
            "domain": {"type": "string", "description": "Business domain context"},
            "complexity": {"type": "string", "description": "Time/space complexity"},
            "thread-safety": {"type": "boolean", "description": "Thread safety guarantees"},
            "memory-footprint": {"type": "string", "description": "Memory usage characteristics"},
            "dependencies": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Component dependencies"
            },
            "invariants": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Conditions that must be maintained"
            },
            "description": {"type": "string", "description": "Detailed description"},
            "service-boundary": {"type": "string", "description": "Service this component belongs to"},
            "permitted-dependencies": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Services this component is allowed to depend on"
            },
            "prohibited-dependencies": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Services this component must not depend on"
            },
            "tech-debt": {
                "type": "object",
                "properties": {
                    "severity": {
                        "type": "string",
                        "enum": ["low", "medium", "high"],
                        "description": "Severity of the technical debt"
                    },
                    "type": {"type": "string", "description": "Type of technical debt"},
                    "threshold": {"type": "string", "description": "Threshold at which this becomes critical"},
                    "refactor-ticket": {"type": "string", "description": "Ticket reference for refactoring"},
                    "business-impact": {"type": "string", "description": "Impact on business"}
                }
            },
            "performance": {
                "type": "object",
                "properties": {
                    "max-latency": {"type": "string", "description": "Maximum allowed latency"},
                    "throughput": {"type": "string", "description": "Expected throughput"},
                    "hot-path": {"type": "boolean", "description": "Whether this is on the hot path"},
                    "optimization-priority": {"type": "string", "description": "What to optimize for"},
                    "bottlenecks": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Known bottlenecks"
                    }
                }
            },
            "data-handling": {
                "type": "object",
                "properties": {
                    "pii-fields": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Fields containing personally identifiable information"
                    },
                    "required-anonymization": {"type": "string", "description": "Anonymization requirements"},
                    "storage-requirements": {"type": "string", "description": "Data storage requirements"},
                    "retention-policy": {"type": "string", "description": "Data retention policy"}
                }
            }
        }
    })
}
