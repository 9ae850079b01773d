//! OpenAPI document types and generation.
//!
//! The types follow the OpenAPI 3.1 specification
//! (<https://spec.openapis.org/oas/v3.1.0>), reduced to the parts the service
//! uses. [`OpenApiGenerator`] walks the route table and derives parameters,
//! request bodies and responses from each route's schemas, so the document
//! cannot drift from what the pipeline enforces.

use http::Method;
use indexmap::IndexMap;
use kontakt_core::{FieldSchema, FieldType, ResponseContent, RouteSpec, ValidationSchema};
use serde::{Deserialize, Serialize};

use crate::error::{DocsError, DocsResult};

const JSON_MEDIA_TYPE: &str = "application/json";
const TEXT_MEDIA_TYPE: &str = "text/plain";
const ALPHANUM_PATTERN: &str = "^[a-zA-Z0-9]*$";

/// OpenAPI document root object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version (`3.1.0`).
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Paths and their operations, in route declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// API metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations available on a single path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::PUT => Some(&mut self.put),
            Method::POST => Some(&mut self.post),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            _ => None,
        }
    }
}

/// An API operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Full description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Path and query parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
}

/// An operation parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Response definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Description (required by OpenAPI).
    pub description: String,
    /// Content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// API tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// JSON Schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// String type.
    String,
    /// Number type.
    Number,
    /// Integer type.
    Integer,
    /// Boolean type.
    Boolean,
    /// Object type.
    Object,
}

/// JSON Schema definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema type; absent for "any".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// Required properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Allowed values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "enum")]
    pub enum_values: Vec<serde_json::Value>,
    /// Minimum value (numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Maximum value (numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum length (strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "minLength")]
    pub min_length: Option<u64>,
    /// Maximum length (strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxLength")]
    pub max_length: Option<u64>,
    /// Pattern regex (strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

impl Schema {
    /// Create a schema of the given type.
    #[must_use]
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// Create a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    /// Create an object schema.
    #[must_use]
    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    /// Converts a field's constraint set to a JSON schema.
    #[must_use]
    pub fn from_field(field: &FieldSchema) -> Self {
        let mut schema = match field.field_type() {
            FieldType::String => {
                let (min, max) = field.length_bounds();
                let mut schema = Self::string();
                schema.min_length = min
                    .or(if field.allows_empty() { None } else { Some(1) })
                    .map(|v| v as u64);
                schema.max_length = max.map(|v| v as u64);
                schema.pattern = field
                    .pattern_source()
                    .map(ToString::to_string)
                    .or_else(|| field.is_alphanum().then(|| ALPHANUM_PATTERN.to_string()));
                schema
            }
            FieldType::Integer | FieldType::Number => {
                let mut schema = if matches!(field.field_type(), FieldType::Integer) {
                    Self::of(SchemaType::Integer)
                } else {
                    Self::of(SchemaType::Number)
                };
                (schema.minimum, schema.maximum) = field.range();
                schema
            }
            FieldType::Boolean => Self::of(SchemaType::Boolean),
            FieldType::Object(nested) => Self::from_object(nested),
            FieldType::Any => Self::default(),
        };

        schema.description = field.description_text().map(ToString::to_string);
        schema.enum_values = field.allowed_values().to_vec();
        schema.default = field.default().cloned();
        schema.example = field.example_value().cloned();
        schema
    }

    /// Converts a whole validation schema to an object schema.
    #[must_use]
    pub fn from_object(schema: &ValidationSchema) -> Self {
        let mut result = Self::object();
        for (name, field) in schema.fields() {
            result.properties.insert(name.to_string(), Self::from_field(field));
            if field.is_required() {
                result.required.push(name.to_string());
            }
        }
        result
    }
}

/// Generator for OpenAPI documents from a route table.
#[derive(Debug, Clone)]
pub struct OpenApiGenerator {
    title: String,
    version: String,
    description: Option<String>,
    servers: Vec<Server>,
}

impl Default for OpenApiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiGenerator {
    /// Create a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.0.0".to_string(),
            description: None,
            servers: Vec::new(),
        }
    }

    /// Set the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Generate a document describing `routes`.
    ///
    /// Fails when a route uses a method OpenAPI has no slot for here, or when
    /// two routes share a method and path.
    pub fn generate<'a>(&self, routes: impl IntoIterator<Item = &'a RouteSpec>) -> DocsResult<OpenApi> {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut tags: Vec<Tag> = Vec::new();

        for route in routes {
            let operation = convert_route(route);
            for tag in &operation.tags {
                if !tags.iter().any(|t| &t.name == tag) {
                    tags.push(Tag {
                        name: tag.clone(),
                        description: None,
                    });
                }
            }

            let path_item = paths.entry(openapi_path(route.path())).or_default();
            let slot = path_item
                .slot(route.method())
                .ok_or_else(|| DocsError::InvalidOperation {
                    operation_id: route.operation_id().to_string(),
                    reason: format!("unsupported HTTP method: {}", route.method()),
                })?;
            if slot.is_some() {
                return Err(DocsError::InvalidOperation {
                    operation_id: route.operation_id().to_string(),
                    reason: format!("{} {} is declared twice", route.method(), route.path()),
                });
            }
            *slot = Some(operation);
        }

        Ok(OpenApi {
            openapi: "3.1.0".to_string(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
            },
            servers: self.servers.clone(),
            paths,
            tags,
        })
    }

    /// Generate the document as pretty-printed JSON.
    pub fn generate_json<'a>(
        &self,
        routes: impl IntoIterator<Item = &'a RouteSpec>,
    ) -> DocsResult<String> {
        let spec = self.generate(routes)?;
        serde_json::to_string_pretty(&spec).map_err(DocsError::from)
    }
}

fn convert_route(route: &RouteSpec) -> Operation {
    let mut parameters = path_parameters(route);
    if let Some(query) = route.query() {
        parameters.extend(query.fields().map(|(name, field)| Parameter {
            name: name.to_string(),
            location: ParameterIn::Query,
            description: field.description_text().map(ToString::to_string),
            required: field.is_required(),
            schema: Some(Schema::from_field(field)),
        }));
    }

    let request_body = route.payload().map(|payload| RequestBody {
        description: None,
        required: payload.fields().any(|(_, field)| field.is_required()),
        content: single_media(JSON_MEDIA_TYPE, Some(Schema::from_object(payload))),
    });

    let mut responses: IndexMap<String, Response> = IndexMap::new();
    for doc in route.responses() {
        let content = match &doc.content {
            ResponseContent::None => IndexMap::new(),
            ResponseContent::Text => single_media(TEXT_MEDIA_TYPE, Some(Schema::string())),
            ResponseContent::Json(schema) => single_media(
                JSON_MEDIA_TYPE,
                Some(schema.as_ref().map_or_else(Schema::object, Schema::from_object)),
            ),
        };
        responses.insert(
            doc.status.as_u16().to_string(),
            Response {
                description: doc.description.clone(),
                content,
            },
        );
    }

    if responses.is_empty() {
        responses.insert(
            "200".to_string(),
            Response {
                description: "Successful response".to_string(),
                content: IndexMap::new(),
            },
        );
    }

    let validated = route.params().is_some() || route.query().is_some() || route.payload().is_some();
    if validated && !responses.contains_key("400") {
        responses.insert(
            "400".to_string(),
            Response {
                description: "Invalid request input".to_string(),
                content: single_media(JSON_MEDIA_TYPE, Some(Schema::object())),
            },
        );
    }

    Operation {
        operation_id: route.operation_id().to_string(),
        summary: route.summary_text().map(ToString::to_string),
        description: route.description_text().map(ToString::to_string),
        tags: route.tags().to_vec(),
        parameters,
        request_body,
        responses,
    }
}

fn single_media(media_type: &str, schema: Option<Schema>) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(media_type.to_string(), MediaType { schema });
    content
}

/// Rewrites `{name?}` segments to the `{name}` form OpenAPI expects.
fn openapi_path(template: &str) -> String {
    template.replace("?}", "}")
}

/// Extracts `{name}` and `{name?}` segments of a path template.
fn template_parameters(template: &str) -> Vec<(&str, bool)> {
    template
        .split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .map(|name| match name.strip_suffix('?') {
            Some(optional) => (optional, false),
            None => (name, true),
        })
        .collect()
}

fn path_parameters(route: &RouteSpec) -> Vec<Parameter> {
    template_parameters(route.path())
        .into_iter()
        .map(|(name, required)| {
            let field = route.params().and_then(|params| params.get(name));
            Parameter {
                name: name.to_string(),
                location: ParameterIn::Path,
                description: field.and_then(FieldSchema::description_text).map(ToString::to_string),
                required,
                schema: Some(field.map_or_else(Schema::string, Schema::from_field)),
            }
        })
        .collect()
}
