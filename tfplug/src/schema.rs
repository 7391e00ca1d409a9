//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining resource and data source
//! schemas, including attribute types, blocks, and validation.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block, // Root block containing all attributes
}

impl Schema {
    /// Runs attribute validators and nested block item limits over a configuration.
    ///
    /// Null and unknown values are skipped, matching Terraform's validate phase
    /// where parts of the configuration may not be known yet.
    pub fn validate_config(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.block
            .validate_value(&config.value, &AttributePath::root(), &mut diagnostics);
        diagnostics
    }

    /// Fills attribute defaults into a planned value, nested blocks included,
    /// wherever the configuration leaves the attribute null.
    pub fn apply_defaults(&self, config: &DynamicValue, planned_state: &mut DynamicValue) {
        self.block.apply_defaults(
            &config.value,
            &mut planned_state.value,
            &AttributePath::root(),
        );
    }

    /// Applies defaults, then the plan modifiers of top-level attributes, to a planned state.
    pub fn apply_plan_modifiers(
        &self,
        config: &DynamicValue,
        prior_state: &DynamicValue,
        planned_state: &DynamicValue,
    ) -> PlanModification {
        let mut outcome = PlanModification {
            planned_state: planned_state.clone(),
            requires_replace: Vec::new(),
            diagnostics: Vec::new(),
        };

        if !planned_state.is_null() {
            self.apply_defaults(config, &mut outcome.planned_state);
        }

        // Nothing to compare against on create or destroy.
        if prior_state.is_null() || planned_state.is_null() {
            return outcome;
        }

        for attr in &self.block.attributes {
            if attr.plan_modifiers.is_empty() {
                continue;
            }
            let path = AttributePath::new(&attr.name);
            let lookup = |value: &DynamicValue| {
                DynamicValue::new(value.get(&path).cloned().unwrap_or(Dynamic::Null))
            };

            let mut plan_value = lookup(&outcome.planned_state);
            for modifier in &attr.plan_modifiers {
                let response = modifier.modify(PlanModifierRequest {
                    config_value: lookup(config),
                    state_value: lookup(prior_state),
                    plan_value,
                    path: path.clone(),
                });
                plan_value = response.plan_value;
                outcome.diagnostics.extend(response.diagnostics);
                if response.requires_replace && !outcome.requires_replace.contains(&path) {
                    outcome.requires_replace.push(path.clone());
                }
            }

            if let Err(e) = outcome.planned_state.set_dynamic(&path, plan_value.value) {
                outcome.diagnostics.push(
                    Diagnostic::error("Failed to apply plan modifier", e.to_string())
                        .with_attribute(path),
                );
            }
        }

        outcome
    }
}

/// Result of running attribute plan modifiers
pub struct PlanModification {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Block represents a configuration block
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
    pub description_kind: StringKind,
    pub deprecated: bool,
}

impl Block {
    fn empty() -> Self {
        Self {
            version: 0,
            attributes: Vec::new(),
            block_types: Vec::new(),
            description: String::new(),
            description_kind: StringKind::Plain,
            deprecated: false,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn block_type(&self, name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == name)
    }

    /// The object type this block's values have, with nested blocks as collections.
    ///
    /// Data sources use this to expose a resource block as a computed attribute.
    pub fn object_type(&self) -> AttributeType {
        let mut fields = HashMap::new();
        for attr in &self.attributes {
            fields.insert(attr.name.clone(), attr.r#type.clone());
        }
        for nested in &self.block_types {
            let inner = Box::new(nested.block.object_type());
            let field_type = match nested.nesting {
                NestingMode::Set => AttributeType::Set(inner),
                NestingMode::Map => AttributeType::Map(inner),
                NestingMode::Single | NestingMode::Group => *inner,
                NestingMode::List | NestingMode::Invalid => AttributeType::List(inner),
            };
            fields.insert(nested.type_name.clone(), field_type);
        }
        AttributeType::Object(fields)
    }

    fn apply_defaults(&self, config: &Dynamic, planned: &mut Dynamic, path: &AttributePath) {
        let Dynamic::Map(fields) = planned else {
            return;
        };
        let configured = |name: &str| {
            config
                .as_map()
                .and_then(|config_fields| config_fields.get(name))
                .unwrap_or(&Dynamic::Null)
        };

        for attr in &self.attributes {
            let Some(default) = &attr.default else {
                continue;
            };
            if !configured(&attr.name).is_null() {
                continue;
            }
            let response = default.default_value(DefaultRequest {
                path: path.clone().attribute(&attr.name),
            });
            fields.insert(attr.name.clone(), response.value.value);
        }

        for nested in &self.block_types {
            if let Some(value) = fields.get_mut(&nested.type_name) {
                nested.apply_defaults(
                    configured(&nested.type_name),
                    value,
                    &path.clone().attribute(&nested.type_name),
                );
            }
        }
    }

    fn validate_value(
        &self,
        value: &Dynamic,
        path: &AttributePath,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let fields = match value {
            Dynamic::Map(fields) => fields,
            Dynamic::Null | Dynamic::Unknown => return,
            other => {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid block value",
                        format!("Expected an object, got {}", other.type_name()),
                    )
                    .with_attribute(path.clone()),
                );
                return;
            }
        };

        for attr in &self.attributes {
            let attr_path = path.clone().attribute(&attr.name);
            let attr_value = fields.get(&attr.name).unwrap_or(&Dynamic::Null);

            if attr_value.is_null() {
                if attr.required {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!(
                                "The argument \"{}\" is required, but no definition was found.",
                                attr.name
                            ),
                        )
                        .with_attribute(attr_path),
                    );
                }
                continue;
            }
            if attr_value.is_unknown() {
                continue;
            }

            for validator in &attr.validators {
                let response = validator.validate(ValidatorRequest {
                    config_value: DynamicValue::new(attr_value.clone()),
                    path: attr_path.clone(),
                });
                diagnostics.extend(response.diagnostics);
            }
        }

        for nested in &self.block_types {
            let block_path = path.clone().attribute(&nested.type_name);
            let block_value = fields.get(&nested.type_name).unwrap_or(&Dynamic::Null);
            nested.validate_value(block_value, &block_path, diagnostics);
        }
    }
}

/// Attribute represents a single configuration attribute
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Box<dyn Validator>>,
    pub plan_modifiers: Vec<Box<dyn PlanModifier>>,
    pub default: Option<Box<dyn Default>>,
    pub nested_type: Option<NestedType>,
    pub deprecated: bool,
}

// Manual Debug implementation since validators/modifiers don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field(
                "plan_modifiers",
                &format!("{} plan modifiers", self.plan_modifiers.len()),
            )
            .field("default", &self.default.is_some())
            .field("nested_type", &self.nested_type)
            .field("deprecated", &self.deprecated)
            .finish()
    }
}

// Manual Clone implementation
impl Clone for Attribute {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            r#type: self.r#type.clone(),
            description: self.description.clone(),
            required: self.required,
            optional: self.optional,
            computed: self.computed,
            sensitive: self.sensitive,
            validators: vec![],
            plan_modifiers: vec![],
            default: None,
            nested_type: self.nested_type.clone(),
            deprecated: self.deprecated,
        }
    }
}

/// NestedBlock represents a nested configuration block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    pub max_items: i64,
}

impl NestedBlock {
    fn apply_defaults(&self, config: &Dynamic, planned: &mut Dynamic, path: &AttributePath) {
        match (self.nesting, planned) {
            (NestingMode::Single | NestingMode::Group, planned) => {
                self.block.apply_defaults(config, planned, path)
            }
            (NestingMode::List | NestingMode::Set, Dynamic::List(items)) => {
                for (idx, item) in items.iter_mut().enumerate() {
                    let configured = config
                        .as_list()
                        .and_then(|config_items| config_items.get(idx))
                        .unwrap_or(&Dynamic::Null);
                    self.block
                        .apply_defaults(configured, item, &path.clone().index(idx as i64));
                }
            }
            (NestingMode::Map, Dynamic::Map(entries)) => {
                for (key, item) in entries.iter_mut() {
                    let configured = config
                        .as_map()
                        .and_then(|config_entries| config_entries.get(key))
                        .unwrap_or(&Dynamic::Null);
                    self.block
                        .apply_defaults(configured, item, &path.clone().key(key));
                }
            }
            _ => {}
        }
    }

    fn validate_value(
        &self,
        value: &Dynamic,
        path: &AttributePath,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        match self.nesting {
            NestingMode::Single | NestingMode::Group => {
                self.block.validate_value(value, path, diagnostics)
            }
            NestingMode::List | NestingMode::Set => {
                let items = match value {
                    Dynamic::Null => &[][..],
                    Dynamic::Unknown => return,
                    Dynamic::List(items) => items.as_slice(),
                    other => {
                        diagnostics.push(
                            Diagnostic::error(
                                "Invalid block value",
                                format!("Expected a list of blocks, got {}", other.type_name()),
                            )
                            .with_attribute(path.clone()),
                        );
                        return;
                    }
                };

                if items.iter().all(Dynamic::is_wholly_known) {
                    let count = items.len() as i64;
                    if count < self.min_items {
                        diagnostics.push(
                            Diagnostic::error(
                                format!("Insufficient {} blocks", self.type_name),
                                format!(
                                    "At least {} \"{}\" blocks are required.",
                                    self.min_items, self.type_name
                                ),
                            )
                            .with_attribute(path.clone()),
                        );
                    }
                    if self.max_items > 0 && count > self.max_items {
                        diagnostics.push(
                            Diagnostic::error(
                                format!("Too many {} blocks", self.type_name),
                                format!(
                                    "No more than {} \"{}\" blocks are allowed.",
                                    self.max_items, self.type_name
                                ),
                            )
                            .with_attribute(path.clone()),
                        );
                    }
                }

                for (idx, item) in items.iter().enumerate() {
                    self.block
                        .validate_value(item, &path.clone().index(idx as i64), diagnostics);
                }
            }
            NestingMode::Map => {
                if let Dynamic::Map(entries) = value {
                    for (key, item) in entries {
                        self.block
                            .validate_value(item, &path.clone().key(key), diagnostics);
                    }
                }
            }
            NestingMode::Invalid => {}
        }
    }
}

/// NestingMode defines how nested blocks are structured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Invalid,
    Single,
    List,
    Set,
    Map,
    Group,
}

/// NestedType for attributes with nested structures
#[derive(Debug, Clone)]
pub struct NestedType {
    pub attributes: Vec<Attribute>,
    pub nesting: ObjectNestingMode,
}

/// ObjectNestingMode for nested attribute objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectNestingMode {
    Invalid,
    Single,
    List,
    Set,
    Map,
}

/// StringKind represents the format of string values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKind {
    Plain,
    Markdown,
}

/// Validator performs validation on attribute values during planning
/// Implement this for custom validation logic
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub config_value: crate::types::DynamicValue,
    pub path: AttributePath,
}

/// Response from validators
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// PlanModifier modifies planned values during planning
/// Common uses: RequiresReplace, UseStateForUnknown
pub trait PlanModifier: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Modify the planned value
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

/// Request for plan modifiers
pub struct PlanModifierRequest {
    pub config_value: crate::types::DynamicValue,
    pub state_value: crate::types::DynamicValue,
    pub plan_value: crate::types::DynamicValue,
    pub path: AttributePath,
}

/// Response from plan modifiers
pub struct PlanModifierResponse {
    pub plan_value: crate::types::DynamicValue,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Default provides default values for optional attributes
/// Called when attribute is not set in configuration
pub trait Default: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Provide default value
    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

/// Request for default values
pub struct DefaultRequest {
    pub path: AttributePath,
}

/// Response with default value
pub struct DefaultResponse {
    pub value: crate::types::DynamicValue,
}

/// AttributeBuilder provides fluent API for building attributes
/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    /// Create a new attribute builder
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
                default: None,
                nested_type: None,
                deprecated: false,
            },
        }
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    /// Mark as computed
    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    /// Add validator
    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    /// Add plan modifier
    pub fn plan_modifier(mut self, modifier: Box<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(modifier);
        self
    }

    /// Set default
    pub fn default(mut self, default: Box<dyn Default>) -> Self {
        self.attribute.default = Some(default);
        self
    }

    /// Set nested type
    pub fn nested_type(mut self, nested: NestedType) -> Self {
        self.attribute.nested_type = Some(nested);
        self
    }

    /// Finalize the attribute
    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// NestedBlockBuilder builds list and set blocks
///
/// Blocks default to list nesting with no item limits. Use `max_items(1)` for the
/// singleton-list convention where a block appears at most once.
pub struct NestedBlockBuilder {
    nested: NestedBlock,
}

impl NestedBlockBuilder {
    pub fn new(type_name: &str) -> Self {
        Self {
            nested: NestedBlock {
                type_name: type_name.to_string(),
                block: Block::empty(),
                nesting: NestingMode::List,
                min_items: 0,
                max_items: 0,
            },
        }
    }

    /// Use set nesting (unordered, no duplicates)
    pub fn set(mut self) -> Self {
        self.nested.nesting = NestingMode::Set;
        self
    }

    pub fn nesting(mut self, nesting: NestingMode) -> Self {
        self.nested.nesting = nesting;
        self
    }

    pub fn min_items(mut self, min: i64) -> Self {
        self.nested.min_items = min;
        self
    }

    pub fn max_items(mut self, max: i64) -> Self {
        self.nested.max_items = max;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.nested.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.nested.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.nested.block.block_types.push(block);
        self
    }

    pub fn build(self) -> NestedBlock {
        self.nested
    }
}

/// SchemaBuilder provides fluent API for building schemas
/// ALWAYS use this for consistency
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::empty(),
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    /// Add attribute
    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    /// Add nested block
    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    /// Set description kind
    pub fn description_kind(mut self, kind: StringKind) -> Self {
        self.schema.block.description_kind = kind;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    /// Finalize the schema
    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the resource")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn schema_builder_creates_schema_with_attributes() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Test resource schema")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.attributes.len(), 2);
        assert_eq!(schema.block.description, "Test resource schema");
    }

    fn listener_schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("spec")
                    .max_items(1)
                    .block(
                        NestedBlockBuilder::new("listener")
                            .min_items(1)
                            .attribute(
                                AttributeBuilder::new("port", AttributeType::Number)
                                    .required()
                                    .build(),
                            )
                            .build(),
                    )
                    .build(),
            )
            .build()
    }

    fn object(entries: Vec<(&str, Dynamic)>) -> Dynamic {
        Dynamic::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn tls_schema() -> Schema {
        SchemaBuilder::new()
            .block(
                NestedBlockBuilder::new("listener")
                    .attribute(
                        AttributeBuilder::new("port", AttributeType::Number)
                            .required()
                            .build(),
                    )
                    .block(
                        NestedBlockBuilder::new("tls")
                            .max_items(1)
                            .attribute(
                                AttributeBuilder::new("enforce", AttributeType::Bool)
                                    .optional()
                                    .computed()
                                    .default(crate::defaults::StaticDefault::bool(true))
                                    .build(),
                            )
                            .build(),
                    )
                    .build(),
            )
            .build()
    }

    fn listener(port: f64, tls: Option<Dynamic>) -> Dynamic {
        object(vec![
            ("port", Dynamic::Number(port)),
            ("tls", Dynamic::List(tls.into_iter().collect())),
        ])
    }

    #[test]
    fn defaults_fill_null_attributes_in_nested_blocks() {
        let config = DynamicValue::new(object(vec![(
            "listener",
            Dynamic::List(vec![
                listener(80.0, Some(object(vec![("enforce", Dynamic::Null)]))),
                listener(443.0, Some(object(vec![("enforce", Dynamic::Bool(false))]))),
                listener(8080.0, None),
            ]),
        )]));

        let outcome = tls_schema().apply_plan_modifiers(&config, &DynamicValue::null(), &config);
        let enforce = |idx: i64| {
            outcome
                .planned_state
                .get(
                    &AttributePath::new("listener")
                        .index(idx)
                        .attribute("tls")
                        .index(0)
                        .attribute("enforce"),
                )
                .cloned()
        };

        assert_eq!(enforce(0), Some(Dynamic::Bool(true)));
        assert_eq!(enforce(1), Some(Dynamic::Bool(false)));
        assert_eq!(enforce(2), None);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn defaults_leave_a_destroy_plan_alone() {
        let config = DynamicValue::null();
        let outcome = tls_schema().apply_plan_modifiers(&config, &config, &DynamicValue::null());
        assert!(outcome.planned_state.is_null());
    }

    #[test]
    fn validate_config_reports_missing_required_attribute() {
        let config = DynamicValue::new(object(vec![("name", Dynamic::Null)]));
        let diagnostics = listener_schema().validate_config(&config);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Missing required argument");
        assert_eq!(diagnostics[0].attribute, Some(AttributePath::new("name")));
    }

    #[test]
    fn validate_config_enforces_block_item_limits() {
        let spec = object(vec![("listener", Dynamic::List(vec![]))]);
        let config = DynamicValue::new(object(vec![
            ("name", Dynamic::String("node".to_string())),
            ("spec", Dynamic::List(vec![spec.clone(), spec])),
        ]));

        let summaries: Vec<String> = listener_schema()
            .validate_config(&config)
            .into_iter()
            .map(|d| d.summary)
            .collect();

        assert!(summaries.contains(&"Too many spec blocks".to_string()));
        assert!(summaries.contains(&"Insufficient listener blocks".to_string()));
    }

    #[test]
    fn validate_config_descends_into_nested_blocks() {
        let listener = object(vec![("port", Dynamic::Null)]);
        let spec = object(vec![("listener", Dynamic::List(vec![listener]))]);
        let config = DynamicValue::new(object(vec![
            ("name", Dynamic::String("node".to_string())),
            ("spec", Dynamic::List(vec![spec])),
        ]));

        let diagnostics = listener_schema().validate_config(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_ref().map(|p| p.to_string()),
            Some("spec[0].listener[0].port".to_string())
        );
    }

    #[test]
    fn validate_config_skips_unknown_values() {
        let config = DynamicValue::new(object(vec![
            ("name", Dynamic::Unknown),
            ("spec", Dynamic::Unknown),
        ]));
        assert!(listener_schema().validate_config(&config).is_empty());
    }

    #[test]
    fn block_object_type_nests_blocks_as_lists() {
        let schema = listener_schema();
        let AttributeType::Object(fields) = schema.block.object_type() else {
            panic!("Expected Object type");
        };
        let Some(AttributeType::List(spec)) = fields.get("spec") else {
            panic!("Expected spec to be a list");
        };
        let AttributeType::Object(spec_fields) = spec.as_ref() else {
            panic!("Expected spec element to be an object");
        };
        assert!(matches!(spec_fields.get("listener"), Some(AttributeType::List(_))));
    }

    #[test]
    fn nested_attribute_type() {
        let object_type = AttributeType::Object(HashMap::from([
            ("host".to_string(), AttributeType::String),
            ("port".to_string(), AttributeType::Number),
        ]));

        let attr = AttributeBuilder::new("config", object_type)
            .optional()
            .build();

        assert!(attr.optional);
        if let AttributeType::Object(fields) = &attr.r#type {
            assert_eq!(fields.len(), 2);
            assert!(matches!(fields.get("host"), Some(AttributeType::String)));
            assert!(matches!(fields.get("port"), Some(AttributeType::Number)));
        } else {
            panic!("Expected Object type");
        }
    }
}
