//! Declared configuration fields for triggers and actions.
//!
//! An [`InputConfig`] is the ordered list of fields a definition accepts.
//! The engine validates raw, user-supplied JSON against it before a run
//! handler ever sees the values.
//!
//! Validation works in three passes:
//!
//! 1. every declared field is type-checked on its own, and absent fields
//!    pick up their default;
//! 2. visibility rules are evaluated against the values from pass 1, the
//!    referenced fields first, so a field that is itself hidden counts as
//!    unset for every rule that refers to it;
//! 3. visible fields report type errors and missing required values.
//!
//! Hidden fields never produce errors and never reach the handler.

use crate::error::{DefinitionProblem, FieldError, FieldProblem, ValidationError};
use chrono::{DateTime, NaiveDate};
use indexmap::IndexMap;
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// A selectable option of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// The value stored in configuration.
    pub value: String,
    /// The label shown to users.
    pub label: String,
}

impl SelectOption {
    /// Creates an option.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// The type of a configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    String,
    /// Any JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// One (or, when `multiple`, several) of a fixed set of string values.
    Select {
        options: Vec<SelectOption>,
        #[serde(default)]
        multiple: bool,
    },
    /// A calendar date, `YYYY-MM-DD`.
    Date,
    /// An RFC 3339 timestamp.
    DateTime,
    /// Arbitrary JSON.
    Json,
}

impl FieldType {
    /// Returns the name used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Select { multiple: false, .. } => "select option",
            Self::Select { multiple: true, .. } => "list of select options",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Json => "json value",
        }
    }

    /// Checks a single non-null value against this type.
    fn check(&self, value: &JsonValue) -> Result<(), FieldProblem> {
        let wrong_type = || FieldProblem::WrongType {
            expected: self.name(),
        };

        match self {
            Self::String => value.is_string().then_some(()).ok_or_else(wrong_type),
            Self::Number => value.is_number().then_some(()).ok_or_else(wrong_type),
            Self::Boolean => value.is_boolean().then_some(()).ok_or_else(wrong_type),
            Self::Json => Ok(()),
            Self::Date => {
                let text = value.as_str().ok_or_else(wrong_type)?;
                let invalid = || FieldProblem::InvalidDate {
                    value: text.to_string(),
                };
                // chrono accepts unpadded months and days; the format does not.
                if text.len() != 10 {
                    return Err(invalid());
                }
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map(|_| ())
                    .map_err(|_| invalid())
            }
            Self::DateTime => {
                let text = value.as_str().ok_or_else(wrong_type)?;
                DateTime::parse_from_rfc3339(text)
                    .map(|_| ())
                    .map_err(|_| FieldProblem::InvalidDate {
                        value: text.to_string(),
                    })
            }
            Self::Select { options, multiple } => {
                let allowed = |candidate: &JsonValue| -> Result<(), FieldProblem> {
                    let text = candidate.as_str().ok_or_else(wrong_type)?;
                    if options.iter().any(|option| option.value == text) {
                        Ok(())
                    } else {
                        Err(FieldProblem::NotAnOption {
                            value: text.to_string(),
                        })
                    }
                };

                if *multiple {
                    value
                        .as_array()
                        .ok_or_else(wrong_type)?
                        .iter()
                        .try_for_each(allowed)
                } else {
                    allowed(value)
                }
            }
        }
    }
}

/// A predicate over other fields' resolved values.
///
/// Attached to a field, it decides whether that field is shown (and
/// therefore validated) at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum VisibilityRule {
    /// The referenced field equals `value`.
    Equals { key: String, value: JsonValue },
    /// The referenced field is absent or differs from `value`.
    NotEquals { key: String, value: JsonValue },
    /// The referenced field equals one of `values`.
    In { key: String, values: Vec<JsonValue> },
    /// The referenced field has a value.
    IsSet { key: String },
    /// Every nested rule holds.
    All { rules: Vec<VisibilityRule> },
    /// At least one nested rule holds.
    Any { rules: Vec<VisibilityRule> },
    /// The nested rule does not hold.
    Not { rule: Box<VisibilityRule> },
}

impl VisibilityRule {
    /// Shorthand for [`VisibilityRule::Equals`].
    #[must_use]
    pub fn equals(key: impl Into<String>, value: JsonValue) -> Self {
        Self::Equals {
            key: key.into(),
            value,
        }
    }

    /// Shorthand for [`VisibilityRule::IsSet`].
    #[must_use]
    pub fn is_set(key: impl Into<String>) -> Self {
        Self::IsSet { key: key.into() }
    }

    /// Evaluates the rule against resolved values.
    #[must_use]
    pub fn is_satisfied(&self, values: &IndexMap<String, JsonValue>) -> bool {
        match self {
            Self::Equals { key, value } => values.get(key) == Some(value),
            Self::NotEquals { key, value } => values.get(key) != Some(value),
            Self::In { key, values: allowed } => values
                .get(key)
                .is_some_and(|current| allowed.contains(current)),
            Self::IsSet { key } => values.contains_key(key),
            Self::All { rules } => rules.iter().all(|rule| rule.is_satisfied(values)),
            Self::Any { rules } => rules.iter().any(|rule| rule.is_satisfied(values)),
            Self::Not { rule } => !rule.is_satisfied(values),
        }
    }

    /// Returns every field key this rule reads.
    #[must_use]
    pub fn referenced_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
        match self {
            Self::Equals { key, .. }
            | Self::NotEquals { key, .. }
            | Self::In { key, .. }
            | Self::IsSet { key } => keys.push(key),
            Self::All { rules } | Self::Any { rules } => {
                for rule in rules {
                    rule.collect_keys(keys);
                }
            }
            Self::Not { rule } => rule.collect_keys(keys),
        }
    }
}

/// One declared configuration field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    /// Key in the configuration map; unique within a definition.
    pub key: String,
    /// Label shown to users.
    pub label: String,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The field's type.
    pub field_type: FieldType,
    /// Whether a visible field must have a value.
    #[serde(default)]
    pub required: bool,
    /// Value used when the raw input omits the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    /// When present, the field only exists while the rule holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibilityRule>,
}

impl InputField {
    /// Creates an optional field of the given type.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: None,
            field_type,
            required: false,
            default: None,
            visible_when: None,
        }
    }

    /// Creates a text field.
    #[must_use]
    pub fn string(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::String)
    }

    /// Creates a number field.
    #[must_use]
    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::Number)
    }

    /// Creates a boolean field.
    #[must_use]
    pub fn boolean(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::Boolean)
    }

    /// Creates a single-choice select field.
    #[must_use]
    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(
            key,
            label,
            FieldType::Select {
                options,
                multiple: false,
            },
        )
    }

    /// Creates a date field.
    #[must_use]
    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldType::Date)
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Attaches a visibility rule.
    #[must_use]
    pub fn visible_when(mut self, rule: VisibilityRule) -> Self {
        self.visible_when = Some(rule);
        self
    }
}

/// How to treat keys that no field declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Unknown keys are dropped.
    #[default]
    Lenient,
    /// Unknown keys are errors.
    Strict,
}

/// The ordered field declarations of one definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputConfig {
    fields: Vec<InputField>,
}

/// Outcome of the independent pass for one field.
enum Resolution {
    Value,
    Invalid(FieldProblem),
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Pending,
    Resolving,
    Visible,
    Hidden,
}

impl InputConfig {
    /// Creates a config from field declarations.
    #[must_use]
    pub fn new(fields: Vec<InputField>) -> Self {
        Self { fields }
    }

    /// Returns the declared fields in order.
    #[must_use]
    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    /// Looks up a field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&InputField> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks the declarations themselves, as the builders do.
    ///
    /// Returns every problem found; an empty list means the declarations
    /// are usable.
    #[must_use]
    pub fn check_definition(&self) -> Vec<DefinitionProblem> {
        let mut problems = Vec::new();
        let declared: HashSet<&str> = self.fields.iter().map(|f| f.key.as_str()).collect();
        let mut seen = HashSet::new();

        for (index, field) in self.fields.iter().enumerate() {
            if field.key.trim().is_empty() {
                problems.push(DefinitionProblem::BlankFieldKey { index });
            } else if !seen.insert(field.key.as_str()) {
                problems.push(DefinitionProblem::DuplicateFieldKey {
                    key: field.key.clone(),
                });
            }

            if let FieldType::Select { options, .. } = &field.field_type {
                if options.is_empty() {
                    problems.push(DefinitionProblem::EmptySelectOptions {
                        key: field.key.clone(),
                    });
                }
            }

            if let Some(default) = &field.default {
                if field.field_type.check(default).is_err() {
                    problems.push(DefinitionProblem::DefaultTypeMismatch {
                        key: field.key.clone(),
                    });
                }
            }

            if let Some(rule) = &field.visible_when {
                for reference in rule.referenced_keys() {
                    if reference == field.key {
                        problems.push(DefinitionProblem::SelfReferentialVisibility {
                            key: field.key.clone(),
                        });
                    } else if !declared.contains(reference) {
                        problems.push(DefinitionProblem::UnknownVisibilityReference {
                            key: field.key.clone(),
                            reference: reference.to_string(),
                        });
                    }
                }
                if self.visibility_cycle(index) {
                    problems.push(DefinitionProblem::CyclicVisibility {
                        key: field.key.clone(),
                    });
                }
            }
        }

        problems
    }

    /// Validates raw configuration against the declared fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming every offending field.
    pub fn validate(
        &self,
        raw: &Map<String, JsonValue>,
        mode: ValidationMode,
    ) -> Result<ValidatedConfig, Report<ValidationError>> {
        let mut errors = Vec::new();

        if mode == ValidationMode::Strict {
            for key in raw.keys() {
                if self.field(key).is_none() {
                    errors.push(FieldError::new(key.clone(), FieldProblem::Unknown));
                }
            }
        }

        let mut resolved = IndexMap::with_capacity(self.fields.len());
        let mut resolutions = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let resolution = match raw.get(&field.key).filter(|value| !value.is_null()) {
                Some(value) => match field.field_type.check(value) {
                    Ok(()) => {
                        resolved.insert(field.key.clone(), value.clone());
                        Resolution::Value
                    }
                    Err(problem) => Resolution::Invalid(problem),
                },
                None => match &field.default {
                    Some(default) => {
                        resolved.insert(field.key.clone(), default.clone());
                        Resolution::Value
                    }
                    None => Resolution::Absent,
                },
            };
            resolutions.push(resolution);
        }

        let mut effective = resolved.clone();
        let mut states = vec![Visibility::Pending; self.fields.len()];
        for index in 0..self.fields.len() {
            self.resolve_visibility(index, &mut states, &mut effective);
        }

        let mut values = IndexMap::with_capacity(resolved.len());
        for ((field, resolution), visibility) in
            self.fields.iter().zip(resolutions).zip(states)
        {
            if visibility == Visibility::Hidden {
                continue;
            }
            match resolution {
                Resolution::Value => {
                    if let Some(value) = resolved.get(&field.key) {
                        values.insert(field.key.clone(), value.clone());
                    }
                }
                Resolution::Invalid(problem) => {
                    errors.push(FieldError::new(field.key.clone(), problem));
                }
                Resolution::Absent if field.required => {
                    errors.push(FieldError::new(field.key.clone(), FieldProblem::Missing));
                }
                Resolution::Absent => {}
            }
        }

        if errors.is_empty() {
            Ok(ValidatedConfig { values })
        } else {
            Err(ValidationError { fields: errors }.into())
        }
    }

    /// Decides whether the field at `index` is visible, deciding the fields
    /// its rule refers to first.
    ///
    /// A hidden field's value is removed from `effective`, so every rule
    /// that refers to it sees it as unset.
    fn resolve_visibility(
        &self,
        index: usize,
        state: &mut [Visibility],
        effective: &mut IndexMap<String, JsonValue>,
    ) {
        // `Resolving` here means a cycle. `check_definition` rejects those,
        // so only unchecked configs get here; the members keep their values.
        if state[index] != Visibility::Pending {
            return;
        }

        let field = &self.fields[index];
        let Some(rule) = &field.visible_when else {
            state[index] = Visibility::Visible;
            return;
        };

        state[index] = Visibility::Resolving;
        for reference in rule.referenced_keys() {
            if let Some(position) = self.fields.iter().position(|f| f.key == reference) {
                self.resolve_visibility(position, state, effective);
            }
        }

        if rule.is_satisfied(effective) {
            state[index] = Visibility::Visible;
        } else {
            state[index] = Visibility::Hidden;
            effective.shift_remove(&field.key);
        }
    }

    /// Returns true if following visibility references from `start` leads
    /// back to it through at least one other field.
    fn visibility_cycle(&self, start: usize) -> bool {
        let mut stack = vec![start];
        let mut seen = HashSet::new();
        while let Some(index) = stack.pop() {
            let Some(rule) = &self.fields[index].visible_when else {
                continue;
            };
            for reference in rule.referenced_keys() {
                if reference == self.fields[index].key {
                    continue;
                }
                let Some(next) = self.fields.iter().position(|f| f.key == reference) else {
                    continue;
                };
                if next == start {
                    return true;
                }
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        false
    }
}

impl FromIterator<InputField> for InputConfig {
    fn from_iter<I: IntoIterator<Item = InputField>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Configuration that passed validation.
///
/// Holds only declared, visible fields, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedConfig {
    values: IndexMap<String, JsonValue>,
}

impl ValidatedConfig {
    /// Returns the value of a field, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Deserializes one field into a concrete type.
    ///
    /// Returns `None` when the field is unset.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<serde_json::Result<T>> {
        self.values
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
    }

    /// Returns true if the field is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates over the keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of set fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.values
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Consumes the configuration, returning the ordered values.
    #[must_use]
    pub fn into_map(self) -> IndexMap<String, JsonValue> {
        self.values
    }

    /// Deserializes the whole configuration into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns an error if the values do not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn report_schema() -> InputConfig {
        InputConfig::new(vec![
            InputField::number("hour", "Hour").required(),
            InputField::select(
                "format",
                "Format",
                vec![
                    SelectOption::new("pdf", "PDF"),
                    SelectOption::new("csv", "CSV"),
                ],
            )
            .with_default(json!("pdf")),
            InputField::string("delimiter", "Delimiter")
                .required()
                .visible_when(VisibilityRule::equals("format", json!("csv"))),
        ])
    }

    #[test]
    fn empty_input_names_the_required_field() {
        let schema = InputConfig::new(vec![InputField::number("hour", "Hour").required()]);
        let report = schema
            .validate(&Map::new(), ValidationMode::Lenient)
            .expect_err("should fail");
        let err = report.current_context();
        assert_eq!(
            err.fields,
            vec![FieldError::new("hour", FieldProblem::Missing)]
        );
    }

    #[test]
    fn hidden_required_field_is_skipped_and_dropped() {
        let schema = report_schema();
        let config = schema
            .validate(
                &raw(json!({"hour": 9, "delimiter": 42})),
                ValidationMode::Lenient,
            )
            .expect("hidden field must not fail validation");

        assert_eq!(config.get("hour"), Some(&json!(9)));
        assert_eq!(config.get("format"), Some(&json!("pdf")));
        assert!(!config.contains("delimiter"));
    }

    #[test]
    fn visible_required_field_is_enforced() {
        let schema = report_schema();
        let report = schema
            .validate(
                &raw(json!({"hour": 9, "format": "csv"})),
                ValidationMode::Lenient,
            )
            .expect_err("delimiter is visible and required");
        assert!(report.current_context().mentions("delimiter"));
    }

    #[test]
    fn every_offending_field_is_reported() {
        let schema = report_schema();
        let report = schema
            .validate(
                &raw(json!({"hour": "nine", "format": "xml", "extra": 1})),
                ValidationMode::Strict,
            )
            .expect_err("should fail");
        let err = report.current_context();

        assert!(err.mentions("extra"));
        assert!(err.mentions("hour"));
        assert!(err.mentions("format"));
        assert_eq!(err.fields.len(), 3);
    }

    #[test]
    fn unknown_keys_are_dropped_in_lenient_mode() {
        let schema = InputConfig::new(vec![InputField::number("hour", "Hour").required()]);
        let config = schema
            .validate(
                &raw(json!({"hour": 9, "colour": "blue"})),
                ValidationMode::Lenient,
            )
            .expect("lenient mode ignores unknown keys");
        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["hour"]);
    }

    #[test]
    fn validated_values_follow_declaration_order() {
        let schema = InputConfig::new(vec![
            InputField::string("b", "B"),
            InputField::string("a", "A").with_default(json!("x")),
            InputField::number("c", "C"),
        ]);
        let config = schema
            .validate(&raw(json!({"c": 1, "b": "y"})), ValidationMode::Lenient)
            .expect("valid");

        let map = config.into_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(map["a"], json!("x"));
    }

    #[test]
    fn unknown_keys_fail_in_strict_mode() {
        let schema = InputConfig::new(vec![InputField::number("hour", "Hour").required()]);
        let report = schema
            .validate(
                &raw(json!({"hour": 9, "colour": "blue"})),
                ValidationMode::Strict,
            )
            .expect_err("strict mode rejects unknown keys");
        assert_eq!(
            report.current_context().fields,
            vec![FieldError::new("colour", FieldProblem::Unknown)]
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let schema = InputConfig::new(vec![InputField::number("hour", "Hour").required()]);
        let report = schema
            .validate(&raw(json!({"hour": null})), ValidationMode::Lenient)
            .expect_err("null is not a value");
        assert!(report.current_context().mentions("hour"));
    }

    #[test]
    fn dates_are_parsed() {
        let schema = InputConfig::new(vec![
            InputField::date("from", "From"),
            InputField::new("at", "At", FieldType::DateTime),
        ]);

        assert!(
            schema
                .validate(
                    &raw(json!({"from": "2026-10-16", "at": "2026-10-16T09:00:00Z"})),
                    ValidationMode::Lenient
                )
                .is_ok()
        );

        let report = schema
            .validate(&raw(json!({"from": "16/10/2026"})), ValidationMode::Lenient)
            .expect_err("wrong date format");
        assert_eq!(
            report.current_context().fields[0].problem,
            FieldProblem::InvalidDate {
                value: "16/10/2026".to_string()
            }
        );
    }

    #[test]
    fn dates_must_be_zero_padded() {
        let schema = InputConfig::new(vec![InputField::date("from", "From")]);

        for unpadded in ["2026-1-5", "2026-01-5", "2026-1-05"] {
            let report = schema
                .validate(&raw(json!({ "from": unpadded })), ValidationMode::Lenient)
                .expect_err("unpadded date");
            assert_eq!(
                report.current_context().fields,
                vec![FieldError::new(
                    "from",
                    FieldProblem::InvalidDate {
                        value: unpadded.to_string()
                    }
                )]
            );
        }

        assert!(
            schema
                .validate(&raw(json!({"from": "2026-01-05"})), ValidationMode::Lenient)
                .is_ok()
        );
    }

    #[test]
    fn multi_select_checks_each_value() {
        let schema = InputConfig::new(vec![InputField::new(
            "days",
            "Days",
            FieldType::Select {
                options: vec![
                    SelectOption::new("mon", "Monday"),
                    SelectOption::new("tue", "Tuesday"),
                ],
                multiple: true,
            },
        )]);

        assert!(
            schema
                .validate(
                    &raw(json!({"days": ["mon", "tue"]})),
                    ValidationMode::Lenient,
                )
                .is_ok()
        );
        assert!(
            schema
                .validate(
                    &raw(json!({"days": ["mon", "sun"]})),
                    ValidationMode::Lenient,
                )
                .is_err()
        );
        assert!(
            schema
                .validate(&raw(json!({"days": "mon"})), ValidationMode::Lenient)
                .is_err()
        );
    }

    #[test]
    fn check_definition_finds_declaration_problems() {
        let schema = InputConfig::new(vec![
            InputField::number("hour", "Hour"),
            InputField::number("hour", "Hour again"),
            InputField::select("mode", "Mode", vec![]),
            InputField::boolean("flag", "Flag").with_default(json!("yes")),
            InputField::string("note", "Note").visible_when(VisibilityRule::is_set("missing")),
            InputField::string("loop", "Loop").visible_when(VisibilityRule::is_set("loop")),
            InputField::string(" ", "Blank"),
        ]);

        let problems = schema.check_definition();
        assert!(problems.contains(&DefinitionProblem::DuplicateFieldKey {
            key: "hour".to_string()
        }));
        assert!(problems.contains(&DefinitionProblem::EmptySelectOptions {
            key: "mode".to_string()
        }));
        assert!(problems.contains(&DefinitionProblem::DefaultTypeMismatch {
            key: "flag".to_string()
        }));
        assert!(problems.contains(&DefinitionProblem::UnknownVisibilityReference {
            key: "note".to_string(),
            reference: "missing".to_string()
        }));
        assert!(problems.contains(&DefinitionProblem::SelfReferentialVisibility {
            key: "loop".to_string()
        }));
        assert!(problems.contains(&DefinitionProblem::BlankFieldKey { index: 6 }));
    }

    #[test]
    fn check_definition_finds_visibility_cycles() {
        let schema = InputConfig::new(vec![
            InputField::string("a", "A").visible_when(VisibilityRule::is_set("b")),
            InputField::string("b", "B").visible_when(VisibilityRule::is_set("c")),
            InputField::string("c", "C").visible_when(VisibilityRule::is_set("a")),
            InputField::string("d", "D").visible_when(VisibilityRule::is_set("a")),
        ]);

        let cyclic: Vec<_> = schema
            .check_definition()
            .into_iter()
            .filter_map(|problem| match problem {
                DefinitionProblem::CyclicVisibility { key } => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(cyclic, vec!["a", "b", "c"]);
    }

    fn chained_schema() -> InputConfig {
        InputConfig::new(vec![
            InputField::select(
                "mode",
                "Mode",
                vec![
                    SelectOption::new("basic", "Basic"),
                    SelectOption::new("advanced", "Advanced"),
                ],
            )
            .with_default(json!("basic")),
            InputField::string("path_suffix", "Path suffix")
                .required()
                .visible_when(VisibilityRule::is_set("advanced_path")),
            InputField::string("advanced_path", "Advanced path")
                .visible_when(VisibilityRule::equals("mode", json!("advanced"))),
        ])
    }

    #[test]
    fn hidden_field_counts_as_unset_for_dependent_rules() {
        let schema = chained_schema();
        assert!(schema.check_definition().is_empty());

        let config = schema
            .validate(
                &raw(json!({"advanced_path": "/x"})),
                ValidationMode::Lenient,
            )
            .expect("path_suffix hangs off a hidden field");
        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["mode"]);
    }

    #[test]
    fn visible_chain_still_enforces_required_fields() {
        let schema = chained_schema();

        let report = schema
            .validate(
                &raw(json!({"mode": "advanced", "advanced_path": "/x"})),
                ValidationMode::Lenient,
            )
            .expect_err("path_suffix is visible and required");
        assert_eq!(
            report.current_context().fields,
            vec![FieldError::new("path_suffix", FieldProblem::Missing)]
        );

        let config = schema
            .validate(
                &raw(json!({"mode": "advanced", "advanced_path": "/x", "path_suffix": "y"})),
                ValidationMode::Lenient,
            )
            .expect("complete chain");
        assert_eq!(
            config.keys().collect::<Vec<_>>(),
            vec!["mode", "path_suffix", "advanced_path"]
        );
    }

    #[test]
    fn not_equals_hides_on_match_and_shows_when_unset() {
        let schema = InputConfig::new(vec![
            InputField::string("format", "Format"),
            InputField::string("encoding", "Encoding")
                .required()
                .visible_when(VisibilityRule::NotEquals {
                    key: "format".to_string(),
                    value: json!("binary"),
                }),
        ]);

        let config = schema
            .validate(&raw(json!({"format": "binary"})), ValidationMode::Lenient)
            .expect("encoding is hidden for binary");
        assert!(!config.contains("encoding"));

        for input in [json!({"format": "text"}), json!({})] {
            let report = schema
                .validate(&raw(input), ValidationMode::Lenient)
                .expect_err("encoding is visible");
            assert!(report.current_context().mentions("encoding"));
        }
    }

    #[test]
    fn any_shows_field_when_one_rule_holds() {
        let rule = VisibilityRule::Any {
            rules: vec![
                VisibilityRule::equals("format", json!("csv")),
                VisibilityRule::is_set("delimiter"),
            ],
        };
        let schema = InputConfig::new(vec![
            InputField::string("format", "Format"),
            InputField::string("delimiter", "Delimiter"),
            InputField::boolean("header", "Header")
                .required()
                .visible_when(rule),
        ]);

        for input in [json!({"format": "csv"}), json!({"delimiter": ";"})] {
            let report = schema
                .validate(&raw(input), ValidationMode::Lenient)
                .expect_err("header is visible");
            assert!(report.current_context().mentions("header"));
        }

        let config = schema
            .validate(&raw(json!({"format": "pdf"})), ValidationMode::Lenient)
            .expect("no rule holds");
        assert!(!config.contains("header"));

        let rule = VisibilityRule::Any { rules: vec![] };
        assert!(!rule.is_satisfied(&IndexMap::new()));
    }

    #[test]
    fn nested_rules_evaluate() {
        let mut values = IndexMap::new();
        values.insert("format".to_string(), json!("csv"));

        let rule = VisibilityRule::All {
            rules: vec![
                VisibilityRule::In {
                    key: "format".to_string(),
                    values: vec![json!("csv"), json!("tsv")],
                },
                VisibilityRule::Not {
                    rule: Box::new(VisibilityRule::is_set("compressed")),
                },
            ],
        };
        assert!(rule.is_satisfied(&values));
        assert_eq!(rule.referenced_keys(), vec!["format", "compressed"]);

        values.insert("compressed".to_string(), json!(true));
        assert!(!rule.is_satisfied(&values));
    }

    #[test]
    fn validated_config_deserializes_into_struct() {
        #[derive(Deserialize)]
        struct Settings {
            hour: u8,
            format: String,
        }

        let config = report_schema()
            .validate(&raw(json!({"hour": 7})), ValidationMode::Lenient)
            .expect("valid");
        let settings: Settings = config.deserialize().expect("fits struct");
        assert_eq!(settings.hour, 7);
        assert_eq!(settings.format, "pdf");

        let hour: u8 = config.get_as("hour").expect("set").expect("is a number");
        assert_eq!(hour, 7);
    }

    #[test]
    fn schema_serializes_with_type_tags() {
        let field = InputField::number("hour", "Hour").required();
        let json = serde_json::to_value(&field).expect("serialize");
        assert_eq!(json["field_type"], json!({"type": "number"}));
        assert_eq!(json["required"], json!(true));
    }
}
