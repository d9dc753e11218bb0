use serde::{Deserialize, Serialize};

/// Parameter types that designate an object rather than a value.
const OBJECT_PARAMETER_TYPES: &[&str] = &[
    "object",
    "objectPtr",
    "objectList",
    "objectListOrEmptyIfJustDeclared",
    "objectListOrEmptyWithoutPicking",
];

const NUMBER_PARAMETER_TYPES: &[&str] = &["number", "expression", "camera", "forceMultiplier"];

pub fn is_object_type(value_type: &str) -> bool {
    OBJECT_PARAMETER_TYPES.contains(&value_type)
}

/// Reduce a parameter type to the value an expression must return to fill it:
/// `"number"`, `"string"`, `"number|string"` or `"object"`.
pub fn primitive_value_type(value_type: &str) -> &'static str {
    if is_object_type(value_type) {
        "object"
    } else if NUMBER_PARAMETER_TYPES.contains(&value_type) {
        "number"
    } else if value_type == "number|string" {
        "number|string"
    } else {
        "string"
    }
}

/// Whether an expression returning `return_type` may be offered for a slot
/// expecting `expected_type`. Numbers are accepted in strings because the
/// insertion wraps them in `ToString`.
pub fn is_return_type_accepted(expected_type: &str, return_type: &str) -> bool {
    match primitive_value_type(expected_type) {
        "number|string" => matches!(return_type, "number" | "string"),
        "string" => matches!(return_type, "number" | "string"),
        "number" => return_type == "number",
        _ => false,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub description: String,
    pub code_only: bool,
    pub optional: bool,
    pub extra_info: String,
}

impl ParameterMetadata {
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            ..Self::default()
        }
    }

    pub fn code_only(mut self) -> Self {
        self.code_only = true;
        self
    }

    pub fn with_extra_info(mut self, extra_info: impl Into<String>) -> Self {
        self.extra_info = extra_info.into();
        self
    }

    /// Choices declared for a `stringWithSelector` parameter, stored as a JSON
    /// array of strings in the extra information.
    pub fn choices(&self) -> Vec<String> {
        serde_json::from_str::<Vec<String>>(&self.extra_info).unwrap_or_default()
    }

    /// Comma separated value types accepted by a `functionParameterName`
    /// parameter. Empty means any type.
    pub fn allowed_types(&self) -> Vec<&str> {
        self.extra_info
            .split(',')
            .map(str::trim)
            .filter(|value_type| !value_type.is_empty())
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpressionMetadata {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub group: String,
    pub icon: Option<String>,
    pub return_type: String,
    pub parameters: Vec<ParameterMetadata>,
    pub extension: Option<String>,
    pub is_private: bool,
    pub is_hidden: bool,
}

impl ExpressionMetadata {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            full_name: name.clone(),
            name,
            return_type: return_type.into(),
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterMetadata) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// Who declares an expression. Object and behavior expressions receive their
/// receivers as leading parameters that never appear in the typed call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExpressionOwner {
    Free,
    #[serde(rename_all = "camelCase")]
    Object { object_type: String },
    #[serde(rename_all = "camelCase")]
    Behavior { behavior_type: String },
}

impl ExpressionOwner {
    /// Number of leading implicit parameters: the object (index 0) and, for
    /// behaviors, the behavior itself (index 1).
    pub const fn implicit_parameter_count(&self) -> usize {
        match self {
            ExpressionOwner::Free => 0,
            ExpressionOwner::Object { .. } => 1,
            ExpressionOwner::Behavior { .. } => 2,
        }
    }
}

/// An expression together with the owner it was enumerated from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumeratedExpression {
    pub metadata: ExpressionMetadata,
    pub owner: ExpressionOwner,
}

impl EnumeratedExpression {
    pub fn new(metadata: ExpressionMetadata, owner: ExpressionOwner) -> Self {
        Self { metadata, owner }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn visible_parameters(&self) -> impl Iterator<Item = &ParameterMetadata> {
        self.metadata
            .parameters
            .iter()
            .skip(self.owner.implicit_parameter_count())
            .filter(|parameter| !parameter.code_only)
    }

    pub fn has_visible_parameters(&self) -> bool {
        self.visible_parameters().next().is_some()
    }
}

/// Lexical position of the expression being edited.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventsScope {
    pub layout: Option<String>,
    pub extension: Option<String>,
    pub events_function: Option<String>,
}

impl EventsScope {
    pub fn for_layout(layout: impl Into<String>) -> Self {
        Self {
            layout: Some(layout.into()),
            ..Self::default()
        }
    }

    /// Hidden expressions are never offered; private ones only inside the
    /// extension declaring them.
    pub fn can_use(&self, metadata: &ExpressionMetadata) -> bool {
        if metadata.is_hidden {
            return false;
        }
        if !metadata.is_private {
            return true;
        }
        match (&metadata.extension, &self.extension) {
            (Some(declared), Some(current)) => declared == current,
            _ => false,
        }
    }
}

/// Declarative knowledge about the project and the registered extensions.
///
/// Every lookup degrades to an empty answer when the name is unknown. Methods
/// returning `Option` answer `None` when the object exists but has no such
/// data (for instance points on a text object).
pub trait MetadataProvider {
    fn free_expressions(&self, value_type: &str) -> Vec<ExpressionMetadata>;
    fn object_expressions(&self, value_type: &str, object_type: &str) -> Vec<ExpressionMetadata>;
    fn behavior_expressions(&self, value_type: &str, behavior_type: &str)
    -> Vec<ExpressionMetadata>;

    /// Type of an object, or the common type of a group's members.
    fn object_type(&self, object_name: &str) -> Option<String>;
    /// Behaviors of an object, or those shared by every member of a group.
    fn behaviors_of_object(&self, object_name: &str) -> Vec<String>;
    fn behavior_type(&self, object_name: &str, behavior_name: &str) -> Option<String>;
    /// Type of the first behavior with this name, whatever the object.
    fn behavior_type_by_name(&self, behavior_name: &str) -> Option<String>;
    fn group_members(&self, group_name: &str) -> Option<Vec<String>>;

    fn layer_names(&self, layout: &str) -> Vec<String>;
    fn scene_names(&self) -> Vec<String>;
    fn animation_names(&self, object_name: &str) -> Option<Vec<String>>;
    fn point_names(&self, object_name: &str) -> Option<Vec<String>>;
    fn object_effect_names(&self, object_name: &str) -> Option<Vec<String>>;
    fn object_effect_parameter_names(
        &self,
        object_name: &str,
        effect_name: &str,
    ) -> Option<Vec<String>>;
    fn layer_effect_names(&self, layout: &str, layer_name: &str) -> Vec<String>;
    fn layer_effect_parameter_names(
        &self,
        layout: &str,
        layer_name: &str,
        effect_name: &str,
    ) -> Vec<String>;
    fn function_parameters(&self, extension: &str, function: &str) -> Vec<ParameterMetadata>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receivers_are_not_visible_parameters() {
        let metadata = ExpressionMetadata::new("Speed", "number")
            .with_parameter(ParameterMetadata::new("object", "object"))
            .with_parameter(ParameterMetadata::new("behavior", "behavior"));
        let behavior = EnumeratedExpression::new(
            metadata.clone(),
            ExpressionOwner::Behavior {
                behavior_type: "PlatformBehavior::PlatformerObjectBehavior".to_string(),
            },
        );
        assert!(!behavior.has_visible_parameters());

        let free = EnumeratedExpression::new(metadata, ExpressionOwner::Free);
        assert_eq!(free.visible_parameters().count(), 2);
    }

    #[test]
    fn code_only_parameters_are_hidden() {
        let metadata = ExpressionMetadata::new("TouchX", "number")
            .with_parameter(ParameterMetadata::new("scene", "currentScene").code_only())
            .with_parameter(ParameterMetadata::new("touch", "expression"));
        let expression = EnumeratedExpression::new(metadata, ExpressionOwner::Free);
        let names: Vec<_> = expression.visible_parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["touch"]);
    }

    #[test]
    fn private_expressions_stay_in_their_extension() {
        let mut metadata = ExpressionMetadata::new("Secret", "number");
        metadata.is_private = true;
        metadata.extension = Some("MyExtension".to_string());

        let mut scope = EventsScope::for_layout("Scene");
        assert!(!scope.can_use(&metadata));
        scope.extension = Some("MyExtension".to_string());
        assert!(scope.can_use(&metadata));

        metadata.is_hidden = true;
        assert!(!scope.can_use(&metadata));
    }

    #[test]
    fn parameter_extra_info_is_decoded() {
        let choices = ParameterMetadata::new("mode", "stringWithSelector")
            .with_extra_info(r#"["Left", "Right"]"#);
        assert_eq!(choices.choices(), vec!["Left", "Right"]);

        let names = ParameterMetadata::new("param", "functionParameterName")
            .with_extra_info("number, string");
        assert_eq!(names.allowed_types(), vec!["number", "string"]);
        assert!(ParameterMetadata::default().choices().is_empty());
    }

    #[test]
    fn strings_accept_numbers_but_not_the_reverse() {
        assert!(is_return_type_accepted("string", "number"));
        assert!(is_return_type_accepted("layer", "string"));
        assert!(!is_return_type_accepted("number", "string"));
        assert!(!is_return_type_accepted("objectList", "number"));
        assert!(is_object_type("objectPtr"));
    }
}
