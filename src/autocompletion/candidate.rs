use crate::{
    autocompletion::markdown,
    expression::VariableType,
    metadata::EnumeratedExpression,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ICON: &str = "res/types/default.png";

/// Kind-specific payload of an [`Autocompletion`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum AutocompletionKind {
    Expression {
        expression: EnumeratedExpression,
        should_convert_to_string: bool,
    },
    Text,
    Variable {
        variable_type: VariableType,
    },
    Property {
        property_type: String,
    },
    Parameter {
        parameter_type: String,
    },
    Object {
        object_type: Option<String>,
    },
    Behavior {
        behavior_type: Option<String>,
    },
    /// Replaces the entire expression instead of splicing into it.
    FullExpression,
}

/// A candidate shown in the autocompletion list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Autocompletion {
    pub completion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_start_position: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_end_position: Option<usize>,
    #[serde(default)]
    pub add_parenthesis: bool,
    #[serde(default)]
    pub add_dot: bool,
    #[serde(default)]
    pub add_parameter_separator: bool,
    #[serde(default)]
    pub add_namespace_separator: bool,
    #[serde(default)]
    pub has_visible_parameters: bool,
    #[serde(default)]
    pub is_exact: bool,
    /// Start of the enclosing expression node, when the parser knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_start_position: Option<usize>,
    #[serde(flatten)]
    pub kind: AutocompletionKind,
}

impl Autocompletion {
    pub fn new(kind: AutocompletionKind, completion: impl Into<String>) -> Self {
        Self {
            completion: completion.into(),
            replacement_start_position: None,
            replacement_end_position: None,
            add_parenthesis: false,
            add_dot: false,
            add_parameter_separator: false,
            add_namespace_separator: false,
            has_visible_parameters: false,
            is_exact: false,
            node_start_position: None,
            kind,
        }
    }

    pub fn text(completion: impl Into<String>) -> Self {
        Self::new(AutocompletionKind::Text, completion)
    }

    pub fn full_expression(expression: impl Into<String>) -> Self {
        Self::new(AutocompletionKind::FullExpression, expression)
    }

    pub fn with_replacement(mut self, start: usize, end: usize) -> Self {
        self.replacement_start_position = Some(start);
        self.replacement_end_position = Some(end);
        self
    }

    pub fn should_convert_to_string(&self) -> bool {
        matches!(
            self.kind,
            AutocompletionKind::Expression {
                should_convert_to_string: true,
                ..
            }
        )
    }

    pub fn is_full_expression(&self) -> bool {
        matches!(self.kind, AutocompletionKind::FullExpression)
    }

    /// Text shown in the list; separators are only added on insertion.
    pub fn label(&self) -> &str {
        &self.completion
    }

    /// Icon path for the presentation layer, falling back to [`DEFAULT_ICON`].
    pub fn icon(&self) -> String {
        let icon = match &self.kind {
            AutocompletionKind::Expression { expression, .. } => expression.metadata.icon.clone(),
            AutocompletionKind::Variable { variable_type } => Some(
                match variable_type {
                    VariableType::Number => "res/types/number.svg",
                    VariableType::String => "res/types/string.svg",
                    VariableType::Boolean => "res/types/boolean.svg",
                    VariableType::Structure => "res/types/structure.svg",
                    VariableType::Array => "res/types/array.svg",
                }
                .to_string(),
            ),
            AutocompletionKind::Property { property_type } => type_icon(property_type),
            AutocompletionKind::Parameter { parameter_type } => type_icon(parameter_type),
            AutocompletionKind::Object { object_type } => object_type
                .as_deref()
                .filter(|object_type| !object_type.is_empty())
                .map(|object_type| format!("res/objects/{}.svg", icon_file_name(object_type))),
            AutocompletionKind::Behavior { behavior_type } => behavior_type
                .as_deref()
                .filter(|behavior_type| !behavior_type.is_empty())
                .map(|behavior_type| {
                    format!("res/behaviors/{}.svg", icon_file_name(behavior_type))
                }),
            AutocompletionKind::Text | AutocompletionKind::FullExpression => None,
        };
        icon.filter(|icon| !icon.is_empty())
            .unwrap_or_else(|| DEFAULT_ICON.to_string())
    }

    /// Markdown for the documentation panel.
    pub fn documentation(&self) -> Option<String> {
        match &self.kind {
            AutocompletionKind::Expression { expression, .. } => {
                markdown::expression_markdown(expression)
            }
            AutocompletionKind::Variable { variable_type } => {
                markdown::text_markdown(&format!("{variable_type:?} variable"))
            }
            AutocompletionKind::Property { property_type } => {
                markdown::text_markdown(&format!("Property of type `{property_type}`"))
            }
            AutocompletionKind::Parameter { parameter_type } => {
                markdown::text_markdown(&format!("Parameter of type `{parameter_type}`"))
            }
            AutocompletionKind::Behavior {
                behavior_type: Some(behavior_type),
            } => markdown::text_markdown(&format!("Behavior `{behavior_type}`")),
            AutocompletionKind::Object {
                object_type: Some(object_type),
            } if !object_type.is_empty() => {
                markdown::text_markdown(&format!("Object of type `{object_type}`"))
            }
            AutocompletionKind::Object { .. }
            | AutocompletionKind::Behavior { .. }
            | AutocompletionKind::Text
            | AutocompletionKind::FullExpression => None,
        }
    }
}

fn type_icon(value_type: &str) -> Option<String> {
    match value_type {
        "number" => Some("res/types/number.svg".to_string()),
        "string" => Some("res/types/string.svg".to_string()),
        "boolean" => Some("res/types/boolean.svg".to_string()),
        _ => None,
    }
}

// `Extension::Type` becomes `Extension-Type`.
fn icon_file_name(type_name: &str) -> String {
    type_name.replace("::", "-")
}
