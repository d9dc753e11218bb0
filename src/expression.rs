use crate::metadata::ParameterMetadata;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum AutocompletionError {
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown expression field: {0}")]
    UnknownField(String),
}

/// What the parser found under the caret.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionKind {
    ExpressionWithPrefix,
    Object,
    BehaviorWithPrefix,
    TextWithPrefix,
    Variable,
    Property,
    Parameter,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableType {
    #[default]
    Number,
    String,
    Boolean,
    Structure,
    Array,
}

/// Completion description emitted by the expression parser for a caret position.
///
/// Positions are char offsets into the expression text; the end is exclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionDescription {
    pub kind: CompletionKind,
    #[serde(default)]
    pub prefix: String,
    #[serde(rename = "type", default)]
    pub value_type: String,
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub behavior_name: String,
    #[serde(default)]
    pub replacement_start_position: usize,
    #[serde(default)]
    pub replacement_end_position: usize,
    #[serde(default)]
    pub is_exact: bool,
    #[serde(default)]
    pub is_last_parameter: bool,
    #[serde(default)]
    pub completion: String,
    #[serde(default)]
    pub variable_type: VariableType,
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub parameter_type: String,
    #[serde(default)]
    pub parameter_metadata: Option<ParameterMetadata>,
    #[serde(default)]
    pub layer_name: Option<String>,
    #[serde(default)]
    pub effect_name: Option<String>,
    #[serde(default)]
    pub node_start_position: Option<usize>,
}

impl CompletionDescription {
    pub fn new(
        kind: CompletionKind,
        value_type: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
            value_type: value_type.into(),
            object_name: String::new(),
            behavior_name: String::new(),
            replacement_start_position: 0,
            replacement_end_position: 0,
            is_exact: false,
            is_last_parameter: false,
            completion: String::new(),
            variable_type: VariableType::default(),
            property_type: String::new(),
            parameter_type: String::new(),
            parameter_metadata: None,
            layer_name: None,
            effect_name: None,
            node_start_position: None,
        }
    }

    pub fn with_replacement(mut self, start: usize, end: usize) -> Self {
        self.replacement_start_position = start;
        self.replacement_end_position = end.max(start);
        self
    }

    pub fn with_object(mut self, object_name: impl Into<String>) -> Self {
        self.object_name = object_name.into();
        self
    }

    pub fn with_behavior(mut self, behavior_name: impl Into<String>) -> Self {
        self.behavior_name = behavior_name.into();
        self
    }

    pub fn with_completion(mut self, completion: impl Into<String>) -> Self {
        self.completion = completion.into();
        self
    }

    pub fn exact(mut self) -> Self {
        self.is_exact = true;
        self
    }

    pub fn last_parameter(mut self) -> Self {
        self.is_last_parameter = true;
        self
    }
}

/// Parses an expression and describes what can be completed at the caret.
///
/// Malformed expressions still yield best-effort descriptions; an empty vector
/// means there is nothing to suggest.
pub trait CompletionDescriptionSource {
    fn completion_descriptions(
        &self,
        expression: &str,
        expected_type: &str,
        caret: usize,
    ) -> Vec<CompletionDescription>;
}

impl<F> CompletionDescriptionSource for F
where
    F: Fn(&str, &str, usize) -> Vec<CompletionDescription>,
{
    fn completion_descriptions(
        &self,
        expression: &str,
        expected_type: &str,
        caret: usize,
    ) -> Vec<CompletionDescription> {
        self(expression, expected_type, caret)
    }
}

/// Text of an expression field together with its caret, in chars.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionAndCaret {
    pub expression: String,
    pub caret_location: usize,
}

impl ExpressionAndCaret {
    pub fn new(expression: impl Into<String>, caret_location: usize) -> Self {
        Self {
            expression: expression.into(),
            caret_location,
        }
    }
}

/// Load a list of completion descriptions from a JSON file.
pub fn load_descriptions(
    path: &std::path::Path,
) -> Result<Vec<CompletionDescription>, AutocompletionError> {
    let text = std::fs::read_to_string(path).map_err(|source| AutocompletionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| AutocompletionError::Json {
        path: path.to_path_buf(),
        source,
    })
}
