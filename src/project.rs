use crate::{
    expression::AutocompletionError,
    metadata::{
        EnumeratedExpression, ExpressionMetadata, ExpressionOwner, MetadataProvider,
        ParameterMetadata, is_return_type_accepted,
    },
};
use once_cell::sync::OnceCell;
use rapidhash::fast::RandomState;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

/// In-memory project and extension metadata, usually loaded from JSON.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMetadata {
    pub expressions: Vec<EnumeratedExpression>,
    pub objects: Vec<ObjectDefinition>,
    pub groups: Vec<GroupDefinition>,
    pub layouts: Vec<LayoutDefinition>,
    pub functions: Vec<FunctionDefinition>,
    #[serde(skip)]
    object_index: OnceCell<HashMap<String, usize, RandomState>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub behaviors: Vec<BehaviorDefinition>,
    pub animations: Option<Vec<String>>,
    pub points: Option<Vec<String>>,
    pub effects: Vec<EffectDefinition>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub behavior_type: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub effect_type: String,
    pub parameters: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDefinition {
    pub name: String,
    pub objects: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDefinition {
    pub name: String,
    pub layers: Vec<LayerDefinition>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDefinition {
    pub name: String,
    pub effects: Vec<EffectDefinition>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDefinition {
    pub extension: String,
    pub name: String,
    pub parameters: Vec<ParameterMetadata>,
}

impl ProjectMetadata {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, AutocompletionError> {
        let text = std::fs::read_to_string(path).map_err(|source| AutocompletionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| AutocompletionError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDefinition> {
        let index = self.object_index.get_or_init(|| {
            let mut index = HashMap::with_hasher(RandomState::new());
            for (position, object) in self.objects.iter().enumerate() {
                index.entry(object.name.clone()).or_insert(position);
            }
            index
        });
        index.get(name).and_then(|position| self.objects.get(*position))
    }

    fn group(&self, name: &str) -> Option<&GroupDefinition> {
        self.groups.iter().find(|group| group.name == name)
    }

    fn layer(&self, layout: &str, layer_name: &str) -> Option<&LayerDefinition> {
        self.layouts
            .iter()
            .find(|candidate| candidate.name == layout)?
            .layers
            .iter()
            .find(|layer| layer.name == layer_name)
    }

    /// Objects designated by a name: the object itself, or every member of a group.
    fn resolve_objects(&self, name: &str) -> Vec<&ObjectDefinition> {
        if let Some(object) = self.object(name) {
            return vec![object];
        }
        self.group(name)
            .map(|group| {
                group
                    .objects
                    .iter()
                    .filter_map(|member| self.object(member))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn expressions_where(
        &self,
        value_type: &str,
        owner_matches: impl Fn(&ExpressionOwner) -> bool,
    ) -> Vec<ExpressionMetadata> {
        self.expressions
            .iter()
            .filter(|expression| owner_matches(&expression.owner))
            .filter(|expression| {
                is_return_type_accepted(value_type, &expression.metadata.return_type)
            })
            .map(|expression| expression.metadata.clone())
            .collect()
    }
}

impl MetadataProvider for ProjectMetadata {
    fn free_expressions(&self, value_type: &str) -> Vec<ExpressionMetadata> {
        self.expressions_where(value_type, |owner| matches!(owner, ExpressionOwner::Free))
    }

    // Expressions declared on the base object (empty type) apply to every object.
    fn object_expressions(&self, value_type: &str, object_type: &str) -> Vec<ExpressionMetadata> {
        self.expressions_where(value_type, |owner| match owner {
            ExpressionOwner::Object { object_type: declared } => {
                declared.is_empty() || declared == object_type
            }
            _ => false,
        })
    }

    fn behavior_expressions(
        &self,
        value_type: &str,
        behavior_type: &str,
    ) -> Vec<ExpressionMetadata> {
        self.expressions_where(value_type, |owner| match owner {
            ExpressionOwner::Behavior {
                behavior_type: declared,
            } => declared == behavior_type,
            _ => false,
        })
    }

    fn object_type(&self, object_name: &str) -> Option<String> {
        if let Some(object) = self.object(object_name) {
            return Some(object.object_type.clone());
        }
        let members = self.resolve_objects(object_name);
        let first = members.first()?;
        if members
            .iter()
            .all(|member| member.object_type == first.object_type)
        {
            Some(first.object_type.clone())
        } else {
            Some(String::new())
        }
    }

    fn behaviors_of_object(&self, object_name: &str) -> Vec<String> {
        let members = self.resolve_objects(object_name);
        let Some((first, rest)) = members.split_first() else {
            return Vec::new();
        };
        first
            .behaviors
            .iter()
            .map(|behavior| behavior.name.clone())
            .filter(|name| {
                rest.iter()
                    .all(|member| member.behaviors.iter().any(|b| &b.name == name))
            })
            .collect()
    }

    fn behavior_type(&self, object_name: &str, behavior_name: &str) -> Option<String> {
        self.resolve_objects(object_name)
            .into_iter()
            .find_map(|object| {
                object
                    .behaviors
                    .iter()
                    .find(|behavior| behavior.name == behavior_name)
            })
            .map(|behavior| behavior.behavior_type.clone())
    }

    fn behavior_type_by_name(&self, behavior_name: &str) -> Option<String> {
        self.objects
            .iter()
            .flat_map(|object| object.behaviors.iter())
            .find(|behavior| behavior.name == behavior_name)
            .map(|behavior| behavior.behavior_type.clone())
    }

    fn group_members(&self, group_name: &str) -> Option<Vec<String>> {
        self.group(group_name).map(|group| group.objects.clone())
    }

    fn layer_names(&self, layout: &str) -> Vec<String> {
        self.layouts
            .iter()
            .find(|candidate| candidate.name == layout)
            .map(|layout| layout.layers.iter().map(|layer| layer.name.clone()).collect())
            .unwrap_or_default()
    }

    fn scene_names(&self) -> Vec<String> {
        self.layouts.iter().map(|layout| layout.name.clone()).collect()
    }

    fn animation_names(&self, object_name: &str) -> Option<Vec<String>> {
        self.object(object_name)?.animations.clone()
    }

    fn point_names(&self, object_name: &str) -> Option<Vec<String>> {
        self.object(object_name)?.points.clone()
    }

    fn object_effect_names(&self, object_name: &str) -> Option<Vec<String>> {
        let object = self.object(object_name)?;
        Some(object.effects.iter().map(|effect| effect.name.clone()).collect())
    }

    fn object_effect_parameter_names(
        &self,
        object_name: &str,
        effect_name: &str,
    ) -> Option<Vec<String>> {
        self.object(object_name)?
            .effects
            .iter()
            .find(|effect| effect.name == effect_name)
            .map(|effect| effect.parameters.clone())
    }

    fn layer_effect_names(&self, layout: &str, layer_name: &str) -> Vec<String> {
        self.layer(layout, layer_name)
            .map(|layer| layer.effects.iter().map(|effect| effect.name.clone()).collect())
            .unwrap_or_default()
    }

    fn layer_effect_parameter_names(
        &self,
        layout: &str,
        layer_name: &str,
        effect_name: &str,
    ) -> Vec<String> {
        self.layer(layout, layer_name)
            .and_then(|layer| layer.effects.iter().find(|effect| effect.name == effect_name))
            .map(|effect| effect.parameters.clone())
            .unwrap_or_default()
    }

    fn function_parameters(&self, extension: &str, function: &str) -> Vec<ParameterMetadata> {
        self.functions
            .iter()
            .find(|candidate| candidate.extension == extension && candidate.name == function)
            .map(|function| function.parameters.clone())
            .unwrap_or_default()
    }
}
