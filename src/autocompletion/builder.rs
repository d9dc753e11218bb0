use crate::{
    autocompletion::candidate::{Autocompletion, AutocompletionKind},
    expression::{CompletionDescription, CompletionKind},
    metadata::{
        EnumeratedExpression, EventsScope, ExpressionMetadata, ExpressionOwner, MetadataProvider,
        is_object_type,
    },
};
use log::debug;
#[cfg(feature = "tracing")]
use std::time::Instant;

const NAMESPACE_SEPARATOR: &str = "::";

/// What the builder needs besides the descriptions themselves.
#[derive(Clone, Copy)]
pub struct AutocompletionContext<'a> {
    pub metadata: &'a dyn MetadataProvider,
    pub scope: &'a EventsScope,
}

impl<'a> AutocompletionContext<'a> {
    pub fn new(metadata: &'a dyn MetadataProvider, scope: &'a EventsScope) -> Self {
        Self { metadata, scope }
    }
}

#[cfg(feature = "tracing")]
struct PhaseTimer {
    phase: &'static str,
    start: Instant,
}

#[cfg(feature = "tracing")]
impl PhaseTimer {
    fn new(phase: &'static str) -> Self {
        tracing::trace!(target = "autocompletion", phase = phase, "start");
        Self {
            phase,
            start: Instant::now(),
        }
    }
}

#[cfg(feature = "tracing")]
impl Drop for PhaseTimer {
    fn drop(&mut self) {
        tracing::debug!(
            target = "autocompletion",
            phase = self.phase,
            elapsed_us = self.start.elapsed().as_micros()
        );
    }
}

/// Expand parser descriptions into autocompletion candidates.
///
/// Candidates keep the order of the descriptions they come from. Nothing is
/// de-duplicated across descriptions.
pub fn build_autocompletions(
    context: &AutocompletionContext<'_>,
    descriptions: &[CompletionDescription],
) -> Vec<Autocompletion> {
    #[cfg(feature = "tracing")]
    let _timer = PhaseTimer::new("build_autocompletions");

    let autocompletions: Vec<Autocompletion> = descriptions
        .iter()
        .flat_map(|description| autocompletions_for(context, description))
        .filter(|autocompletion| autocompletion.is_exact || !autocompletion.completion.is_empty())
        .collect();

    debug!(
        "{} autocompletions from {} descriptions",
        autocompletions.len(),
        descriptions.len()
    );
    autocompletions
}

fn autocompletions_for(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<Autocompletion> {
    match description.kind {
        CompletionKind::ExpressionWithPrefix => {
            if !description.behavior_name.is_empty() {
                behavior_expression_autocompletions(context, description)
            } else if !description.object_name.is_empty() {
                object_expression_autocompletions(context, description)
            } else {
                free_expression_autocompletions(context, description)
            }
        }
        CompletionKind::Object => object_autocompletions(context, description),
        CompletionKind::BehaviorWithPrefix => behavior_autocompletions(context, description),
        CompletionKind::TextWithPrefix => text_autocompletions(context, description),
        CompletionKind::Variable => vec![passthrough(
            description,
            AutocompletionKind::Variable {
                variable_type: description.variable_type,
            },
        )],
        CompletionKind::Property => vec![passthrough(
            description,
            AutocompletionKind::Property {
                property_type: description.property_type.clone(),
            },
        )],
        CompletionKind::Parameter => vec![passthrough(
            description,
            AutocompletionKind::Parameter {
                parameter_type: description.parameter_type.clone(),
            },
        )],
    }
}

fn with_description_bounds(
    autocompletion: Autocompletion,
    description: &CompletionDescription,
) -> Autocompletion {
    let mut autocompletion = autocompletion.with_replacement(
        description.replacement_start_position,
        description.replacement_end_position,
    );
    autocompletion.node_start_position = description.node_start_position;
    autocompletion
}

fn passthrough(description: &CompletionDescription, kind: AutocompletionKind) -> Autocompletion {
    let mut autocompletion = with_description_bounds(
        Autocompletion::new(kind, description.completion.clone()),
        description,
    );
    autocompletion.is_exact = description.is_exact;
    autocompletion
}

/// Keep expressions usable in the scope whose name starts with the prefix, or
/// equals it for exact descriptions.
fn filter_expressions(
    context: &AutocompletionContext<'_>,
    expressions: Vec<ExpressionMetadata>,
    owner: &ExpressionOwner,
    description: &CompletionDescription,
) -> Vec<EnumeratedExpression> {
    let prefix = description.prefix.as_str();
    expressions
        .into_iter()
        .filter(|metadata| !metadata.name.is_empty())
        .filter(|metadata| {
            if description.is_exact {
                metadata.name == prefix
            } else {
                metadata.name.starts_with(prefix)
            }
        })
        .filter(|metadata| context.scope.can_use(metadata))
        .map(|metadata| EnumeratedExpression::new(metadata, owner.clone()))
        .collect()
}

fn expression_autocompletions(
    expressions: Vec<EnumeratedExpression>,
    description: &CompletionDescription,
) -> Vec<Autocompletion> {
    let completion_type = description.value_type.as_str();
    expressions
        .into_iter()
        .map(|expression| {
            let should_convert_to_string =
                completion_type == "string" && expression.metadata.return_type == "number";
            let name = expression.name().to_string();
            let has_visible_parameters = expression.has_visible_parameters();
            let mut autocompletion = with_description_bounds(
                Autocompletion::new(
                    AutocompletionKind::Expression {
                        expression,
                        should_convert_to_string,
                    },
                    name,
                ),
                description,
            );
            autocompletion.add_parenthesis = true;
            autocompletion.has_visible_parameters = has_visible_parameters;
            autocompletion.is_exact = description.is_exact;
            autocompletion
        })
        .collect()
}

fn free_expression_autocompletions(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<Autocompletion> {
    let expressions = context.metadata.free_expressions(&description.value_type);
    let filtered = filter_expressions(context, expressions, &ExpressionOwner::Free, description);
    expression_autocompletions(filtered, description)
}

fn object_expression_autocompletions(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<Autocompletion> {
    let object_name = description.object_name.as_str();
    let Some(object_type) = context.metadata.object_type(object_name) else {
        debug!("no object named {object_name}");
        return Vec::new();
    };

    let expressions = context
        .metadata
        .object_expressions(&description.value_type, &object_type);
    let owner = ExpressionOwner::Object { object_type };
    let filtered = filter_expressions(context, expressions, &owner, description);
    let mut autocompletions = expression_autocompletions(filtered, description);

    for behavior_name in context.metadata.behaviors_of_object(object_name) {
        let Some(behavior_type) = context.metadata.behavior_type(object_name, &behavior_name)
        else {
            continue;
        };
        if behavior_type.is_empty() {
            continue;
        }
        let expressions = context
            .metadata
            .behavior_expressions(&description.value_type, &behavior_type);
        let owner = ExpressionOwner::Behavior { behavior_type };
        let filtered = filter_expressions(context, expressions, &owner, description);
        autocompletions.extend(expression_autocompletions(filtered, description).into_iter().map(
            |mut autocompletion| {
                autocompletion.completion = format!(
                    "{behavior_name}{NAMESPACE_SEPARATOR}{}",
                    autocompletion.completion
                );
                autocompletion
            },
        ));
    }

    autocompletions
}

fn behavior_expression_autocompletions(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<Autocompletion> {
    let behavior_name = description.behavior_name.as_str();
    let behavior_type = if description.object_name.is_empty() {
        context.metadata.behavior_type_by_name(behavior_name)
    } else {
        context
            .metadata
            .behavior_type(&description.object_name, behavior_name)
    };
    let Some(behavior_type) = behavior_type.filter(|behavior_type| !behavior_type.is_empty())
    else {
        debug!("no behavior named {behavior_name}");
        return Vec::new();
    };

    let expressions = context
        .metadata
        .behavior_expressions(&description.value_type, &behavior_type);
    let owner = ExpressionOwner::Behavior { behavior_type };
    let filtered = filter_expressions(context, expressions, &owner, description);
    expression_autocompletions(filtered, description)
}

fn object_autocompletions(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<Autocompletion> {
    let object_type = context.metadata.object_type(&description.completion);
    let mut autocompletion = with_description_bounds(
        Autocompletion::new(
            AutocompletionKind::Object { object_type },
            description.completion.clone(),
        ),
        description,
    );
    // An object parameter takes the bare name; elsewhere a method call follows.
    autocompletion.add_dot = !is_object_type(&description.value_type);
    autocompletion.is_exact = description.is_exact;
    vec![autocompletion]
}

fn behavior_autocompletions(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<Autocompletion> {
    let object_name = description.object_name.as_str();
    context
        .metadata
        .behaviors_of_object(object_name)
        .into_iter()
        .filter(|behavior_name| behavior_name.contains(description.prefix.as_str()))
        .map(|behavior_name| {
            let behavior_type = context.metadata.behavior_type(object_name, &behavior_name);
            let mut autocompletion = with_description_bounds(
                Autocompletion::new(AutocompletionKind::Behavior { behavior_type }, behavior_name),
                description,
            );
            autocompletion.add_namespace_separator = true;
            autocompletion.is_exact = description.is_exact;
            autocompletion
        })
        .collect()
}

fn text_autocompletions(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<Autocompletion> {
    // An empty layer name is the base layer and stays offered as `""`.
    let mut texts: Vec<String> = literal_texts(context, description)
        .into_iter()
        .map(|text| format!("\"{text}\""))
        .collect();
    texts = filter_string_list(texts, &description.prefix);
    texts.sort();

    texts
        .into_iter()
        .map(|text| {
            let mut autocompletion =
                with_description_bounds(Autocompletion::text(text), description);
            autocompletion.add_parameter_separator = !description.is_last_parameter;
            autocompletion
        })
        .collect()
}

/// Unquoted literal values suggested for a string parameter of this type.
fn literal_texts(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<String> {
    let metadata = context.metadata;
    let scope = context.scope;
    let object_name = description.object_name.as_str();
    let layer_name = description.layer_name.as_deref().unwrap_or("");
    let effect_name = description.effect_name.as_deref().unwrap_or("");

    match description.value_type.as_str() {
        "layer" => scope
            .layout
            .as_deref()
            .map(|layout| metadata.layer_names(layout))
            .unwrap_or_default(),
        "sceneName" => metadata.scene_names(),
        "stringWithSelector" => description
            .parameter_metadata
            .as_ref()
            .map(|parameter| parameter.choices())
            .unwrap_or_default(),
        "objectAnimationName" => {
            names_shared_by_objects(metadata, object_name, |name| metadata.animation_names(name))
        }
        "objectPointName" => {
            names_shared_by_objects(metadata, object_name, |name| metadata.point_names(name))
        }
        "objectEffectName" => names_shared_by_objects(metadata, object_name, |name| {
            metadata.object_effect_names(name)
        }),
        "objectEffectParameterName" if !effect_name.is_empty() => {
            names_shared_by_objects(metadata, object_name, |name| {
                metadata.object_effect_parameter_names(name, effect_name)
            })
        }
        "layerEffectName" => scope
            .layout
            .as_deref()
            .map(|layout| metadata.layer_effect_names(layout, layer_name))
            .unwrap_or_default(),
        "layerEffectParameterName" if !effect_name.is_empty() => scope
            .layout
            .as_deref()
            .map(|layout| metadata.layer_effect_parameter_names(layout, layer_name, effect_name))
            .unwrap_or_default(),
        "functionParameterName" => function_parameter_names(context, description),
        _ => Vec::new(),
    }
}

/// Names available on an object, or on every member of a group. The first
/// member's order is kept.
fn names_shared_by_objects(
    metadata: &dyn MetadataProvider,
    object_name: &str,
    names_of: impl Fn(&str) -> Option<Vec<String>>,
) -> Vec<String> {
    if object_name.is_empty() {
        return Vec::new();
    }
    let members = metadata
        .group_members(object_name)
        .unwrap_or_else(|| vec![object_name.to_string()]);
    let mut members = members.iter();
    let Some(first) = members.next() else {
        return Vec::new();
    };
    let mut shared = names_of(first).unwrap_or_default();
    for member in members {
        let Some(names) = names_of(member) else {
            return Vec::new();
        };
        shared.retain(|name| names.contains(name));
    }
    shared.retain(|name| !name.is_empty());
    shared.dedup();
    shared
}

fn function_parameter_names(
    context: &AutocompletionContext<'_>,
    description: &CompletionDescription,
) -> Vec<String> {
    let (Some(extension), Some(function)) = (
        context.scope.extension.as_deref(),
        context.scope.events_function.as_deref(),
    ) else {
        return Vec::new();
    };
    let allowed_types = description
        .parameter_metadata
        .as_ref()
        .map(|parameter| parameter.allowed_types())
        .unwrap_or_default();

    context
        .metadata
        .function_parameters(extension, function)
        .into_iter()
        .filter(|parameter| !parameter.code_only)
        .filter(|parameter| {
            allowed_types.is_empty() || allowed_types.contains(&parameter.value_type.as_str())
        })
        .map(|parameter| parameter.name)
        .collect()
}

/// Case-insensitive substring filter. An empty search keeps everything.
pub fn filter_string_list(list: Vec<String>, search_text: &str) -> Vec<String> {
    if search_text.is_empty() {
        return list;
    }
    let lowercase_search = search_text.to_lowercase();
    list.into_iter()
        .filter(|text| text.to_lowercase().contains(&lowercase_search))
        .collect()
}

#[cfg(feature = "bench")]
pub mod bench_support {
    use super::*;
    use crate::project::ProjectMetadata;
    use anyhow::{Context, Result};

    pub struct BuilderBenchFixture {
        project: ProjectMetadata,
        scope: EventsScope,
        descriptions: Vec<CompletionDescription>,
    }

    impl BuilderBenchFixture {
        pub fn load(project: &str, descriptions: &str, layout: &str) -> Result<Self> {
            let project = ProjectMetadata::from_json(project).context("project fixture")?;
            let descriptions =
                serde_json::from_str(descriptions).context("descriptions fixture")?;
            Ok(Self {
                project,
                scope: EventsScope::for_layout(layout),
                descriptions,
            })
        }

        pub fn autocompletions(&self) -> usize {
            let context = AutocompletionContext::new(&self.project, &self.scope);
            build_autocompletions(&context, &self.descriptions).len()
        }

        pub fn description(&self, index: usize) -> Option<&CompletionDescription> {
            self.descriptions.get(index)
        }

        pub fn autocompletions_for(&self, description: &CompletionDescription) -> usize {
            let context = AutocompletionContext::new(&self.project, &self.scope);
            build_autocompletions(&context, std::slice::from_ref(description)).len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expression::VariableType,
        metadata::ParameterMetadata,
        project::ProjectMetadata,
    };

    const PROJECT: &str = r#"{
        "expressions": [
            { "metadata": { "name": "ToDeg", "returnType": "number",
                            "parameters": [{ "name": "angle", "type": "expression" }] },
              "owner": { "kind": "free" } },
            { "metadata": { "name": "TouchX", "returnType": "number",
                            "parameters": [{ "name": "scene", "type": "currentScene", "codeOnly": true },
                                           { "name": "touch", "type": "expression" }] },
              "owner": { "kind": "free" } },
            { "metadata": { "name": "ToString", "returnType": "string",
                            "parameters": [{ "name": "value", "type": "expression" }] },
              "owner": { "kind": "free" } },
            { "metadata": { "name": "Time", "returnType": "number" },
              "owner": { "kind": "free" } },
            { "metadata": { "name": "TopSecret", "returnType": "number", "isPrivate": true,
                            "extension": "Other" },
              "owner": { "kind": "free" } },
            { "metadata": { "name": "X", "returnType": "number",
                            "parameters": [{ "name": "object", "type": "object" }] },
              "owner": { "kind": "object", "objectType": "" } },
            { "metadata": { "name": "PointX", "returnType": "number",
                            "parameters": [{ "name": "object", "type": "object" },
                                           { "name": "point", "type": "objectPointName" }] },
              "owner": { "kind": "object", "objectType": "Sprite" } },
            { "metadata": { "name": "JumpSpeed", "returnType": "number",
                            "parameters": [{ "name": "object", "type": "object" },
                                           { "name": "behavior", "type": "behavior" }] },
              "owner": { "kind": "behavior",
                         "behaviorType": "PlatformBehavior::PlatformerObjectBehavior" } }
        ],
        "objects": [
            { "name": "MySpriteObject", "type": "Sprite",
              "animations": ["Jump", "", "Run"], "points": ["Origin", "Head"],
              "effects": [{ "name": "Glow", "type": "Glow", "parameters": ["color", "distance"] }] },
            { "name": "OtherSprite", "type": "Sprite",
              "animations": ["Run"], "points": ["Origin", "Foot"],
              "effects": [{ "name": "Glow", "type": "Glow", "parameters": ["distance"] }] },
            { "name": "MySpriteObjectWithBehaviors", "type": "Sprite",
              "behaviors": [
                  { "name": "PlatformerObject", "type": "PlatformBehavior::PlatformerObjectBehavior" },
                  { "name": "Draggable", "type": "DraggableBehavior::Draggable" }
              ] },
            { "name": "Label", "type": "TextObject::Text" }
        ],
        "groups": [
            { "name": "Sprites", "objects": ["MySpriteObject", "OtherSprite"] },
            { "name": "Mixed", "objects": ["MySpriteObject", "Label"] }
        ],
        "layouts": [
            { "name": "Scene", "layers": [
                { "name": "Foreground" },
                { "name": "Background", "effects": [{ "name": "Blur", "type": "Blur",
                                                      "parameters": ["radius", "quality"] }] },
                { "name": "" }
            ] },
            { "name": "Menu" }
        ],
        "functions": [
            { "extension": "MyExtension", "name": "DoSomething", "parameters": [
                { "name": "runtimeScene", "type": "currentScene", "codeOnly": true },
                { "name": "Amount", "type": "number" },
                { "name": "Label", "type": "string" }
            ] }
        ]
    }"#;

    fn project() -> ProjectMetadata {
        ProjectMetadata::from_json(PROJECT).expect("project fixture")
    }

    fn build(
        project: &ProjectMetadata,
        scope: &EventsScope,
        description: CompletionDescription,
    ) -> Vec<Autocompletion> {
        build_autocompletions(&AutocompletionContext::new(project, scope), &[description])
    }

    fn completions(autocompletions: &[Autocompletion]) -> Vec<&str> {
        autocompletions
            .iter()
            .map(|autocompletion| autocompletion.completion.as_str())
            .collect()
    }

    #[test]
    fn free_expressions_convert_numbers_in_strings() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "string", "To")
                .with_replacement(0, 2),
        );

        assert_eq!(completions(&items), vec!["ToDeg", "TouchX", "ToString"]);
        assert!(items.iter().all(|item| item.add_parenthesis && !item.is_exact));
        assert!(items[0].should_convert_to_string());
        assert!(items[1].should_convert_to_string());
        assert!(!items[2].should_convert_to_string());
        assert_eq!(items[0].replacement_start_position, Some(0));
        assert_eq!(items[0].replacement_end_position, Some(2));
    }

    #[test]
    fn free_expressions_filter_by_case_sensitive_prefix() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "number", "T"),
        );
        assert_eq!(completions(&items), vec!["ToDeg", "TouchX", "Time"]);
        assert!(
            !items.iter().any(|item| item.completion == "TopSecret"),
            "private expression of another extension leaked"
        );
        let touch = &items[1];
        assert!(touch.has_visible_parameters);
        let time = &items[2];
        assert!(!time.has_visible_parameters);

        let lowercase = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "number", "t"),
        );
        assert!(lowercase.is_empty());
    }

    #[test]
    fn exact_description_yields_single_documentation_candidate() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "number", "ToDeg")
                .with_replacement(0, 5)
                .exact(),
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].completion, "ToDeg");
        assert!(items[0].is_exact);
        assert!(matches!(items[0].kind, AutocompletionKind::Expression { .. }));
        assert!(items[0].documentation().is_some());
    }

    #[test]
    fn object_expressions_include_behavior_expressions() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "number", "")
                .with_object("MySpriteObjectWithBehaviors"),
        );
        assert_eq!(
            completions(&items),
            vec!["X", "PointX", "PlatformerObject::JumpSpeed"]
        );
        let jump_speed = &items[2];
        assert!(!jump_speed.has_visible_parameters, "receivers must not count");
        assert!(items[1].has_visible_parameters);
        let AutocompletionKind::Expression { expression, .. } = &jump_speed.kind else {
            panic!("expected expression");
        };
        assert_eq!(
            expression.owner,
            ExpressionOwner::Behavior {
                behavior_type: "PlatformBehavior::PlatformerObjectBehavior".to_string()
            }
        );
    }

    #[test]
    fn unknown_object_yields_nothing() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "number", "")
                .with_object("Deleted"),
        );
        assert!(items.is_empty());
    }

    #[test]
    fn behavior_expressions_use_behavior_type() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "string", "Ju")
                .with_object("MySpriteObjectWithBehaviors")
                .with_behavior("PlatformerObject"),
        );
        assert_eq!(completions(&items), vec!["JumpSpeed"]);
        assert!(items[0].should_convert_to_string());

        let by_name = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "number", "")
                .with_behavior("PlatformerObject"),
        );
        assert_eq!(completions(&by_name), vec!["JumpSpeed"]);
    }

    #[test]
    fn objects_add_dot_unless_an_object_is_expected() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::Object, "number", "My")
                .with_completion("MySpriteObject"),
        );
        assert_eq!(items.len(), 1);
        assert!(items[0].add_dot);
        assert_eq!(
            items[0].kind,
            AutocompletionKind::Object {
                object_type: Some("Sprite".to_string())
            }
        );

        let object_parameter = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::Object, "objectList", "My")
                .with_completion("MySpriteObject"),
        );
        assert!(!object_parameter[0].add_dot);
    }

    #[test]
    fn behaviors_match_substrings() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::BehaviorWithPrefix, "number", "rag")
                .with_object("MySpriteObjectWithBehaviors"),
        );
        assert_eq!(completions(&items), vec!["Draggable"]);
        assert!(items[0].add_namespace_separator);
        assert_eq!(
            items[0].kind,
            AutocompletionKind::Behavior {
                behavior_type: Some("DraggableBehavior::Draggable".to_string())
            }
        );

        let all = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::BehaviorWithPrefix, "number", "")
                .with_object("MySpriteObjectWithBehaviors"),
        );
        assert_eq!(completions(&all), vec!["PlatformerObject", "Draggable"]);
    }

    #[test]
    fn layers_are_quoted_sorted_and_filtered() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::TextWithPrefix, "layer", "")
                .with_replacement(12, 12),
        );
        assert_eq!(
            completions(&items),
            vec!["\"\"", "\"Background\"", "\"Foreground\""]
        );
        assert!(items.iter().all(|item| item.add_parameter_separator));

        let filtered = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::TextWithPrefix, "layer", "BACK")
                .last_parameter(),
        );
        assert_eq!(completions(&filtered), vec!["\"Background\""]);
        assert!(!filtered[0].add_parameter_separator);

        let no_layout = build(
            &project,
            &EventsScope::default(),
            CompletionDescription::new(CompletionKind::TextWithPrefix, "layer", ""),
        );
        assert!(no_layout.is_empty());
    }

    #[test]
    fn scene_names_come_from_project() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::TextWithPrefix, "sceneName", "e"),
        );
        assert_eq!(completions(&items), vec!["\"Menu\"", "\"Scene\""]);
    }

    #[test]
    fn group_point_names_are_intersected() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::TextWithPrefix, "objectPointName", "")
                .with_object("Sprites"),
        );
        assert_eq!(completions(&items), vec!["\"Origin\""]);

        let single = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::TextWithPrefix, "objectPointName", "")
                .with_object("MySpriteObject"),
        );
        assert_eq!(completions(&single), vec!["\"Head\"", "\"Origin\""]);
    }

    #[test]
    fn groups_with_objects_lacking_data_yield_nothing() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let items = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::TextWithPrefix, "objectAnimationName", "")
                .with_object("Mixed"),
        );
        assert!(items.is_empty());

        let animations = build(
            &project,
            &scope,
            CompletionDescription::new(CompletionKind::TextWithPrefix, "objectAnimationName", "")
                .with_object("MySpriteObject"),
        );
        assert_eq!(completions(&animations), vec!["\"Jump\"", "\"Run\""]);
    }

    #[test]
    fn effect_names_and_parameters() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let mut description = CompletionDescription::new(
            CompletionKind::TextWithPrefix,
            "objectEffectParameterName",
            "",
        )
        .with_object("Sprites");
        description.effect_name = Some("Glow".to_string());
        assert_eq!(completions(&build(&project, &scope, description)), vec!["\"distance\""]);

        let mut layer_description = CompletionDescription::new(
            CompletionKind::TextWithPrefix,
            "layerEffectParameterName",
            "",
        );
        layer_description.layer_name = Some("Background".to_string());
        layer_description.effect_name = Some("Blur".to_string());
        assert_eq!(
            completions(&build(&project, &scope, layer_description.clone())),
            vec!["\"quality\"", "\"radius\""]
        );

        layer_description.value_type = "layerEffectName".to_string();
        assert_eq!(
            completions(&build(&project, &scope, layer_description)),
            vec!["\"Blur\""]
        );
    }

    #[test]
    fn selector_choices_come_from_parameter() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let mut description =
            CompletionDescription::new(CompletionKind::TextWithPrefix, "stringWithSelector", "");
        description.parameter_metadata = Some(
            ParameterMetadata::new("side", "stringWithSelector")
                .with_extra_info(r#"["Right", "Left"]"#),
        );
        assert_eq!(
            completions(&build(&project, &scope, description)),
            vec!["\"Left\"", "\"Right\""]
        );
    }

    #[test]
    fn function_parameters_respect_allowed_types() {
        let project = project();
        let scope = EventsScope {
            layout: None,
            extension: Some("MyExtension".to_string()),
            events_function: Some("DoSomething".to_string()),
        };
        let mut description =
            CompletionDescription::new(CompletionKind::TextWithPrefix, "functionParameterName", "");
        description.parameter_metadata = Some(
            ParameterMetadata::new("parameter", "functionParameterName").with_extra_info("number"),
        );
        assert_eq!(
            completions(&build(&project, &scope, description.clone())),
            vec!["\"Amount\""]
        );

        description.parameter_metadata = None;
        assert_eq!(
            completions(&build(&project, &scope, description)),
            vec!["\"Amount\"", "\"Label\""]
        );
    }

    #[test]
    fn literal_kinds_pass_through() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let mut variable = CompletionDescription::new(CompletionKind::Variable, "scenevar", "Sc")
            .with_completion("Score")
            .with_replacement(0, 2);
        variable.variable_type = VariableType::Structure;
        let property = CompletionDescription::new(CompletionKind::Property, "number", "")
            .with_completion("Speed");
        let empty = CompletionDescription::new(CompletionKind::Parameter, "number", "");

        let items = build_autocompletions(
            &AutocompletionContext::new(&project, &scope),
            &[variable, property, empty],
        );
        assert_eq!(completions(&items), vec!["Score", "Speed"]);
        assert_eq!(
            items[0].kind,
            AutocompletionKind::Variable {
                variable_type: VariableType::Structure
            }
        );
        assert_eq!(
            items[1].kind,
            AutocompletionKind::Property {
                property_type: String::new()
            }
        );
    }

    #[test]
    fn results_keep_description_order_without_dedup() {
        let project = project();
        let scope = EventsScope::for_layout("Scene");
        let text = CompletionDescription::new(CompletionKind::TextWithPrefix, "layer", "Fore");
        let expression =
            CompletionDescription::new(CompletionKind::ExpressionWithPrefix, "string", "ToS");
        let context = AutocompletionContext::new(&project, &scope);
        let items = build_autocompletions(&context, &[text.clone(), expression, text]);
        assert_eq!(
            completions(&items),
            vec!["\"Foreground\"", "ToString", "\"Foreground\""]
        );
        assert!(build_autocompletions(&context, &[]).is_empty());
    }

    #[test]
    fn string_filter_is_case_insensitive_substring() {
        let list = vec!["\"Background\"".to_string(), "\"UI\"".to_string()];
        assert_eq!(filter_string_list(list.clone(), "ground").len(), 1);
        assert_eq!(filter_string_list(list.clone(), "ui").len(), 1);
        assert_eq!(filter_string_list(list, "").len(), 2);
    }
}
