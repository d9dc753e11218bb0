use crate::{
    expression::{AutocompletionError, CompletionDescriptionSource, ExpressionAndCaret},
    metadata::{EventsScope, MetadataProvider},
};
use dashmap::DashMap;
use log::debug;
use rapidhash::fast::RandomState;
use ropey::Rope;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};

pub mod builder;
pub mod candidate;
pub mod config;
pub mod insertion;
pub mod markdown;
pub mod position;
pub mod session;
pub mod tasks;

pub use builder::{AutocompletionContext, build_autocompletions};
pub use candidate::{Autocompletion, AutocompletionKind};
pub use config::AutocompletionConfig;
pub use insertion::insert_autocompletion;
pub use session::{AutocompletionKey, AutocompletionSession, KeyAction};

use position::clamp_offset;
use tasks::{FieldTaskState, ValidationToken};

#[derive(Debug)]
struct ExpressionField {
    document: Rope,
    caret: usize,
    expected_type: String,
    scope: EventsScope,
    session: AutocompletionSession,
    tasks: Arc<FieldTaskState>,
}

impl ExpressionField {
    fn expression_and_caret(&self) -> ExpressionAndCaret {
        ExpressionAndCaret::new(self.document.to_string(), self.caret)
    }

    fn replace(&mut self, edit: &ExpressionAndCaret) {
        self.document = Rope::from_str(&edit.expression);
        self.caret = clamp_offset(edit.caret_location, &self.document);
    }
}

/// Result of a key press on a field. `edit` holds the new text and caret when
/// a candidate was inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyOutcome {
    pub action: KeyAction,
    pub edit: Option<ExpressionAndCaret>,
}

/// What the host renders for a field.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub expression: String,
    pub caret_location: usize,
    pub autocompletions: Vec<Autocompletion>,
    pub selected_index: usize,
    pub remaining_count: usize,
}

/// Tracks the open expression fields and keeps their candidate lists in sync
/// with the text, debouncing validations so only the latest edit is served.
pub struct AutocompletionServer<S, M> {
    source: S,
    metadata: M,
    fields: DashMap<String, ExpressionField, RandomState>,
    config: RwLock<AutocompletionConfig>,
}

impl<S, M> AutocompletionServer<S, M>
where
    S: CompletionDescriptionSource,
    M: MetadataProvider,
{
    pub fn new(source: S, metadata: M) -> Self {
        Self::with_config(source, metadata, AutocompletionConfig::default())
    }

    pub fn with_config(source: S, metadata: M, config: AutocompletionConfig) -> Self {
        Self {
            source,
            metadata,
            fields: DashMap::with_hasher(RandomState::new()),
            config: RwLock::new(config),
        }
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    pub fn config(&self) -> AutocompletionConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn apply_settings(&self, value: Value) {
        let visible_limit = {
            let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
            config.apply_settings(value);
            config.visible_limit()
        };
        for mut field in self.fields.iter_mut() {
            field.session.set_visible_limit(visible_limit);
        }
    }

    pub fn open_field(&self, field_id: &str, expected_type: &str, scope: EventsScope) {
        debug!("field {field_id} opened for {expected_type}");
        let field = ExpressionField {
            document: Rope::new(),
            caret: 0,
            expected_type: expected_type.to_string(),
            scope,
            session: AutocompletionSession::new(self.config().visible_limit()),
            tasks: Arc::new(FieldTaskState::default()),
        };
        if let Some(previous) = self.fields.insert(field_id.to_string(), field) {
            previous.tasks.cancel();
        }
    }

    pub fn close_field(&self, field_id: &str) {
        if let Some((_, field)) = self.fields.remove(field_id) {
            field.tasks.cancel();
            debug!("field {field_id} closed");
        }
    }

    /// Store the new text and caret, then revalidate once the debounce delay
    /// has passed. Returns `false` when a newer change superseded this one.
    pub async fn did_change(
        &self,
        field_id: &str,
        text: &str,
        caret: usize,
    ) -> Result<bool, AutocompletionError> {
        let token = {
            let mut field = self.field_mut(field_id)?;
            let token = field.tasks.token();
            field.document = Rope::from_str(text);
            field.caret = clamp_offset(caret, &field.document);
            token
        };
        self.validate(field_id, token).await
    }

    /// Revalidate the current text, typically after the caret moved.
    pub async fn refresh(&self, field_id: &str, caret: usize) -> Result<bool, AutocompletionError> {
        let token = {
            let mut field = self.field_mut(field_id)?;
            let token = field.tasks.token();
            field.caret = clamp_offset(caret, &field.document);
            token
        };
        self.validate(field_id, token).await
    }

    async fn validate(
        &self,
        field_id: &str,
        token: ValidationToken,
    ) -> Result<bool, AutocompletionError> {
        let delay = self.config().debounce();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if token.ensure_active().is_err() {
            debug!("field {field_id}: debounced validation superseded");
            return Ok(false);
        }

        let (expression, expected_type, scope) = {
            let field = self.field(field_id)?;
            (
                field.expression_and_caret(),
                field.expected_type.clone(),
                field.scope.clone(),
            )
        };
        let descriptions = self.source.completion_descriptions(
            &expression.expression,
            &expected_type,
            expression.caret_location,
        );
        if let Err(cancelled) = token.yield_and_check().await {
            debug!("field {field_id}: {cancelled}");
            return Ok(false);
        }

        let context = AutocompletionContext::new(&self.metadata, &scope);
        let autocompletions = build_autocompletions(&context, &descriptions);

        let mut field = self.field_mut(field_id)?;
        if let Err(cancelled) = token.ensure_active() {
            debug!("field {field_id}: {cancelled}");
            return Ok(false);
        }
        debug!(
            "field {field_id}: {} autocompletions at {}",
            autocompletions.len(),
            expression.caret_location
        );
        field.session.set_candidates(autocompletions);
        Ok(true)
    }

    /// Forward a key press to the field's session. Insertions are applied to
    /// the stored text right away.
    pub fn handle_key(
        &self,
        field_id: &str,
        key: AutocompletionKey,
    ) -> Result<KeyOutcome, AutocompletionError> {
        let mut field = self.field_mut(field_id)?;
        let action = field.session.handle_key(key);
        let edit = match &action {
            KeyAction::Insert(autocompletion) => Some(Self::apply(&mut field, autocompletion)),
            KeyAction::Cancelled => {
                field.tasks.cancel();
                None
            }
            _ => None,
        };
        Ok(KeyOutcome { action, edit })
    }

    /// Insert the candidate at a visible index, as when it is clicked.
    pub fn choose(
        &self,
        field_id: &str,
        index: usize,
    ) -> Result<Option<ExpressionAndCaret>, AutocompletionError> {
        let mut field = self.field_mut(field_id)?;
        let Some(autocompletion) = field.session.choose(index).cloned() else {
            return Ok(None);
        };
        Ok(Some(Self::apply(&mut field, &autocompletion)))
    }

    fn apply(field: &mut ExpressionField, autocompletion: &Autocompletion) -> ExpressionAndCaret {
        let edit = insert_autocompletion(field.expression_and_caret(), autocompletion);
        field.replace(&edit);
        field.tasks.cancel();
        field.session.clear();
        edit
    }

    /// Focus left the field: drop pending validations and hide the list.
    pub fn blur(&self, field_id: &str) -> Result<(), AutocompletionError> {
        let mut field = self.field_mut(field_id)?;
        field.tasks.cancel();
        field.session.clear();
        Ok(())
    }

    pub fn snapshot(&self, field_id: &str) -> Result<FieldSnapshot, AutocompletionError> {
        let field = self.field(field_id)?;
        Ok(FieldSnapshot {
            expression: field.document.to_string(),
            caret_location: field.caret,
            autocompletions: field.session.visible().to_vec(),
            selected_index: field.session.selected_index(),
            remaining_count: field.session.remaining_count(),
        })
    }

    fn field(
        &self,
        field_id: &str,
    ) -> Result<dashmap::mapref::one::Ref<'_, String, ExpressionField>, AutocompletionError> {
        self.fields
            .get(field_id)
            .ok_or_else(|| AutocompletionError::UnknownField(field_id.to_string()))
    }

    fn field_mut(
        &self,
        field_id: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, String, ExpressionField>, AutocompletionError>
    {
        self.fields
            .get_mut(field_id)
            .ok_or_else(|| AutocompletionError::UnknownField(field_id.to_string()))
    }
}
