pub mod autocompletion;
pub mod expression;
pub mod metadata;
pub mod project;
pub mod scene_layer;

pub use autocompletion::{
    Autocompletion, AutocompletionKind, AutocompletionServer, build_autocompletions,
    insert_autocompletion,
};
pub use expression::{
    AutocompletionError, CompletionDescription, CompletionDescriptionSource, CompletionKind,
    ExpressionAndCaret,
};
pub use project::ProjectMetadata;
