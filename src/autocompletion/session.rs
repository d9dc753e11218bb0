use crate::autocompletion::candidate::Autocompletion;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const DEFAULT_VISIBLE_LIMIT: usize = 25;

/// Keys the autocompletion list reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutocompletionKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Tab,
    Other,
}

impl FromStr for AutocompletionKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "arrowup" | "up" => Ok(Self::ArrowUp),
            "arrowdown" | "down" => Ok(Self::ArrowDown),
            "arrowleft" | "left" => Ok(Self::ArrowLeft),
            "arrowright" | "right" => Ok(Self::ArrowRight),
            "escape" | "esc" => Ok(Self::Escape),
            "enter" | "return" => Ok(Self::Enter),
            "tab" => Ok(Self::Tab),
            "" => Err(format!("Invalid key: {value:?}")),
            _ => Ok(Self::Other),
        }
    }
}

impl fmt::Display for AutocompletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::Escape => "Escape",
            Self::Enter => "Enter",
            Self::Tab => "Tab",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

/// What the host must do after a key press.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyAction {
    /// The caret moved; descriptions must be recomputed.
    UpdateCompletions,
    /// The list was dismissed. The key must not reach outer handlers.
    Cancelled,
    /// The selection moved to this index.
    Moved(usize),
    /// Insert this candidate and prevent the key's default action.
    Insert(Autocompletion),
    /// Let the key through untouched.
    PassThrough,
}

impl KeyAction {
    pub fn prevent_default(&self) -> bool {
        matches!(self, Self::Insert(_) | Self::Moved(_))
    }

    pub fn stop_propagation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Candidate list and keyboard selection of one expression field.
///
/// The session is Idle when it holds no candidates and Showing otherwise.
#[derive(Clone, Debug)]
pub struct AutocompletionSession {
    candidates: Vec<Autocompletion>,
    selected_index: usize,
    visible_limit: usize,
}

impl Default for AutocompletionSession {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBLE_LIMIT)
    }
}

impl AutocompletionSession {
    pub fn new(visible_limit: usize) -> Self {
        Self {
            candidates: Vec::new(),
            selected_index: 0,
            visible_limit: visible_limit.max(1),
        }
    }

    pub fn is_showing(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Autocompletion] {
        &self.candidates
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn visible_limit(&self) -> usize {
        self.visible_limit
    }

    pub fn set_visible_limit(&mut self, visible_limit: usize) {
        self.visible_limit = visible_limit.max(1);
        if self.selected_index >= self.visible_count().max(1) {
            self.selected_index = 0;
        }
    }

    fn visible_count(&self) -> usize {
        self.candidates.len().min(self.visible_limit)
    }

    /// Candidates rendered in the list.
    pub fn visible(&self) -> &[Autocompletion] {
        &self.candidates[..self.visible_count()]
    }

    /// Candidates beyond the visible limit, shown as a "N more" hint.
    pub fn remaining_count(&self) -> usize {
        self.candidates.len() - self.visible_count()
    }

    pub fn selected(&self) -> Option<&Autocompletion> {
        self.visible().get(self.selected_index)
    }

    /// Replace the candidates. A list of another length resets the selection;
    /// one of the same length is treated as re-ranked and keeps it.
    pub fn set_candidates(&mut self, candidates: Vec<Autocompletion>) {
        if candidates.len() != self.candidates.len() {
            self.selected_index = 0;
        }
        self.candidates = candidates;
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.selected_index = 0;
    }

    /// Candidate picked with the pointer, if it can be inserted.
    pub fn choose(&self, index: usize) -> Option<&Autocompletion> {
        self.visible()
            .get(index)
            .filter(|autocompletion| !autocompletion.is_exact)
    }

    pub fn handle_key(&mut self, key: AutocompletionKey) -> KeyAction {
        let visible_count = self.visible_count();
        let action = match key {
            AutocompletionKey::ArrowLeft | AutocompletionKey::ArrowRight => {
                KeyAction::UpdateCompletions
            }
            AutocompletionKey::ArrowUp | AutocompletionKey::ArrowDown if visible_count == 0 => {
                KeyAction::UpdateCompletions
            }
            AutocompletionKey::ArrowDown => {
                self.selected_index = (self.selected_index + 1) % visible_count;
                KeyAction::Moved(self.selected_index)
            }
            AutocompletionKey::ArrowUp => {
                self.selected_index = (visible_count + self.selected_index - 1) % visible_count;
                KeyAction::Moved(self.selected_index)
            }
            AutocompletionKey::Escape if visible_count > 0 => {
                self.clear();
                KeyAction::Cancelled
            }
            AutocompletionKey::Enter | AutocompletionKey::Tab => match self.selected() {
                Some(autocompletion) if !autocompletion.is_exact => {
                    KeyAction::Insert(autocompletion.clone())
                }
                _ => KeyAction::PassThrough,
            },
            AutocompletionKey::Escape | AutocompletionKey::Other => KeyAction::PassThrough,
        };
        debug!("key {key} -> {action:?}");
        action
    }
}
