use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// Generation counter of one expression field. Every new validation and every
/// cancellation bumps it, which makes older tokens stale.
#[derive(Debug, Default)]
pub struct FieldTaskState {
    generation: Arc<TaskGeneration>,
}

impl FieldTaskState {
    pub fn token(&self) -> ValidationToken {
        ValidationToken::new(Arc::clone(&self.generation))
    }

    pub fn cancel(&self) {
        self.generation.cancel();
    }
}

#[derive(Debug, Default)]
struct TaskGeneration {
    generation: AtomicU64,
}

impl TaskGeneration {
    fn next_token(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_cancelled(&self, expected: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != expected
    }

    fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug)]
pub struct ValidationToken {
    state: Arc<TaskGeneration>,
    generation: u64,
}

impl ValidationToken {
    fn new(state: Arc<TaskGeneration>) -> Self {
        let generation = state.next_token();
        Self { state, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ensure_active(&self) -> Result<(), ValidationCancelled> {
        if self.is_cancelled() {
            Err(ValidationCancelled {
                generation: self.generation,
            })
        } else {
            Ok(())
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled(self.generation)
    }

    /// Give other tasks a chance to run, then check the token.
    pub async fn yield_and_check(&self) -> Result<(), ValidationCancelled> {
        tokio::task::yield_now().await;
        self.ensure_active()
    }
}

#[derive(Debug)]
pub struct ValidationCancelled {
    generation: u64,
}

impl fmt::Display for ValidationCancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation {} superseded", self.generation)
    }
}

impl std::error::Error for ValidationCancelled {}
