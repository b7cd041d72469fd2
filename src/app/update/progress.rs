use super::super::state::App;
use super::Effect;
use std::time::Instant;
use tracing::debug;

impl App {
    /// Clock tick from the shell loop. Releases a debounced progress write
    /// once its quiet period has passed.
    pub(super) fn handle_tick(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        if let Some(write) = self.persister.poll(now) {
            debug!(path = %write.path, page = write.page, "Flushing debounced progress");
            effects.push(Effect::SaveProgress {
                path: write.path,
                page: write.page,
                direction: write.direction,
            });
        }
    }
}
