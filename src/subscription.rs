use crate::{Difficulty, GameError, SubscriptionError};
use std::collections::HashMap;

/// Per-player premium status, owned by whoever selects the difficulty.
pub trait SubscriptionStore {
    fn is_subscribed(&self, player_id: &str) -> Result<bool, SubscriptionError>;

    fn set_subscribed(&mut self, player_id: &str, subscribed: bool)
        -> Result<(), SubscriptionError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySubscriptions {
    players: HashMap<String, bool>,
}

impl MemorySubscriptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionStore for MemorySubscriptions {
    fn is_subscribed(&self, player_id: &str) -> Result<bool, SubscriptionError> {
        Ok(self.players.get(player_id).copied().unwrap_or(false))
    }

    fn set_subscribed(
        &mut self,
        player_id: &str,
        subscribed: bool,
    ) -> Result<(), SubscriptionError> {
        self.players.insert(player_id.to_string(), subscribed);
        Ok(())
    }
}

/// Gate applied before a session is built. A failing store counts as "not subscribed".
pub fn unlock_difficulty<S: SubscriptionStore + ?Sized>(
    store: &S,
    player_id: &str,
    difficulty: Difficulty,
) -> Result<Difficulty, GameError> {
    if !difficulty.is_premium() {
        return Ok(difficulty);
    }

    let subscribed = store.is_subscribed(player_id).unwrap_or_else(|err| {
        log::warn!("Subscription check for '{player_id}' failed: {err}");
        false
    });

    if subscribed {
        Ok(difficulty)
    } else {
        Err(GameError::PremiumLocked(difficulty))
    }
}
