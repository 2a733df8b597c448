use std::collections::HashSet;

use uuid::Uuid;

use crate::events::EventKind;

/// At-most-once gate for events that several signals may trigger.
///
/// `mark_emitted` must only be called after the push succeeded.
pub trait DedupGuard {
    fn should_emit(&self, token_key: &str) -> bool;
    fn mark_emitted(&mut self, token_key: &str);
}

pub fn token_key(prefix: &str, kind: EventKind) -> String {
    format!("{prefix}{kind}")
}

/// Tokens held for the lifetime of one navigation.
///
/// Re-renders within the page share the tokens; [`NavigationTokens::begin_navigation`]
/// starts a fresh scope.
#[derive(Debug, Clone)]
pub struct NavigationTokens {
    navigation_id: Uuid,
    emitted: HashSet<String>,
}

impl NavigationTokens {
    pub fn new() -> Self {
        Self {
            navigation_id: Uuid::new_v4(),
            emitted: HashSet::new(),
        }
    }

    pub fn navigation_id(&self) -> Uuid {
        self.navigation_id
    }

    pub fn begin_navigation(&mut self) {
        self.navigation_id = Uuid::new_v4();
        self.emitted.clear();
    }
}

impl Default for NavigationTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupGuard for NavigationTokens {
    fn should_emit(&self, token_key: &str) -> bool {
        !self.emitted.contains(token_key)
    }

    fn mark_emitted(&mut self, token_key: &str) {
        self.emitted.insert(token_key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marked_token_blocks_until_next_navigation() {
        let mut guard = NavigationTokens::new();
        let key = token_key("cartbeacon_", EventKind::BeginCheckout);
        assert_eq!(key, "cartbeacon_begin_checkout");

        assert!(guard.should_emit(&key));
        guard.mark_emitted(&key);
        assert!(!guard.should_emit(&key));

        let before = guard.navigation_id();
        guard.begin_navigation();
        assert_ne!(before, guard.navigation_id());
        assert!(guard.should_emit(&key));
    }

    #[test]
    fn tokens_are_independent() {
        let mut guard = NavigationTokens::new();
        guard.mark_emitted("a");
        assert!(guard.should_emit("b"));
    }
}
