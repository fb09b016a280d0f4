use chat_cache::{Cache, CacheResult, CacheStore};
use std::sync::Arc;
use tracing::debug;

use crate::models::chat::{Conversation, Message};

/// Persists conversations in the cache and keeps each history bounded.
///
/// There is no locking here: two turns on the same id can both load, both
/// append and both save, and the later save wins.
#[derive(Clone)]
pub struct ConversationRepository {
    cache: Arc<Cache>,
    max_history: usize,
}

impl ConversationRepository {
    /// `max_history` must be positive; settings validation rejects zero.
    pub fn new(cache: Arc<Cache>, max_history: usize) -> Self {
        Self {
            cache,
            max_history: max_history.max(1),
        }
    }

    pub async fn load(&self, id: &str) -> CacheResult<Option<Conversation>> {
        self.cache.try_get::<Conversation>(id).await
    }

    /// Written with the store's default TTL.
    pub async fn save(&self, conversation: &Conversation) -> CacheResult<()> {
        self.cache
            .set(conversation.id(), conversation.clone(), None)
            .await
    }

    pub async fn remove(&self, id: &str) -> CacheResult<()> {
        self.cache.remove(id).await
    }

    /// Replace whatever is stored under `id` with a conversation holding
    /// only `greeting`.
    pub async fn start(&self, id: &str, greeting: String) -> CacheResult<Conversation> {
        let mut conversation = Conversation::new(id);
        self.append_and_bound(&mut conversation, Message::assistant(greeting));

        self.cache.remove(id).await?;
        self.save(&conversation).await?;

        debug!("Started conversation {}", id);
        Ok(conversation)
    }

    /// Append `message`, dropping the oldest messages beyond the bound.
    pub fn append_and_bound(&self, conversation: &mut Conversation, message: Message) {
        let messages = conversation.messages_mut();
        messages.push(message);

        if messages.len() > self.max_history {
            let excess = messages.len() - self.max_history;
            messages.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;
    use chat_cache::LocalCache;

    fn repository(max_history: usize) -> ConversationRepository {
        let cache = Arc::new(Cache::Local(LocalCache::new(None)));
        ConversationRepository::new(cache, max_history)
    }

    #[test]
    fn test_bound_drops_oldest_regardless_of_role() {
        let repo = repository(3);
        let mut conversation = Conversation::new("c-1");

        repo.append_and_bound(&mut conversation, Message::user("a"));
        repo.append_and_bound(&mut conversation, Message::assistant("b"));
        repo.append_and_bound(&mut conversation, Message::user("c"));
        repo.append_and_bound(&mut conversation, Message::assistant("d"));

        assert_eq!(
            conversation.messages(),
            &[
                Message::assistant("b"),
                Message::user("c"),
                Message::assistant("d"),
            ]
        );
    }

    #[test]
    fn test_bound_keeps_most_recent_in_order() {
        for max_history in 1..6 {
            let repo = repository(max_history);
            let mut conversation = Conversation::new("c-1");

            for i in 0..17 {
                repo.append_and_bound(&mut conversation, Message::user(i.to_string()));
                assert!(conversation.messages().len() <= max_history);
            }

            let expected: Vec<String> = (17 - max_history..17).map(|i| i.to_string()).collect();
            let actual: Vec<&str> = conversation.messages().iter().map(|m| m.content()).collect();
            assert_eq!(actual, expected);
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let repo = repository(20);
        assert!(repo.load("c-1").await.unwrap().is_none());

        let mut conversation = Conversation::new("c-1");
        repo.append_and_bound(&mut conversation, Message::user("hello"));
        repo.save(&conversation).await.unwrap();

        assert_eq!(repo.load("c-1").await.unwrap(), Some(conversation));

        repo.remove("c-1").await.unwrap();
        assert!(repo.load("c-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_start_twice_keeps_only_fresh_greeting() {
        let repo = repository(20);

        repo.start("c-1", "Hi!".to_string()).await.unwrap();
        let mut conversation = repo.load("c-1").await.unwrap().unwrap();
        repo.append_and_bound(&mut conversation, Message::user("hello"));
        repo.save(&conversation).await.unwrap();

        repo.start("c-1", "Welcome back!".to_string()).await.unwrap();

        let stored = repo.load("c-1").await.unwrap().unwrap();
        assert_eq!(stored.messages().len(), 1);
        assert_eq!(stored.messages()[0].role(), Role::Assistant);
        assert_eq!(stored.messages()[0].content(), "Welcome back!");
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected_by_store() {
        let repo = repository(20);
        assert!(repo.load("  ").await.is_err());
    }
}
