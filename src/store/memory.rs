use super::{EmailAddress, FavoritePlayer, FavoriteTeam, StoreError, Subscriber, SubscriberStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store for development runs and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Subscriber>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify<F>(&self, email: &EmailAddress, f: F) -> Result<Subscriber, StoreError>
    where
        F: FnOnce(&mut Subscriber),
    {
        let mut map = self.inner.write().await;
        let subscriber = map
            .get_mut(email.as_str())
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;
        f(subscriber);
        subscriber.updated_at = Utc::now();
        Ok(subscriber.clone())
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn get(&self, email: &EmailAddress) -> Result<Option<Subscriber>, StoreError> {
        Ok(self.inner.read().await.get(email.as_str()).cloned())
    }

    async fn put(&self, subscriber: Subscriber) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        match map.entry(subscriber.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(subscriber.email)),
            Entry::Vacant(slot) => {
                slot.insert(subscriber);
                Ok(())
            }
        }
    }

    async fn update_teams(
        &self,
        email: &EmailAddress,
        teams: Vec<FavoriteTeam>,
    ) -> Result<Subscriber, StoreError> {
        self.modify(email, |s| s.teams = teams).await
    }

    async fn update_players(
        &self,
        email: &EmailAddress,
        players: Vec<FavoritePlayer>,
    ) -> Result<Subscriber, StoreError> {
        self.modify(email, |s| s.players = players).await
    }

    async fn delete(&self, email: &EmailAddress) -> Result<(), StoreError> {
        match self.inner.write().await.remove(email.as_str()) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(email.to_string())),
        }
    }

    async fn scan(&self) -> Result<Vec<Subscriber>, StoreError> {
        let mut all: Vec<Subscriber> = self.inner.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::parse(raw).unwrap()
    }

    fn gsw() -> FavoriteTeam {
        FavoriteTeam {
            id: 1610612744,
            abbreviation: "GSW".into(),
            full_name: "Golden State Warriors".into(),
        }
    }

    #[tokio::test]
    async fn put_then_get_and_duplicate_put_conflicts() {
        let store = MemoryStore::new();
        let fan = email("fan@example.com");
        store.put(Subscriber::new(&fan, None)).await.unwrap();

        let loaded = store.get(&fan).await.unwrap().unwrap();
        assert_eq!(loaded.email, "fan@example.com");
        assert!(loaded.teams.is_empty());

        let again = store.put(Subscriber::new(&fan, None)).await;
        assert!(matches!(again, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn updates_bump_updated_at_only() {
        let store = MemoryStore::new();
        let fan = email("fan@example.com");
        let original = Subscriber::new(&fan, None);
        store.put(original.clone()).await.unwrap();

        let updated = store.update_teams(&fan, vec![gsw()]).await.unwrap();
        assert_eq!(updated.teams, vec![gsw()]);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);

        let updated = store
            .update_players(&fan, vec![FavoritePlayer { id: 201939, name: "Stephen Curry".into() }])
            .await
            .unwrap();
        assert_eq!(updated.teams, vec![gsw()]);
        assert_eq!(updated.players.len(), 1);
    }

    #[tokio::test]
    async fn missing_subscribers_are_not_found() {
        let store = MemoryStore::new();
        let ghost = email("ghost@example.com");
        assert!(store.get(&ghost).await.unwrap().is_none());
        assert!(matches!(store.update_teams(&ghost, vec![]).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(&ghost).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn scan_returns_everyone_and_delete_removes() {
        let store = MemoryStore::new();
        for raw in ["a@example.com", "b@example.com", "c@example.com"] {
            store.put(Subscriber::new(&email(raw), None)).await.unwrap();
        }
        store.delete(&email("b@example.com")).await.unwrap();
        let emails: Vec<_> = store.scan().await.unwrap().into_iter().map(|s| s.email).collect();
        assert_eq!(emails.len(), 2);
        assert!(emails.contains(&"a@example.com".to_string()));
        assert!(emails.contains(&"c@example.com".to_string()));
    }
}
