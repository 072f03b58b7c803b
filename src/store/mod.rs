//! Concurrency-safe in-memory entity store
//!
//! One [`Store`] holds one entity kind. Every operation runs under a single
//! per-store mutex for the duration of its critical section only, so the
//! operations are linearizable and list/random observe a consistent snapshot.

pub mod id;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use tracing::debug;

use crate::model::Entity;
pub use id::IdGenerator;

/// In-memory `id -> entity` table for one entity kind
pub struct Store<T> {
    data: Mutex<HashMap<String, T>>,
    ids: Arc<IdGenerator>,
}

impl<T: Entity> Store<T> {
    /// Create a new empty store with its own counter generator
    pub fn new() -> Self {
        Self::with_generator(Arc::new(IdGenerator::default()))
    }

    /// Create a new empty store drawing ids from `ids`
    pub fn with_generator(ids: Arc<IdGenerator>) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            ids,
        }
    }

    // A panic while the guard is held cannot leave a half-written entry
    // behind: HashMap::insert either completes or never touches the table.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, T>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Assign a fresh id to `entity`, store it and return the id
    pub fn insert(&self, entity: T) -> String {
        self.insert_with(entity, |_| ()).0
    }

    /// Insert like [`Store::insert`], also returning `f` applied to the
    /// stored entity inside the same critical section
    pub fn insert_with<R, F>(&self, mut entity: T, f: F) -> (String, R)
    where
        F: FnOnce(&T) -> R,
    {
        let mut data = self.lock();
        let id = self.ids.next_id();
        entity.assign_id(id.clone());
        let out = f(&entity);
        data.insert(id.clone(), entity);
        let len = data.len();
        drop(data);

        debug!(collection = T::COLLECTION, %id, len, "entity inserted");
        (id, out)
    }

    /// Get a copy of the entity stored under `id`
    pub fn get(&self, id: &str) -> Option<T> {
        self.lock().get(id).cloned()
    }

    /// Snapshot of every stored entity, in no particular order
    pub fn list_all(&self) -> Vec<T> {
        self.lock().values().cloned().collect()
    }

    /// Pick one stored id uniformly at random
    ///
    /// Returns `None` on an empty store and the only id when there is exactly
    /// one entry.
    pub fn random_id(&self) -> Option<String> {
        let data = self.lock();
        match data.len() {
            0 => None,
            1 => data.keys().next().cloned(),
            len => {
                let idx = rand::rng().random_range(0..len);
                data.keys().nth(idx).cloned()
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Entity> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Post, User};
    use std::collections::{HashMap, HashSet};

    fn user(name: &str) -> User {
        User {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "hunter2".to_string(),
            ..Default::default()
        }
    }

    fn post(caption: &str) -> Post {
        Post {
            caption: caption.to_string(),
            image_url: "https://img.example.com/1.png".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_get_list_single_user() {
        let store = Store::<User>::new();

        let id = store.insert(user("Ana"));
        assert_eq!(id, "1000");

        let fetched = store.get("1000").unwrap();
        assert_eq!(fetched.name, "Ana");
        assert_eq!(fetched.id, "1000");

        let all = store.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "1000");
    }

    #[test]
    fn test_insert_with_sees_assigned_id() {
        let store = Store::<User>::new();
        let (id, view) = store.insert_with(user("Ana"), Entity::view);
        assert_eq!(id, "1000");
        assert_eq!(view.id, id);
        assert_eq!(view.name, "Ana");
        assert_eq!(store.get(&id).unwrap().view(), view);
    }

    #[test]
    fn test_get_missing_id() {
        let store = Store::<User>::new();
        assert!(store.get("doesnotexist").is_none());

        store.insert(user("Ana"));
        assert!(store.get("doesnotexist").is_none());
    }

    #[test]
    fn test_empty_store() {
        let store = Store::<Post>::new();
        assert!(store.is_empty());
        assert!(store.random_id().is_none());
        assert!(store.get("1000").is_none());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn test_insert_overrides_client_id() {
        let store = Store::<Post>::new();
        let mut p = post("hello");
        p.id = "client-chosen".to_string();

        let id = store.insert(p);
        assert_ne!(id, "client-chosen");
        assert!(store.get("client-chosen").is_none());
        assert_eq!(store.get(&id).unwrap().id, id);
    }

    #[test]
    fn test_read_after_write() {
        let store = Store::<Post>::new();
        let mut ids = Vec::new();
        for i in 0..100 {
            ids.push((store.insert(post(&format!("caption {}", i))), i));
        }
        for (id, i) in ids {
            let p = store.get(&id).unwrap();
            assert_eq!(p.caption, format!("caption {}", i));
            assert_eq!(p.id, id);
        }
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let store = Store::<Post>::new();
        store.insert(post("first"));

        let mut snapshot = store.list_all();
        store.insert(post("second"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].caption, "first");

        // mutating the copy must not leak back into the store
        snapshot[0].caption = "changed".to_string();
        let stored = store.get(&snapshot[0].id).unwrap();
        assert_eq!(stored.caption, "first");
        assert_eq!(store.list_all().len(), 2);
    }

    #[test]
    fn test_singleton_random_is_deterministic() {
        let store = Store::<User>::new();
        let id = store.insert(user("Ana"));
        for _ in 0..100 {
            assert_eq!(store.random_id().as_deref(), Some(id.as_str()));
        }
    }

    #[test]
    fn test_random_is_roughly_uniform() {
        let store = Store::<Post>::new();
        let k = 4;
        for i in 0..k {
            store.insert(post(&i.to_string()));
        }

        let draws = 40_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(store.random_id().unwrap()).or_insert(0) += 1;
        }

        assert_eq!(counts.len(), k);
        let expected = draws / k;
        for (id, count) in counts {
            let deviation = (count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.1, "id {} drawn {} times, expected ~{}", id, count, expected);
        }
    }

    #[test]
    fn test_random_tracks_new_inserts() {
        let store = Store::<Post>::new();
        let first = store.insert(post("a"));
        assert_eq!(store.random_id().unwrap(), first);

        let second = store.insert(post("b"));
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            seen.insert(store.random_id().unwrap());
        }
        assert_eq!(seen, HashSet::from([first, second]));
    }

    #[test]
    fn test_concurrent_inserts_get_distinct_ids() {
        let store = Store::<Post>::new();
        let threads = 8;
        let per_thread = 500;

        let ids: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let store = &store;
                    s.spawn(move || {
                        (0..per_thread)
                            .map(|i| store.insert(post(&format!("{}-{}", t, i))))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), threads * per_thread);
        assert_eq!(store.len(), threads * per_thread);

        let listed: HashSet<String> = store.list_all().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, ids.into_iter().collect::<HashSet<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_two_posts_inserted_concurrently() {
        let store = Arc::new(Store::<Post>::new());

        let a = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.insert(post("a")) }
        });
        let b = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.insert(post("b")) }
        });

        let (id_a, id_b) = (a.await.unwrap(), b.await.unwrap());
        assert_ne!(id_a, id_b);
        assert_eq!(store.list_all().len(), 2);
    }

    #[test]
    fn test_shared_generator_across_stores() {
        let ids = Arc::new(IdGenerator::timestamp());
        let users = Store::<User>::with_generator(Arc::clone(&ids));
        let posts = Store::<Post>::with_generator(ids);

        let u = users.insert(user("Ana"));
        let p = posts.insert(post("hello"));
        assert_ne!(u, p);
        assert!(users.get(&p).is_none());
        assert!(posts.get(&u).is_none());
    }
}
