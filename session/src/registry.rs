use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;
use log::{debug, info};
use parking_lot::Mutex;

use crate::config::RegistryConfig;
use crate::game::{GameId, GameSession};

struct Entry {
    session: Arc<GameSession>,
    last_used: Instant,
}

/// Live sessions by game id.
///
/// The map lock is only held for the map operation itself. Gameplay is
/// serialised by each session's own lock, so a long engine search in one game
/// never blocks lookups for another.
pub struct Registry {
    entries: Mutex<AHashMap<GameId, Entry>>,
    config: RegistryConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            entries: Mutex::new(AHashMap::new()),
            config,
        }
    }

    /// Starts a fresh session under `id`, replacing any previous one.
    pub fn create(&self, id: GameId, owner: Option<String>) -> Arc<GameSession> {
        let session = Arc::new(GameSession::new(id, owner));
        self.put(id, Arc::clone(&session));
        session
    }

    /// Looks a session up and marks it as recently used.
    pub fn get(&self, id: GameId) -> Option<Arc<GameSession>> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(&id)?;
        entry.last_used = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    pub fn put(&self, id: GameId, session: Arc<GameSession>) {
        let mut entries = self.entries.lock();

        Self::evict_idle_locked(&mut entries, &self.config);

        let capacity = self.config.capacity.max(1);
        while !entries.contains_key(&id) && entries.len() >= capacity {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| *key)
            else {
                break;
            };
            entries.remove(&oldest);
            info!("Evicted least recently used game {}", oldest);
        }

        entries.insert(
            id,
            Entry {
                session,
                last_used: Instant::now(),
            },
        );
        debug!("Registered game {} ({} live)", id, entries.len());
    }

    pub fn remove(&self, id: GameId) -> Option<Arc<GameSession>> {
        let removed = self.entries.lock().remove(&id).map(|entry| entry.session);
        if removed.is_some() {
            debug!("Removed game {}", id);
        }
        removed
    }

    /// Drops sessions idle for longer than the configured timeout. Returns how
    /// many were dropped.
    pub fn evict_idle(&self) -> usize {
        let mut entries = self.entries.lock();
        Self::evict_idle_locked(&mut entries, &self.config)
    }

    fn evict_idle_locked(entries: &mut AHashMap<GameId, Entry>, config: &RegistryConfig) -> usize {
        let before = entries.len();
        entries.retain(|id, entry| {
            let keep = entry.last_used.elapsed() < config.idle_timeout;
            if !keep {
                info!("Evicted idle game {}", id);
            }
            keep
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
