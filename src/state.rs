use crate::config::Config;
use crate::models::AppData;
use crate::remote::{self, Selected};
use crate::support::{self, Conversation, ReplyBackend};
use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::debug;

pub type SharedConversation = Arc<Mutex<Conversation>>;

struct ChatSlot {
    conversation: SharedConversation,
    touched: Instant,
}

impl ChatSlot {
    fn expired(&self, idle_ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.touched) >= idle_ttl
    }
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub support: Arc<dyn ReplyBackend>,
    conversations: Arc<Mutex<BTreeMap<u64, ChatSlot>>>,
    next_conversation: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: Config, data: AppData) -> Self {
        let http = reqwest::Client::new();
        let support: Arc<dyn ReplyBackend> =
            Arc::from(support::backend_from_settings(&config.support, &http));
        Self {
            data_path: config.data_path.clone(),
            data: Arc::new(Mutex::new(data)),
            config: Arc::new(config),
            http,
            support,
            conversations: Arc::new(Mutex::new(BTreeMap::new())),
            next_conversation: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Classifier for one request; `api_key` is the caller's own credential.
    pub fn classifier(&self, api_key: Option<String>) -> Selected {
        let settings = self.config.classifier.with_api_key(api_key);
        remote::build_classifier(&settings, &self.http)
    }

    /// Registers a conversation, first dropping idle ones and, at the cap,
    /// the least recently used.
    pub async fn open_conversation(&self, conversation: Conversation) -> (u64, SharedConversation) {
        let id = self.next_conversation.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(Mutex::new(conversation));

        let mut conversations = self.conversations.lock().await;
        let evicted = evict(
            &mut conversations,
            self.config.support.max_conversations,
            self.config.support.idle_ttl,
            Instant::now(),
        );
        if evicted > 0 {
            debug!(evicted, "dropped stale conversations");
        }
        conversations.insert(
            id,
            ChatSlot {
                conversation: Arc::clone(&shared),
                touched: Instant::now(),
            },
        );
        (id, shared)
    }

    /// Looks up a live conversation and marks it as used.
    pub async fn conversation(&self, id: u64) -> Option<SharedConversation> {
        let now = Instant::now();
        let mut conversations = self.conversations.lock().await;
        if conversations
            .get(&id)
            .is_some_and(|slot| slot.expired(self.config.support.idle_ttl, now))
        {
            conversations.remove(&id);
            return None;
        }
        let slot = conversations.get_mut(&id)?;
        slot.touched = now;
        Some(Arc::clone(&slot.conversation))
    }

    /// Returns false when the id was unknown or already gone.
    pub async fn close_conversation(&self, id: u64) -> bool {
        self.conversations.lock().await.remove(&id).is_some()
    }

    pub async fn open_conversations(&self) -> usize {
        self.conversations.lock().await.len()
    }
}

fn evict(slots: &mut BTreeMap<u64, ChatSlot>, max: usize, idle_ttl: Duration, now: Instant) -> usize {
    let before = slots.len();
    slots.retain(|_, slot| !slot.expired(idle_ttl, now));
    while !slots.is_empty() && slots.len() >= max {
        let Some(oldest) = slots
            .iter()
            .min_by_key(|(_, slot)| slot.touched)
            .map(|(id, _)| *id)
        else {
            break;
        };
        slots.remove(&oldest);
    }
    before - slots.len()
}
