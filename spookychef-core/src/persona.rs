//! Horror-chef personas and per-session persona binding.
//!
//! A session (`chat_id`) is bound to one persona on first lookup and keeps it
//! for as long as the binding lives in the store. The in-memory store is a
//! bounded cache with an idle timeout, so an unbounded number of distinct
//! session ids cannot grow memory without limit.

use moka::sync::Cache;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;

use crate::error::CatalogError;

/// Default number of live session bindings.
pub const DEFAULT_SESSION_CAPACITY: u64 = 10_000;

/// Default idle time before a session binding is evicted.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

static EMBEDDED_PERSONAS: LazyLock<Arc<PersonaPool>> = LazyLock::new(|| {
    let json = include_str!("../../data/personas_pool.json");
    Arc::new(PersonaPool::from_json_str(json).expect("Failed to parse personas_pool.json"))
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersonaError {
    #[error("Persona pool is empty")]
    EmptyPool,

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub display_name: String,
    pub voice: String,
    pub guardrails: String,
    pub quote_policy: String,
    pub origin: String,
    pub movie_imdb_url: String,
    pub image_url: String,
}

impl Persona {
    /// Silent personas produce steps only, never a persona line.
    pub fn is_silent(&self) -> bool {
        self.voice.to_lowercase().contains("silent")
            || self.guardrails.to_lowercase().contains("silent")
    }
}

/// Static pool of personas, loaded once.
#[derive(Debug, Clone, Default)]
pub struct PersonaPool {
    personas: Vec<Arc<Persona>>,
}

impl PersonaPool {
    pub fn new(personas: Vec<Persona>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for persona in &personas {
            if !seen.insert(persona.id.as_str()) {
                return Err(CatalogError::DuplicatePersona(persona.id.clone()));
            }
        }
        Ok(Self {
            personas: personas.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let personas: Vec<Persona> = serde_json::from_str(json)
            .map_err(|e| CatalogError::invalid_json("personas", e))?;
        Self::new(personas)
    }

    /// The pool compiled into the binary.
    pub fn embedded() -> Arc<PersonaPool> {
        EMBEDDED_PERSONAS.clone()
    }

    /// Pick a persona uniformly at random.
    pub fn choose_random(&self) -> Option<Arc<Persona>> {
        self.personas.choose(&mut rand::rng()).cloned()
    }

    pub fn get(&self, id: &str) -> Result<Arc<Persona>, PersonaError> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| PersonaError::UnknownPersona(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Persona>> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

/// Session to persona binding.
///
/// Implementations must make `get_or_assign` behave as compute-if-absent: two
/// concurrent first calls for the same `chat_id` return the same persona.
/// A multi-instance deployment can back this with a shared key-value store.
pub trait PersonaStore: Send + Sync + fmt::Debug {
    /// The persona already bound to `chat_id`, if any.
    fn get(&self, chat_id: &str) -> Option<Arc<Persona>>;

    /// The bound persona, or a fresh random pick from `pool` recorded for later calls.
    fn get_or_assign(&self, chat_id: &str, pool: &PersonaPool)
        -> Result<Arc<Persona>, PersonaError>;

    /// Approximate number of live bindings.
    fn session_count(&self) -> u64;
}

/// Bounded, idle-evicting in-process persona store.
#[derive(Clone)]
pub struct InMemoryPersonaStore {
    sessions: Cache<String, Arc<Persona>>,
}

impl InMemoryPersonaStore {
    pub fn new(capacity: u64, time_to_idle: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(time_to_idle)
                .build(),
        }
    }

    /// Flush pending evictions so `session_count` is exact.
    pub fn run_pending_tasks(&self) {
        self.sessions.run_pending_tasks();
    }
}

impl Default for InMemoryPersonaStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_TTL)
    }
}

impl fmt::Debug for InMemoryPersonaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryPersonaStore")
            .field("sessions", &self.sessions.entry_count())
            .finish()
    }
}

impl PersonaStore for InMemoryPersonaStore {
    fn get(&self, chat_id: &str) -> Option<Arc<Persona>> {
        self.sessions.get(chat_id)
    }

    fn get_or_assign(
        &self,
        chat_id: &str,
        pool: &PersonaPool,
    ) -> Result<Arc<Persona>, PersonaError> {
        self.sessions
            .try_get_with(chat_id.to_string(), || -> Result<Arc<Persona>, PersonaError> {
                let persona = pool.choose_random().ok_or(PersonaError::EmptyPool)?;
                tracing::debug!(chat_id, persona_id = %persona.id, "Assigned persona to session");
                Ok(persona)
            })
            .map_err(|e| (*e).clone())
    }

    fn session_count(&self) -> u64 {
        self.sessions.entry_count()
    }
}
