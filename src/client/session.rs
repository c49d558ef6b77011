// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted session state: tokens, the signed-in user and preferences.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::error::ApiError;
use crate::config::Config;
use crate::models::{AuthResponse, User};

/// Storage keys.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "accessToken";
    pub const REFRESH_TOKEN: &str = "refreshToken";
    pub const USER: &str = "currentUser";
    pub const THEME: &str = "appTheme";
}

/// Theme used when none has been saved.
pub const DEFAULT_THEME: &str = "default";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::named("STORAGE_ERROR", err.to_string())
    }
}

/// String key/value persistence.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Process-local store; lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON object in a file, rewritten on every change.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Session store opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Typed view over a [`SessionStore`]. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// File-backed when `SESSION_FILE` is configured, in-memory otherwise.
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        match &config.session_file {
            Some(path) => Ok(Self::new(Arc::new(FileStore::open(path)?))),
            None => Ok(Self::in_memory()),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(keys::ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(keys::REFRESH_TOKEN)
    }

    pub fn save_access_token(&self, token: &str) -> Result<(), SessionError> {
        self.store.set(keys::ACCESS_TOKEN, token)
    }

    pub fn save_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), SessionError> {
        self.store.set(keys::ACCESS_TOKEN, access_token)?;
        self.store.set(keys::REFRESH_TOKEN, refresh_token)
    }

    /// Current user; an unreadable record is dropped from storage.
    pub fn user(&self) -> Option<User> {
        let raw = self.store.get(keys::USER)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse stored user, clearing it");
                self.clear_user();
                None
            }
        }
    }

    pub fn save_user(&self, user: &User) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user)?;
        self.store.set(keys::USER, &raw)
    }

    /// Persist everything a login or registration returns.
    pub fn save_auth(&self, auth: &AuthResponse) -> Result<(), SessionError> {
        self.save_tokens(&auth.access_token, &auth.refresh_token)?;
        self.save_user(&auth.user)
    }

    pub fn theme(&self) -> String {
        self.store
            .get(keys::THEME)
            .unwrap_or_else(|| DEFAULT_THEME.to_string())
    }

    pub fn save_theme(&self, theme: &str) -> Result<(), SessionError> {
        self.store.set(keys::THEME, theme)
    }

    pub fn has_valid_session(&self) -> bool {
        self.access_token().is_some() && self.user().is_some()
    }

    pub fn clear_tokens(&self) {
        self.remove_logged(keys::ACCESS_TOKEN);
        self.remove_logged(keys::REFRESH_TOKEN);
    }

    pub fn clear_user(&self) {
        self.remove_logged(keys::USER);
    }

    /// Drop credentials and user; preferences survive.
    pub fn clear_all(&self) {
        self.clear_tokens();
        self.clear_user();
    }

    fn remove_logged(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, error = %e, "Failed to clear session key");
        }
    }
}
