//! In-process analytics recorder.
//!
//! Lifecycle and screen events accumulate in memory and mirror to the debug
//! log. There is no remote sink; callers that need the stream read it back
//! with [`Analytics::events`].

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AnalyticsEvent {
    pub name: String,
    pub params: Value,
    pub recorded_at: DateTime<Utc>,
}

struct Inner {
    enabled: bool,
    user_id: Option<String>,
    session_id: String,
    events: Vec<AnalyticsEvent>,
}

/// Shared analytics service. Constructed once at startup and injected into
/// the consumers that record events; interior mutability keeps the handle
/// cloneable behind an `Arc`.
pub struct Analytics {
    inner: Mutex<Inner>,
}

impl Analytics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                enabled: true,
                user_id: None,
                session_id: Uuid::new_v4().to_string(),
                events: Vec::new(),
            }),
        }
    }

    /// Enable or disable recording. Disabled tracking drops events silently.
    pub fn set_enabled(&self, enabled: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.enabled = enabled;
        }
    }

    pub fn set_user_id(&self, user_id: Option<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.user_id = user_id;
        }
    }

    /// Rotate the session id. Returns the new id.
    pub fn start_new_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        if let Ok(mut inner) = self.inner.lock() {
            inner.session_id = id.clone();
        }
        id
    }

    pub fn session_id(&self) -> String {
        self.inner
            .lock()
            .map(|inner| inner.session_id.clone())
            .unwrap_or_default()
    }

    /// Record a named event. `params` should be a JSON object; the session id
    /// and user id (when set) are merged in before recording.
    pub fn track_event(&self, name: &str, params: Value) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if !inner.enabled {
            log::trace!("analytics disabled, dropping event '{}'", name);
            return;
        }
        let mut params = params;
        if let Some(map) = params.as_object_mut() {
            map.insert("session_id".to_string(), Value::from(inner.session_id.clone()));
            if let Some(user_id) = &inner.user_id {
                map.insert("user_id".to_string(), Value::from(user_id.clone()));
            }
        }
        log::debug!("analytics event '{}': {}", name, params);
        inner.events.push(AnalyticsEvent {
            name: name.to_string(),
            params,
            recorded_at: Utc::now(),
        });
    }

    pub fn track_screen_view(&self, screen: &str) {
        self.track_event("screen_view", serde_json::json!({ "screen": screen }));
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.inner
            .lock()
            .map(|inner| inner.events.clone())
            .unwrap_or_default()
    }

    pub fn clear_events(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.events.clear();
        }
    }
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new()
    }
}
