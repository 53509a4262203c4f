//! Category/event pub-sub шина
//!
//! Ключ канала — пара строк (category, event): это де-факто wire format
//! между подсистемами (UI, звук, VFX, загрузка сцен). Шина — явный resource,
//! передаётся системам и listener'ам (никакого static hub).
//!
//! Publish синхронный и re-entrant: listener получает `&EventBus` и может
//! публиковать/подписываться/отписываться прямо во время доставки. Доставка
//! идёт по snapshot'у списка, lock на время вызовов отпущен.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;

use crate::logger::log_warning;

/// Опциональный payload события (type-erased)
pub type Payload = dyn Any + Send + Sync;

/// Подписчик. Идентичность — указатель `Arc` (клон того же Arc = тот же listener).
pub type Listener = Arc<dyn Fn(&EventBus, Option<&Payload>) + Send + Sync>;

type ChannelMap = HashMap<String, HashMap<String, Vec<Listener>>>;

#[derive(Resource, Clone, Default)]
pub struct EventBus {
    channels: Arc<Mutex<ChannelMap>>,
}

/// Listener без разбора payload
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&EventBus, Option<&Payload>) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Listener с типизированным payload
///
/// Payload другого типа (или отсутствующий) — warning в лог, событие игнорируется.
pub fn typed_listener<T, F>(callback: F) -> Listener
where
    T: Any + Send + Sync,
    F: Fn(&EventBus, &T) + Send + Sync + 'static,
{
    Arc::new(move |bus: &EventBus, payload: Option<&Payload>| {
        match payload.and_then(|p| p.downcast_ref::<T>()) {
            Some(value) => callback(bus, value),
            None => log_warning(&format!(
                "EventBus: payload mismatch, expected {} (got {}), event ignored",
                type_name::<T>(),
                if payload.is_some() { "other type" } else { "no payload" }
            )),
        }
    })
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, ChannelMap> {
        self.channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Подписка. Повторная регистрация того же listener'а на ту же пару — no-op.
    ///
    /// Возвращает true если listener добавлен.
    pub fn register(&self, category: &str, event: &str, listener: &Listener) -> bool {
        let mut channels = self.channels();
        let listeners = channels
            .entry(category.to_string())
            .or_default()
            .entry(event.to_string())
            .or_default();

        if listeners.iter().any(|l| Arc::ptr_eq(l, listener)) {
            return false;
        }
        listeners.push(Arc::clone(listener));
        true
    }

    /// Отписка ровно этой тройки. Отсутствующая подписка — no-op.
    pub fn unregister(&self, category: &str, event: &str, listener: &Listener) -> bool {
        let mut channels = self.channels();
        let Some(events) = channels.get_mut(category) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };

        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        let removed = listeners.len() != before;

        if listeners.is_empty() {
            events.remove(event);
            if events.is_empty() {
                channels.remove(category);
            }
        }
        removed
    }

    /// Доставка всем текущим подписчикам в порядке регистрации.
    ///
    /// Нет подписчиков — warning, no-op.
    pub fn publish(&self, category: &str, event: &str, payload: Option<&Payload>) {
        let snapshot: Vec<Listener> = self
            .channels()
            .get(category)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default();

        if snapshot.is_empty() {
            log_warning(&format!(
                "EventBus: no listeners for category '{}', event '{}'",
                category, event
            ));
            return;
        }

        // Lock отпущен: listener может вызывать publish/register/unregister
        for listener in &snapshot {
            listener(self, payload);
        }
    }

    /// Publish с владеемым payload'ом
    pub fn publish_value<T: Any + Send + Sync>(&self, category: &str, event: &str, value: T) {
        self.publish(category, event, Some(&value));
    }

    pub fn listener_count(&self, category: &str, event: &str) -> usize {
        self.channels()
            .get(category)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }

    pub fn clear(&self) {
        self.channels().clear();
    }
}

/// Набор подписок одного владельца (UI панель, звуковой менеджер, HUD)
///
/// `enable` регистрирует все, `disable` снимает все. Drop снимает подписки.
pub struct Subscriptions {
    bus: EventBus,
    entries: Vec<(String, String, Listener)>,
    enabled: bool,
}

impl Subscriptions {
    pub fn new(bus: &EventBus) -> Self {
        Self {
            bus: bus.clone(),
            entries: Vec::new(),
            enabled: false,
        }
    }

    pub fn with(mut self, category: &str, event: &str, listener: Listener) -> Self {
        if self.enabled {
            self.bus.register(category, event, &listener);
        }
        self.entries
            .push((category.to_string(), event.to_string(), listener));
        self
    }

    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        for (category, event, listener) in &self.entries {
            self.bus.register(category, event, listener);
        }
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        for (category, event, listener) in &self.entries {
            self.bus.unregister(category, event, listener);
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.disable();
    }
}
