#[cfg(test)]
#[path = "watchers_test.rs"]
mod tests;

use std::collections::HashMap;
use std::collections::VecDeque;

use tokio::task::JoinHandle;

/// Registry of live store watch tasks keyed by message id. The history
/// listener discovers one message per prompt ever sent, and each message
/// wants one watch per model; left unchecked that grows without bound.
/// The registry keeps a least-recently-used order with a hard cap and aborts
/// whatever falls off the end. Updates for an evicted message are not lost,
/// the history listener still covers the whole tree.
pub struct WatcherRegistry {
    limit: usize,
    order: VecDeque<String>,
    watchers: HashMap<String, Vec<JoinHandle<()>>>,
}

impl WatcherRegistry {
    pub fn new(limit: usize) -> WatcherRegistry {
        return WatcherRegistry {
            limit: limit.max(1),
            order: VecDeque::new(),
            watchers: HashMap::new(),
        };
    }

    pub fn contains(&self, message_id: &str) -> bool {
        return self.watchers.contains_key(message_id);
    }

    pub fn len(&self) -> usize {
        return self.watchers.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.watchers.is_empty();
    }

    /// Registers the watch tasks for a message as most recently used.
    /// Returns the ids evicted to stay within the bound.
    pub fn track(&mut self, message_id: &str, handles: Vec<JoinHandle<()>>) -> Vec<String> {
        self.release(message_id);
        self.watchers.insert(message_id.to_string(), handles);
        self.order.push_front(message_id.to_string());

        let mut evicted: Vec<String> = vec![];
        while self.order.len() > self.limit {
            if let Some(oldest) = self.order.pop_back() {
                if let Some(handles) = self.watchers.remove(&oldest) {
                    for handle in handles {
                        handle.abort();
                    }
                }
                evicted.push(oldest);
            }
        }

        return evicted;
    }

    pub fn touch(&mut self, message_id: &str) {
        if let Some(idx) = self
            .order
            .iter()
            .position(|entry| return entry == message_id)
        {
            if let Some(id) = self.order.remove(idx) {
                self.order.push_front(id);
            }
        }
    }

    pub fn release(&mut self, message_id: &str) {
        if let Some(handles) = self.watchers.remove(message_id) {
            for handle in handles {
                handle.abort();
            }
        }
        if let Some(idx) = self
            .order
            .iter()
            .position(|entry| return entry == message_id)
        {
            self.order.remove(idx);
        }
    }

    /// Teardown on quit. Nothing may keep streaming once the UI is gone.
    pub fn release_all(&mut self) {
        for (_, handles) in self.watchers.drain() {
            for handle in handles {
                handle.abort();
            }
        }
        self.order.clear();
    }
}
