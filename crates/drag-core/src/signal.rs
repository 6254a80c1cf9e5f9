use std::fmt;

pub type ListenerId = u64;

struct Listener<T> {
    id: ListenerId,
    once: bool,
    callback: Box<dyn FnMut(&T)>,
}

/// Synchronous multi-subscriber notification.
///
/// Listeners run in subscription order, inside the call to [`Signal::dispatch`].
pub struct Signal<T> {
    listeners: Vec<Listener<T>>,
    next_id: ListenerId,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: impl FnMut(&T) + 'static) -> ListenerId {
        self.push(callback, false)
    }

    /// Subscribe for the next dispatch only.
    pub fn add_once(&mut self, callback: impl FnMut(&T) + 'static) -> ListenerId {
        self.push(callback, true)
    }

    /// Returns false if `id` was not subscribed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn remove_all(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn dispatch(&mut self, payload: &T) {
        for listener in &mut self.listeners {
            (listener.callback)(payload);
        }
        self.listeners.retain(|l| !l.once);
    }

    fn push(&mut self, callback: impl FnMut(&T) + 'static, once: bool) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            once,
            callback: Box::new(callback),
        });
        id
    }
}
