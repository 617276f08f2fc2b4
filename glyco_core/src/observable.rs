//! Observable state container shared by the stores.
//!
//! Each store owns one `Observable`. Mutations go through [`Observable::update`],
//! which runs the mutation and then notifies every subscriber with the new
//! state and the [`Origin`] of the change. Mutation requires `&mut self`, so a
//! store has a single writer and subscribers always see a complete update.

use crate::Origin;

/// Handle returned by [`Observable::subscribe`], used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Box<dyn Fn(&S, Origin) + Send>;

/// A state value plus its subscribers
pub struct Observable<S> {
    state: S,
    listeners: Vec<(SubscriptionId, Listener<S>)>,
    next_id: u64,
}

impl<S> Observable<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Current state
    pub fn get(&self) -> &S {
        &self.state
    }

    /// Register a listener called after every change
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&S, Origin) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        tracing::trace!("Added subscriber {:?}", id);
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Apply a mutation, then notify subscribers once
    pub fn update<R>(&mut self, origin: Origin, mutate: impl FnOnce(&mut S) -> R) -> R {
        let result = mutate(&mut self.state);
        self.notify(origin);
        result
    }

    fn notify(&self, origin: Origin) {
        for (_, listener) in &self.listeners {
            listener(&self.state, origin);
        }
    }
}

impl<S: Default> Default for Observable<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Observable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("state", &self.state)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}
