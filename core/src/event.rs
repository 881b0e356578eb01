use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Weak,
    },
};
use crossbeam_skiplist::SkipSet;

use crate::storage::DocumentRef;

/// Something listeners can be notified about.
pub trait Event: fmt::Debug + Send + Sync {}

type Callback<E> = dyn Fn(&E) + Send + Sync;

struct ListenerEntry<E: Event> {
    // The list only holds a weak reference; the `Listener` handle owns the callback.
    callback: Weak<Callback<E>>,
    order: usize,
}

// Entries are compared by registration order only.
impl<E: Event> Eq for ListenerEntry<E> {}

impl<E: Event> PartialEq for ListenerEntry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl<E: Event> Ord for ListenerEntry<E> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order.cmp(&other.order)
    }
}

impl<E: Event> PartialOrd for ListenerEntry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

static NEXT_LISTENER_ORDER: AtomicUsize = AtomicUsize::new(0);

/// Listeners for one event type, called in the order they registered.
pub struct ListenerList<E: Event> {
    inner: SkipSet<ListenerEntry<E>>,
}

impl<E: Event + 'static> ListenerList<E> {
    pub fn new() -> Self {
        ListenerList {
            inner: SkipSet::new(),
        }
    }

    /// Number of registered entries, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Calls every live listener with `event`.
    ///
    /// Entries whose `Listener` handle was dropped are removed on the way.
    /// Only the owner of the list (inside this crate) may dispatch.
    pub(crate) fn dispatch(&self, event: &E) {
        let mut stale = Vec::new();

        for entry in self.inner.iter() {
            match entry.callback.upgrade() {
                Some(callback) => callback(event),
                None => stale.push(entry.order),
            }
        }

        if stale.is_empty() {
            return;
        }

        // Removal needs a key; only `order` takes part in the comparison.
        let placeholder: Arc<Callback<E>> = Arc::new(|_: &E| {});
        for order in stale {
            let key = ListenerEntry {
                callback: Arc::downgrade(&placeholder),
                order,
            };
            self.inner.remove(&key);
        }
    }
}

impl<E: Event + 'static> Default for ListenerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for ListenerList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList")
         .field("listener_count", &self.inner.len())
         .finish()
    }
}

/// An active registration on a [`ListenerList`].
///
/// Dropping the handle unsubscribes. The stale entry is cleaned up on the
/// next dispatch.
pub struct Listener<E: Event> {
    #[allow(dead_code)] // keeps the callback alive
    callback: Arc<Callback<E>>,
    order: usize,
}

impl<E: Event + 'static> Listener<E> {
    /// Registers `callback` on `listeners`. Keep the returned handle for as
    /// long as the callback should run.
    pub fn new<F>(listeners: &ListenerList<E>, callback: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let order = NEXT_LISTENER_ORDER.fetch_add(1, Ordering::SeqCst);
        let callback: Arc<Callback<E>> = Arc::new(callback);
        listeners.inner.insert(ListenerEntry {
            callback: Arc::downgrade(&callback),
            order,
        });

        Listener { callback, order }
    }
}

impl<E: Event> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("order", &self.order)
            .finish()
    }
}

/// Generates a struct with one public [`ListenerList`] per event.
macro_rules! define_event_listeners {
    ($struct_name:ident { $($field_name:ident: $event_type:ty),* $(,)? }) => {
        /// Listener lists for the events this type emits.
        #[derive(Debug, Default)]
        pub struct $struct_name {
            $(
                pub $field_name: $crate::event::ListenerList<$event_type>,
            )*
        }

        impl $struct_name {
            pub fn new() -> Self {
                Self {
                    $(
                        $field_name: $crate::event::ListenerList::new(),
                    )*
                }
            }
        }
    };
}

/// A document's content was replaced in a store.
///
/// Carries the content that was written so listeners do not have to read it
/// back.
#[derive(Debug, Clone)]
pub struct DocumentChanged {
    pub document: DocumentRef,
    pub content: String,
}

impl Event for DocumentChanged {}

define_event_listeners! { StoreEvents {
    document_changed: DocumentChanged,
}}
