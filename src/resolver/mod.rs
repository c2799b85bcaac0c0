//! Asynchronous option resolution for `resource` fields.
//!
//! Every rendered resource field owns a slot keyed by its [`FieldPath`]. A
//! slot tracks the lookup key it last observed, the options it holds and the
//! generation of its in-flight lookup. Results carrying an older generation,
//! or addressed to a slot that has been torn down, are dropped.

mod lookup;

use std::{any::Any, collections::HashMap, panic::AssertUnwindSafe, sync::Arc};

use anyhow::anyhow;
use futures::FutureExt;
use indexmap::IndexMap;
use tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::domain::{FieldPath, SelectOption};
use crate::form::FormError;

pub use lookup::{InventoryItem, InventoryLookup, LookupKey, StaticInventory};

/// Options currently available to one resource field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceState {
    pub options: Vec<SelectOption>,
    pub loading: bool,
}

#[derive(Debug, Default)]
struct ResourceSlot {
    key: Option<LookupKey>,
    generation: u64,
    state: ResourceState,
    memo: HashMap<LookupKey, Vec<SelectOption>>,
    task: Option<JoinHandle<()>>,
    pass: u64,
}

struct Completion {
    path: FieldPath,
    generation: u64,
    key: LookupKey,
    result: anyhow::Result<Vec<InventoryItem>>,
}

pub struct OptionResolver {
    lookup: Arc<dyn InventoryLookup>,
    handle: Handle,
    slots: IndexMap<FieldPath, ResourceSlot>,
    sender: UnboundedSender<Completion>,
    receiver: UnboundedReceiver<Completion>,
    next_generation: u64,
    pass: u64,
    issued: usize,
}

impl std::fmt::Debug for OptionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionResolver")
            .field("slots", &self.slots.keys().collect::<Vec<_>>())
            .field("issued", &self.issued)
            .finish()
    }
}

impl OptionResolver {
    pub fn new(lookup: Arc<dyn InventoryLookup>, handle: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            lookup,
            handle,
            slots: IndexMap::new(),
            sender,
            receiver,
            next_generation: 0,
            pass: 0,
            issued: 0,
        }
    }

    /// Build a resolver that spawns lookups on the ambient tokio runtime.
    pub fn current(lookup: Arc<dyn InventoryLookup>) -> Result<Self, FormError> {
        let handle = Handle::try_current().map_err(FormError::NoRuntime)?;
        Ok(Self::new(lookup, handle))
    }

    /// Start a render pass. Slots not observed before [`Self::end_pass`] are torn down.
    pub fn begin_pass(&mut self) {
        self.pass += 1;
    }

    /// Tear down every slot the current pass did not observe, cancelling its lookup.
    pub fn end_pass(&mut self) {
        let pass = self.pass;
        self.slots.retain(|path, slot| {
            if slot.pass == pass {
                return true;
            }
            if let Some(task) = slot.task.take() {
                task.abort();
            }
            debug!(path = %path, "resource field unmounted");
            false
        });
    }

    /// Record that the field at `path` wants options for `key`, spawning a
    /// lookup when the key is new to that field.
    pub fn observe(&mut self, path: &FieldPath, key: LookupKey) -> ResourceState {
        let slot = self.slots.entry(path.clone()).or_default();
        slot.pass = self.pass;
        if slot.key.as_ref() == Some(&key) {
            return slot.state.clone();
        }

        if let Some(task) = slot.task.take() {
            task.abort();
        }
        self.next_generation += 1;
        slot.generation = self.next_generation;
        slot.key = Some(key.clone());

        if let Some(options) = slot.memo.get(&key) {
            slot.state = ResourceState {
                options: options.clone(),
                loading: false,
            };
            return slot.state.clone();
        }

        slot.state = ResourceState {
            options: Vec::new(),
            loading: true,
        };
        self.issued += 1;
        debug!(
            path = %path,
            integration = %key.integration_name,
            canvas = %key.canvas_id,
            resource_type = %key.resource_type,
            generation = slot.generation,
            "issuing resource lookup"
        );

        let lookup = Arc::clone(&self.lookup);
        let sender = self.sender.clone();
        let path = path.clone();
        let generation = slot.generation;
        slot.task = Some(self.handle.spawn(async move {
            let result = AssertUnwindSafe(lookup.list_resources(&key))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(anyhow!("resource lookup panicked: {}", panic_message(&*payload)))
                });
            let _ = sender.send(Completion {
                path,
                generation,
                key,
                result,
            });
        }));
        slot.state.clone()
    }

    /// Apply every lookup that has already finished. Returns true when any
    /// slot changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.receiver.try_recv() {
            changed |= self.complete(completion);
        }
        changed
    }

    /// Wait until no slot is loading.
    pub async fn settle(&mut self) {
        while self.is_loading() {
            match self.receiver.recv().await {
                Some(completion) => {
                    self.complete(completion);
                }
                None => break,
            }
        }
    }

    pub fn state(&self, path: &FieldPath) -> Option<&ResourceState> {
        self.slots.get(path).map(|slot| &slot.state)
    }

    pub fn is_loading(&self) -> bool {
        self.slots.values().any(|slot| slot.state.loading)
    }

    /// Number of lookups issued over the resolver's lifetime.
    pub fn lookup_count(&self) -> usize {
        self.issued
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn complete(&mut self, completion: Completion) -> bool {
        let Some(slot) = self.slots.get_mut(&completion.path) else {
            debug!(path = %completion.path, "discarding lookup for unmounted field");
            return false;
        };
        if slot.generation != completion.generation {
            debug!(
                path = %completion.path,
                generation = completion.generation,
                current = slot.generation,
                "discarding stale lookup"
            );
            return false;
        }

        slot.task = None;
        slot.state.loading = false;
        match completion.result {
            Ok(items) => {
                let options = lookup::options_from_items(&items);
                slot.memo.insert(completion.key, options.clone());
                slot.state.options = options;
            }
            Err(err) => {
                warn!(
                    path = %completion.path,
                    resource_type = %completion.key.resource_type,
                    error = %err,
                    "resource lookup failed"
                );
                slot.state.options.clear();
            }
        }
        true
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl Drop for OptionResolver {
    fn drop(&mut self) {
        for slot in self.slots.values_mut() {
            if let Some(task) = slot.task.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::bail;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;

    #[derive(Default)]
    struct Recording {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InventoryLookup for Recording {
        async fn list_resources(&self, key: &LookupKey) -> anyhow::Result<Vec<InventoryItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if key.resource_type == "broken" {
                bail!("inventory unavailable");
            }
            Ok(vec![InventoryItem::named(format!(
                "{}-{}",
                key.canvas_id, key.resource_type
            ))])
        }
    }

    /// Holds the first lookup until released so a newer one can overtake it.
    struct Gated {
        gate: Notify,
        first: AtomicUsize,
    }

    #[async_trait]
    impl InventoryLookup for Gated {
        async fn list_resources(&self, key: &LookupKey) -> anyhow::Result<Vec<InventoryItem>> {
            if self.first.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
            }
            Ok(vec![InventoryItem::named(key.canvas_id.clone())])
        }
    }

    struct Panicking;

    #[async_trait]
    impl InventoryLookup for Panicking {
        async fn list_resources(&self, key: &LookupKey) -> anyhow::Result<Vec<InventoryItem>> {
            panic!("inventory for {} exploded", key.resource_type);
        }
    }

    fn path() -> FieldPath {
        FieldPath::key("repo")
    }

    fn pass(resolver: &mut OptionResolver, key: LookupKey) -> ResourceState {
        resolver.begin_pass();
        let state = resolver.observe(&path(), key);
        resolver.end_pass();
        state
    }

    #[tokio::test]
    async fn one_lookup_per_distinct_key() {
        let lookup = Arc::new(Recording::default());
        let mut resolver = OptionResolver::current(lookup.clone()).expect("runtime");
        let key = LookupKey::new("github", "c1", "repository");

        let first = pass(&mut resolver, key.clone());
        assert!(first.loading);
        resolver.settle().await;
        let again = pass(&mut resolver, key.clone());
        assert!(!again.loading);
        assert_eq!(again.options, vec![SelectOption::same("c1-repository")]);
        assert_eq!(resolver.lookup_count(), 1);

        pass(&mut resolver, LookupKey::new("github", "c2", "repository"));
        resolver.settle().await;
        assert_eq!(resolver.lookup_count(), 2);
        assert_eq!(
            resolver.state(&path()).expect("slot").options,
            vec![SelectOption::same("c2-repository")]
        );

        let back = pass(&mut resolver, key);
        assert!(!back.loading, "previously resolved key is served from the slot");
        assert_eq!(back.options, vec![SelectOption::same("c1-repository")]);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_degrade_to_empty_options() {
        let lookup = Arc::new(Recording::default());
        let mut resolver = OptionResolver::current(lookup).expect("runtime");
        pass(&mut resolver, LookupKey::new("github", "c1", "broken"));
        resolver.settle().await;
        let state = resolver.state(&path()).expect("slot");
        assert!(!state.loading);
        assert!(state.options.is_empty());
    }

    #[tokio::test]
    async fn panicking_lookups_degrade_to_empty_options() {
        let mut resolver = OptionResolver::current(Arc::new(Panicking)).expect("runtime");
        let first = pass(&mut resolver, LookupKey::new("github", "c1", "repository"));
        assert!(first.loading);

        resolver.settle().await;
        assert!(!resolver.is_loading());
        let state = pass(&mut resolver, LookupKey::new("github", "c1", "repository"));
        assert!(!state.loading);
        assert!(state.options.is_empty());
    }

    #[tokio::test]
    async fn results_queued_before_a_key_change_are_discarded() {
        let lookup = Arc::new(Recording::default());
        let mut resolver = OptionResolver::current(lookup.clone()).expect("runtime");
        pass(&mut resolver, LookupKey::new("github", "old", "repository"));
        while resolver.receiver.is_empty() {
            tokio::task::yield_now().await;
        }

        let state = pass(&mut resolver, LookupKey::new("github", "new", "repository"));
        assert!(state.loading);
        assert!(!resolver.poll(), "the queued result belongs to the old key");
        let state = resolver.state(&path()).expect("slot");
        assert!(state.loading);
        assert!(state.options.is_empty());

        resolver.settle().await;
        assert_eq!(
            resolver.state(&path()).expect("slot").options,
            vec![SelectOption::same("new-repository")]
        );
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn key_change_aborts_the_pending_lookup() {
        let lookup = Arc::new(Gated {
            gate: Notify::new(),
            first: AtomicUsize::new(0),
        });
        let mut resolver = OptionResolver::current(lookup.clone()).expect("runtime");
        pass(&mut resolver, LookupKey::new("github", "old", "repository"));
        tokio::task::yield_now().await;
        pass(&mut resolver, LookupKey::new("github", "new", "repository"));
        lookup.gate.notify_one();
        resolver.settle().await;
        tokio::task::yield_now().await;
        resolver.poll();

        assert_eq!(
            resolver.state(&path()).expect("slot").options,
            vec![SelectOption::same("new")]
        );
    }

    #[tokio::test]
    async fn completions_from_older_generations_are_ignored() {
        let lookup = Arc::new(Recording::default());
        let mut resolver = OptionResolver::current(lookup).expect("runtime");
        pass(&mut resolver, LookupKey::new("github", "c1", "repository"));
        resolver.settle().await;

        let stale = Completion {
            path: path(),
            generation: 0,
            key: LookupKey::new("github", "c0", "repository"),
            result: Ok(vec![InventoryItem::named("stale")]),
        };
        let _ = resolver.sender.send(stale);
        assert!(!resolver.poll());
        assert_eq!(
            resolver.state(&path()).expect("slot").options,
            vec![SelectOption::same("c1-repository")]
        );
    }

    #[tokio::test]
    async fn unobserved_slots_are_torn_down() {
        let lookup = Arc::new(Recording::default());
        let mut resolver = OptionResolver::current(lookup).expect("runtime");
        pass(&mut resolver, LookupKey::new("github", "c1", "repository"));
        assert_eq!(resolver.len(), 1);

        resolver.begin_pass();
        resolver.end_pass();
        assert!(resolver.is_empty());
        assert!(!resolver.is_loading());

        tokio::task::yield_now().await;
        assert!(!resolver.poll(), "late results for removed slots are dropped");
        assert!(resolver.state(&path()).is_none());
    }

    #[test]
    fn requires_runtime() {
        let lookup = Arc::new(Recording::default());
        assert!(matches!(
            OptionResolver::current(lookup),
            Err(FormError::NoRuntime(_))
        ));
    }
}
