//! Keeps a UI tree's translatable nodes in step with the active locale.
//!
//! The tree itself is toolkit-specific and sits behind [`UiTree`]. The
//! synchronizer owns the set of bindings and re-applies them on every
//! [`LocaleChanged`] notification.

use std::fmt::Debug;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, trace};

use crate::engine::{LocaleChanged, LocaleEngine};
use crate::resolver::Vars;

/// A translatable spot in the tree: a node's text or one of its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<N> {
    pub node: N,
    pub key: String,
    pub attr: Option<String>,
}

impl<N: Clone> Binding<N> {
    pub fn text(node: N, key: impl Into<String>) -> Self {
        Self {
            node,
            key: key.into(),
            attr: None,
        }
    }

    pub fn attr(node: N, attr: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            node,
            key: key.into(),
            attr: Some(attr.into()),
        }
    }

    /// Parse the compact `attr:key,attr:key` notation. Pairs missing either
    /// side are skipped.
    pub fn parse_attr_list(node: N, list: &str) -> Vec<Self> {
        list.split(',')
            .filter_map(|pair| {
                let (attr, key) = pair.trim().split_once(':')?;
                let (attr, key) = (attr.trim(), key.trim());
                if attr.is_empty() || key.is_empty() {
                    return None;
                }
                Some(Self::attr(node.clone(), attr, key))
            })
            .collect()
    }
}

/// A UI tree the synchronizer can scan and write into.
pub trait UiTree {
    type Node: Clone + PartialEq + Debug;

    /// Every translatable binding currently in the tree.
    fn scan(&self) -> Vec<Binding<Self::Node>>;

    fn write_text(&mut self, node: &Self::Node, text: &str);

    fn write_attr(&mut self, node: &Self::Node, attr: &str, text: &str);

    /// Called after each pass with the active locale.
    fn set_document_locale(&mut self, _locale: &str) {}
}

pub struct UiSynchronizer<T: UiTree> {
    engine: Weak<LocaleEngine>,
    tree: T,
    bindings: Vec<Binding<T::Node>>,
    events: broadcast::Receiver<LocaleChanged>,
}

impl<T: UiTree> UiSynchronizer<T> {
    /// Subscribes immediately, so notifications sent before
    /// [`run`](Self::run) starts are queued rather than lost. When the
    /// engine is already ready the tree is translated right away. Holds the
    /// engine weakly: dropping the engine ends [`run`](Self::run).
    pub fn new(engine: &Arc<LocaleEngine>, tree: T) -> Self {
        let events = engine.subscribe();
        let mut sync = Self {
            engine: Arc::downgrade(engine),
            tree,
            bindings: Vec::new(),
            events,
        };
        sync.rescan();
        if engine.is_ready() {
            sync.apply();
        }
        sync
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn into_tree(self) -> T {
        self.tree
    }

    pub fn bindings(&self) -> &[Binding<T::Node>] {
        &self.bindings
    }

    /// Track one more binding. Duplicates are ignored.
    pub fn bind(&mut self, binding: Binding<T::Node>) {
        if !self.bindings.contains(&binding) {
            self.bindings.push(binding);
        }
    }

    /// Stop tracking every binding of `node`.
    pub fn unbind(&mut self, node: &T::Node) {
        self.bindings.retain(|b| b.node != *node);
    }

    /// Merge the tree's current bindings into the tracked set.
    pub fn rescan(&mut self) {
        for binding in self.tree.scan() {
            self.bind(binding);
        }
    }

    /// Re-resolve every binding and write back the ones that resolved.
    ///
    /// A result equal to the raw key means the translation is missing or
    /// still loading; the node keeps its current text. Returns the number
    /// of writes.
    pub fn apply(&mut self) -> usize {
        let Some(engine) = self.engine.upgrade() else {
            return 0;
        };

        let mut written = 0;
        for binding in &self.bindings {
            let text = engine.translate(&binding.key, &Vars::new());
            if text.is_empty() || text == binding.key {
                trace!(key = %binding.key, "skipping unresolved binding");
                continue;
            }
            match &binding.attr {
                Some(attr) => self.tree.write_attr(&binding.node, attr, &text),
                None => self.tree.write_text(&binding.node, &text),
            }
            written += 1;
        }

        let locale = engine.current_locale();
        self.tree.set_document_locale(&locale);
        debug!(locale = %locale, written, "applied translations");
        written
    }

    /// Wait for the next notification and apply. Several missed
    /// notifications collapse into one pass. Returns `false` once the
    /// engine is gone.
    pub async fn next(&mut self) -> bool {
        match self.events.recv().await {
            Ok(event) => trace!(locale = %event.locale, "locale changed"),
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "synchronizer lagged"),
            Err(RecvError::Closed) => return false,
        }
        while self.events.try_recv().is_ok() {}
        self.rescan();
        self.apply();
        true
    }

    /// Apply on every notification until the engine is dropped.
    pub async fn run(mut self) -> T {
        while self.next().await {}
        self.tree
    }
}
