use std::collections::HashMap;

use anyhow::Context;
use parking_lot::Mutex;

use crate::{api::PostId, build_tree, CommentStore, Forest};

#[derive(Default)]
struct Entry {
    /// Bumped on every invalidation
    generation: u64,

    /// Forest built from a fetch issued at `generation`, if still valid
    tree: Option<Forest>,
}

/// A forest along with the generation of the post when its fetch was issued
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub generation: u64,
    pub tree: Forest,
}

impl Snapshot {
    /// Whether this should replace `shown` on screen. Fetches may resolve out of
    /// order, and one issued before an invalidation can miss the write behind it.
    pub fn supersedes(&self, shown: Option<&Snapshot>) -> bool {
        shown.map_or(true, |s| self.generation >= s.generation)
    }
}

/// Comment forests of each post, refetched from the store after invalidation
pub struct CommentCache<S> {
    store: S,
    entries: Mutex<HashMap<PostId, Entry>>,
}

impl<S: CommentStore> CommentCache<S> {
    pub fn new(store: S) -> CommentCache<S> {
        CommentCache {
            store,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The cached forest for `post`, if it has been fetched since the last invalidation
    pub fn cached(&self, post: PostId) -> Option<Forest> {
        self.entries.lock().get(&post).and_then(|e| e.tree.clone())
    }

    pub fn generation(&self, post: PostId) -> u64 {
        self.entries.lock().get(&post).map(|e| e.generation).unwrap_or(0)
    }

    /// Returns the forest for `post`, fetching it if it is not cached
    pub async fn tree(&self, post: PostId) -> anyhow::Result<Forest> {
        Ok(self.snapshot(post).await?.tree)
    }

    /// Same as [`CommentCache::tree`], also telling at which generation the forest was
    /// fetched.
    ///
    /// If the post gets invalidated while the fetch is in flight, the result is still
    /// returned but not cached, so the next call fetches again.
    pub async fn snapshot(&self, post: PostId) -> anyhow::Result<Snapshot> {
        let generation = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(post).or_default();
            if let Some(tree) = &entry.tree {
                tracing::debug!(?post, "comment cache hit");
                return Ok(Snapshot {
                    generation: entry.generation,
                    tree: tree.clone(),
                });
            }
            entry.generation
        };
        tracing::debug!(?post, generation, "comment cache miss, fetching");
        let comments = self
            .store
            .fetch(post)
            .await
            .with_context(|| format!("fetching comments of post {post}"))?;
        let tree: Forest = build_tree(&comments).into();
        let mut entries = self.entries.lock();
        let entry = entries.entry(post).or_default();
        if entry.generation == generation {
            entry.tree = Some(tree.clone());
        } else {
            tracing::debug!(?post, "post invalidated during fetch, not caching");
        }
        Ok(Snapshot { generation, tree })
    }

    /// Marks the comments of `post` as stale
    pub fn invalidate(&self, post: PostId) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(post).or_default();
        entry.generation += 1;
        entry.tree = None;
        tracing::debug!(?post, generation = entry.generation, "invalidated comments");
    }
}
