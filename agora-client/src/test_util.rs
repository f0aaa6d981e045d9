use std::{
    future::Future,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    api::{self, Actor, Comment, CommentId, NewComment, PostId, UserId},
    CommentStore,
};

pub fn comment_on(post: i64, id: i64, parent: Option<i64>) -> Comment {
    Comment {
        id: CommentId(id),
        post_id: PostId(post),
        parent_comment_id: parent.map(CommentId),
        content: format!("comment {id}"),
        user_id: Some(UserId::stub()),
        author: String::from("bob"),
        avatar_url: None,
        created_at: String::from("2024-05-01T10:00:00Z"),
    }
}

pub fn comment(id: i64, parent: Option<i64>) -> Comment {
    comment_on(1, id, parent)
}

pub fn actor() -> Actor {
    Actor {
        id: UserId::stub(),
        display_name: String::from("alice"),
        avatar_url: None,
    }
}

pub fn block_on<F: Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed initializing tokio runtime")
        .block_on(f)
}

#[derive(Default)]
pub struct FakeStore {
    comments: Mutex<Vec<Comment>>,
    created: Mutex<Vec<NewComment>>,
    reject_with: Mutex<Option<api::Error>>,
    fetches: AtomicUsize,
    fail_fetches: AtomicBool,
}

impl FakeStore {
    pub fn with(comments: Vec<Comment>) -> FakeStore {
        FakeStore {
            comments: Mutex::new(comments),
            ..FakeStore::default()
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<NewComment> {
        self.created.lock().clone()
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst)
    }

    pub fn reject_writes(&self, err: Option<api::Error>) {
        *self.reject_with.lock() = err;
    }
}

#[async_trait(?Send)]
impl CommentStore for FakeStore {
    async fn fetch(&self, post: PostId) -> anyhow::Result<Vec<Comment>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(anyhow!("store unreachable"));
        }
        Ok(self
            .comments
            .lock()
            .iter()
            .filter(|c| c.post_id == post)
            .cloned()
            .collect())
    }

    async fn create(&self, c: NewComment) -> Result<(), api::Error> {
        self.created.lock().push(c.clone());
        if let Some(err) = self.reject_with.lock().clone() {
            return Err(err);
        }
        let mut comments = self.comments.lock();
        let id = comments.iter().map(|c| c.id.0).max().unwrap_or(0) + 1;
        comments.push(Comment {
            id: CommentId(id),
            post_id: c.post_id,
            parent_comment_id: c.parent_comment_id,
            content: c.content,
            user_id: Some(c.user_id),
            author: c.author,
            avatar_url: c.avatar_url,
            created_at: String::from("2024-05-02T10:00:00Z"),
        });
        Ok(())
    }
}
