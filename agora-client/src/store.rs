use std::{rc::Rc, sync::Arc};

use async_trait::async_trait;

use crate::api::{self, Actor, Comment, NewComment, PostId};

/// The backend table holding comments
#[async_trait(?Send)]
pub trait CommentStore {
    /// All the comments of a post, oldest first
    async fn fetch(&self, post: PostId) -> anyhow::Result<Vec<Comment>>;

    async fn create(&self, comment: NewComment) -> Result<(), api::Error>;
}

#[async_trait(?Send)]
impl<S: CommentStore + ?Sized> CommentStore for &S {
    async fn fetch(&self, post: PostId) -> anyhow::Result<Vec<Comment>> {
        (**self).fetch(post).await
    }

    async fn create(&self, comment: NewComment) -> Result<(), api::Error> {
        (**self).create(comment).await
    }
}

#[async_trait(?Send)]
impl<S: CommentStore + ?Sized> CommentStore for Rc<S> {
    async fn fetch(&self, post: PostId) -> anyhow::Result<Vec<Comment>> {
        (**self).fetch(post).await
    }

    async fn create(&self, comment: NewComment) -> Result<(), api::Error> {
        (**self).create(comment).await
    }
}

#[async_trait(?Send)]
impl<S: CommentStore + ?Sized> CommentStore for Arc<S> {
    async fn fetch(&self, post: PostId) -> anyhow::Result<Vec<Comment>> {
        (**self).fetch(post).await
    }

    async fn create(&self, comment: NewComment) -> Result<(), api::Error> {
        (**self).create(comment).await
    }
}

/// Who is currently logged in, if anyone
pub trait ActorProvider {
    fn current_actor(&self) -> Option<Actor>;
}

impl ActorProvider for Option<Actor> {
    fn current_actor(&self) -> Option<Actor> {
        self.clone()
    }
}

impl<A: ActorProvider + ?Sized> ActorProvider for &A {
    fn current_actor(&self) -> Option<Actor> {
        (**self).current_actor()
    }
}
