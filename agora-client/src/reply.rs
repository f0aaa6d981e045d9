use crate::{
    api::{self, NewComment},
    ActorProvider, CommentCache, CommentStore, NodeState, ReplyError, ReplyTarget,
};

/// Submits the draft of `state` as a comment on `target`.
///
/// On success the draft is cleared, the form goes back to rest and the post's comments
/// are invalidated in `cache`. On failure the form keeps the draft and shows the error;
/// nothing is retried.
pub async fn submit_reply<S, A>(
    state: &mut NodeState,
    target: ReplyTarget,
    cache: &CommentCache<S>,
    actor: &A,
) -> Result<(), ReplyError>
where
    S: CommentStore,
    A: ActorProvider + ?Sized,
{
    let new = state.begin_submit(target, actor.current_actor().as_ref())?;
    let res = send_reply(cache, new).await;
    state.finish_submit(&res);
    res.map_err(ReplyError::Write)
}

/// Writes a comment obtained from `NodeState::begin_submit`, invalidating its post on
/// success. The result is meant to be handed back to `NodeState::finish_submit`.
pub async fn send_reply<S: CommentStore>(
    cache: &CommentCache<S>,
    comment: NewComment,
) -> Result<(), api::Error> {
    let (post, parent) = (comment.post_id, comment.parent_comment_id);
    match cache.store().create(comment).await {
        Ok(()) => {
            tracing::info!(?post, ?parent, "comment submitted");
            cache.invalidate(post);
            Ok(())
        }
        Err(err) => {
            tracing::warn!(?post, ?parent, %err, "comment rejected");
            Err(err)
        }
    }
}
