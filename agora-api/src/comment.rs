use crate::{Actor, Error, PostId, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for CommentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<CommentId, Self::Err> {
        s.parse().map(CommentId)
    }
}

/// A row of the comments table, as returned by the backend
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,

    /// `None` for a top-level comment
    pub parent_comment_id: Option<CommentId>,

    pub content: String,

    #[serde(default)]
    pub user_id: Option<UserId>,

    /// Display name captured when the comment was written
    pub author: String,
    pub avatar_url: Option<String>,

    /// RFC 3339 timestamp as emitted by the backend
    pub created_at: String,
}

/// Payload inserted into the comments table
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
    pub user_id: UserId,
    pub author: String,
    pub avatar_url: Option<String>,
}

impl NewComment {
    pub fn new(
        post_id: PostId,
        parent_comment_id: Option<CommentId>,
        content: String,
        actor: &Actor,
    ) -> NewComment {
        NewComment {
            post_id,
            content,
            parent_comment_id,
            user_id: actor.id,
            author: actor.display_name.clone(),
            avatar_url: actor.avatar_url.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.content.trim().is_empty() {
            return Err(Error::EmptyContent);
        }
        crate::validate_string(&self.content)?;
        crate::validate_string(&self.author)?;
        if let Some(url) = &self.avatar_url {
            crate::validate_string(url)?;
        }
        Ok(())
    }
}
