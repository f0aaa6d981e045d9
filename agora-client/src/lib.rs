mod cache;
pub use cache::{CommentCache, Snapshot};

mod node;
pub use node::{Collapse, NodeState, ReplyError, ReplyForm, ReplyTarget};

pub mod render;
pub use render::{Row, TreeView};

mod reply;
pub use reply::{send_reply, submit_reply};

pub mod rest;
pub use rest::{RestConfig, RestStore};

mod store;
pub use store::{ActorProvider, CommentStore};

mod time;
pub use time::{RelativeTime, TimestampFormatter};

mod tree;
pub use tree::{build_tree, CommentNode, Forest};

pub mod api {
    pub use agora_api::*;
}

#[cfg(test)]
pub(crate) mod test_util;
