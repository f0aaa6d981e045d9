mod comment;
pub use comment::{Comment, CommentId, NewComment};

mod error;
pub use error::Error;

mod post;
pub use post::PostId;

mod user;
pub use user::{Actor, AuthUser, UserId, UserMetadata, ANONYMOUS_NAME};

pub use uuid::{uuid, Uuid};

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

/// Name of the backend table holding comments
pub const COMMENTS_TABLE: &str = "Comments";

pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}
