use std::rc::Rc;

use agora_client::{CommentCache, RestStore};

mod app;
pub use app::App;

mod comment_item;
pub use comment_item::CommentItem;

mod reply_form;
pub use reply_form::ReplyFormView;

/// Connection to the backend, shared by every component of the page
#[derive(Clone)]
pub struct Backend(pub Rc<CommentCache<RestStore>>);

impl PartialEq for Backend {
    fn eq(&self, other: &Backend) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
