use crate::{
    api::{self, Actor, CommentId, NewComment, PostId},
    CommentNode,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Collapse {
    #[default]
    Expanded,
    Collapsed,
}

impl Collapse {
    pub fn toggled(self) -> Collapse {
        match self {
            Collapse::Expanded => Collapse::Collapsed,
            Collapse::Collapsed => Collapse::Expanded,
        }
    }

    pub fn is_collapsed(self) -> bool {
        self == Collapse::Collapsed
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ReplyForm {
    #[default]
    Hidden,
    Open,
    Submitting,

    /// The last submission was rejected with this message; the form is still open
    Error(String),
}

impl ReplyForm {
    pub fn is_shown(&self) -> bool {
        !matches!(self, ReplyForm::Hidden)
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        matches!(self, ReplyForm::Open | ReplyForm::Error(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ReplyForm::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ReplyError {
    #[error("Invalid reply: {0}")]
    Validation(api::Error),

    #[error("You must be logged in to reply.")]
    AuthRequired,

    #[error("A reply is already being submitted")]
    AlreadySubmitting,

    #[error("The reply form is not open")]
    FormHidden,

    #[error("Comment {0} is not part of this thread")]
    UnknownComment(CommentId),

    #[error(transparent)]
    Write(api::Error),
}

/// Where a reply goes: a post, and optionally the comment it answers
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReplyTarget {
    pub post_id: PostId,
    pub parent: Option<CommentId>,
}

impl ReplyTarget {
    pub fn reply_to(node: &CommentNode) -> ReplyTarget {
        ReplyTarget {
            post_id: node.post_id,
            parent: Some(node.id()),
        }
    }

    pub fn top_level(post_id: PostId) -> ReplyTarget {
        ReplyTarget {
            post_id,
            parent: None,
        }
    }
}

/// Interaction state of a single rendered comment
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodeState {
    pub collapse: Collapse,
    pub form: ReplyForm,
    pub draft: String,

    /// Form state to go back to after a successful submission or a cancel
    resting: ReplyForm,
}

impl NodeState {
    pub fn new() -> NodeState {
        NodeState::default()
    }

    /// State of the post-level form, which stays open between submissions
    pub fn composer() -> NodeState {
        NodeState {
            form: ReplyForm::Open,
            resting: ReplyForm::Open,
            ..NodeState::default()
        }
    }

    /// Only comments with replies can be collapsed. Returns whether anything changed.
    pub fn toggle_collapse(&mut self, node: &CommentNode) -> bool {
        if !node.has_children() {
            return false;
        }
        self.collapse = self.collapse.toggled();
        true
    }

    /// The "Reply" / "Cancel" button
    pub fn toggle_reply(&mut self) {
        match self.form {
            ReplyForm::Hidden => self.open_reply(),
            ReplyForm::Open | ReplyForm::Error(_) => self.cancel_reply(),
            ReplyForm::Submitting => (),
        }
    }

    pub fn open_reply(&mut self) {
        if self.form == ReplyForm::Hidden {
            self.form = ReplyForm::Open;
        }
    }

    /// Closes the form, keeping the draft around for when it is reopened
    pub fn cancel_reply(&mut self) {
        if self.form.can_submit() {
            self.form = self.resting.clone();
        }
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    /// Validates the draft and moves to `Submitting`, returning what should be sent to
    /// the store. On error, the state is left untouched.
    pub fn begin_submit(
        &mut self,
        target: ReplyTarget,
        actor: Option<&Actor>,
    ) -> Result<NewComment, ReplyError> {
        match self.form {
            ReplyForm::Hidden => return Err(ReplyError::FormHidden),
            ReplyForm::Submitting => return Err(ReplyError::AlreadySubmitting),
            ReplyForm::Open | ReplyForm::Error(_) => (),
        }
        if self.draft.trim().is_empty() {
            return Err(ReplyError::Validation(api::Error::EmptyContent));
        }
        let actor = actor.ok_or(ReplyError::AuthRequired)?;
        let new = NewComment::new(target.post_id, target.parent, self.draft.clone(), actor);
        new.validate().map_err(ReplyError::Validation)?;
        self.form = ReplyForm::Submitting;
        Ok(new)
    }

    /// Applies the store's answer to a submission started with `begin_submit`
    pub fn finish_submit(&mut self, res: &Result<(), api::Error>) {
        if self.form != ReplyForm::Submitting {
            tracing::warn!(form = ?self.form, "submission result for a form that is not submitting");
            return;
        }
        match res {
            Ok(()) => {
                self.draft.clear();
                self.form = self.resting.clone();
            }
            Err(e) => self.form = ReplyForm::Error(e.to_string()),
        }
    }
}
