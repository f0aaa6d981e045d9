//! Flattening of a comment forest into displayable rows.
//!
//! A [`TreeView`] owns the forest of a post and the interaction state of each of its
//! comments. Front-ends either render its [`Row`]s directly, or build one [`Row`] per
//! component through [`Row::new`].

use std::{collections::HashMap, fmt::Write};

use crate::{
    api::{self, Actor, CommentId, NewComment, PostId, ANONYMOUS_NAME},
    Collapse, CommentNode, Forest, NodeState, ReplyError, ReplyForm, ReplyTarget,
    TimestampFormatter,
};

pub const REPLY_LABEL: &str = "Reply";
pub const CANCEL_LABEL: &str = "Cancel";
pub const POSTING_LABEL: &str = "Posting...";

/// "1 reply", "2 replies"
pub fn reply_count_label(n: usize) -> String {
    match n {
        1 => String::from("1 reply"),
        n => format!("{n} replies"),
    }
}

/// One comment, as it should be displayed
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    /// 0 for root comments
    pub depth: usize,
    pub id: CommentId,
    pub author: String,
    pub avatar_url: Option<String>,
    pub time: String,
    pub content: String,

    /// Set iff the comment has replies, with the current collapse state
    pub toggle: Option<Collapse>,

    /// Replaces the replies while collapsed
    pub collapsed_summary: Option<String>,

    pub reply_label: &'static str,
    pub form: ReplyForm,
    pub draft: String,
}

impl Row {
    pub fn new(
        node: &CommentNode,
        depth: usize,
        state: &NodeState,
        fmt: &(impl TimestampFormatter + ?Sized),
    ) -> Row {
        let toggle = node.has_children().then_some(state.collapse);
        let collapsed_summary = match toggle {
            Some(Collapse::Collapsed) => Some(reply_count_label(node.reply_count())),
            _ => None,
        };
        let author = match node.author.trim() {
            "" => String::from(ANONYMOUS_NAME),
            a => String::from(a),
        };
        Row {
            depth,
            id: node.id(),
            author,
            avatar_url: node.avatar_url.clone(),
            time: fmt.format(&node.created_at),
            content: node.content.clone(),
            toggle,
            collapsed_summary,
            reply_label: match state.form.is_shown() {
                true => CANCEL_LABEL,
                false => REPLY_LABEL,
            },
            form: state.form.clone(),
            draft: state.draft.clone(),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.toggle.map(Collapse::is_collapsed).unwrap_or(false)
    }
}

/// The comment section of a post
pub struct TreeView {
    post_id: PostId,
    roots: Forest,

    /// Comments that were never interacted with have no entry. Comments sharing an id
    /// share their state.
    states: HashMap<CommentId, NodeState>,

    /// The top-level form, kept across tree replacements
    composer: NodeState,
}

impl TreeView {
    pub fn new(post_id: PostId, roots: Forest) -> TreeView {
        TreeView {
            post_id,
            roots,
            states: HashMap::new(),
            composer: NodeState::composer(),
        }
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn roots(&self) -> &Forest {
        &self.roots
    }

    /// Swaps in a freshly built forest. All per-comment state is dropped.
    pub fn replace_tree(&mut self, roots: Forest) {
        tracing::debug!(post = ?self.post_id, dropped_states = self.states.len(), "replacing comment tree");
        self.roots = roots;
        self.states.clear();
    }

    pub fn node(&self, id: CommentId) -> Option<&CommentNode> {
        self.roots.iter().find_map(|r| r.find(id))
    }

    pub fn state(&self, id: CommentId) -> Option<&NodeState> {
        self.states.get(&id)
    }

    /// Interaction state of `id`, created on first access
    pub fn state_mut(&mut self, id: CommentId) -> Result<&mut NodeState, ReplyError> {
        if self.node(id).is_none() {
            return Err(ReplyError::UnknownComment(id));
        }
        Ok(self.states.entry(id).or_default())
    }

    pub fn reply_target(&self, id: CommentId) -> Result<ReplyTarget, ReplyError> {
        self.node(id)
            .map(ReplyTarget::reply_to)
            .ok_or(ReplyError::UnknownComment(id))
    }

    /// Returns whether anything changed, which is not the case for comments without
    /// replies or that are not in the tree
    pub fn toggle_collapse(&mut self, id: CommentId) -> bool {
        let Some(node) = self.roots.iter().find_map(|r| r.find(id)) else {
            return false;
        };
        self.states.entry(id).or_default().toggle_collapse(node)
    }

    pub fn toggle_reply(&mut self, id: CommentId) -> Result<(), ReplyError> {
        self.state_mut(id)?.toggle_reply();
        Ok(())
    }

    pub fn set_draft(&mut self, id: CommentId, text: String) -> Result<(), ReplyError> {
        self.state_mut(id)?.set_draft(text);
        Ok(())
    }

    pub fn begin_reply(
        &mut self,
        id: CommentId,
        actor: Option<&Actor>,
    ) -> Result<NewComment, ReplyError> {
        let target = self.reply_target(id)?;
        self.state_mut(id)?.begin_submit(target, actor)
    }

    /// Results for comments that went away with a tree replacement are dropped
    pub fn finish_reply(&mut self, id: CommentId, res: &Result<(), api::Error>) {
        match self.states.get_mut(&id) {
            Some(s) => s.finish_submit(res),
            None => tracing::debug!(comment = ?id, "submission result for a comment no longer displayed"),
        }
    }

    pub fn composer(&self) -> &NodeState {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut NodeState {
        &mut self.composer
    }

    pub fn composer_target(&self) -> ReplyTarget {
        ReplyTarget::top_level(self.post_id)
    }

    /// Every visible comment in display order, skipping the replies of collapsed comments
    pub fn rows(&self, fmt: &(impl TimestampFormatter + ?Sized)) -> Vec<Row> {
        let default = NodeState::new();
        let mut res = Vec::new();
        let mut stack = self.roots.iter().rev().map(|n| (n, 0)).collect::<Vec<_>>();
        while let Some((node, depth)) = stack.pop() {
            let state = self.states.get(&node.id()).unwrap_or(&default);
            if !state.collapse.is_collapsed() {
                stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
            }
            res.push(Row::new(node, depth, state, fmt));
        }
        res
    }
}

/// Plain-text layout of `rows`, two spaces of indentation per level
pub fn to_text(rows: &[Row]) -> String {
    let mut res = String::new();
    for r in rows {
        let indent = "  ".repeat(r.depth);
        // writing to a String cannot fail
        let _ = writeln!(res, "{indent}#{} {} ({})", r.id, r.author, r.time);
        for line in r.content.lines() {
            let _ = writeln!(res, "{indent}  {line}");
        }
        if let Some(summary) = &r.collapsed_summary {
            let _ = writeln!(res, "{indent}  [+] {summary}");
        }
        match &r.form {
            ReplyForm::Hidden => (),
            ReplyForm::Open => {
                let _ = writeln!(res, "{indent}  > {}", r.draft);
            }
            ReplyForm::Submitting => {
                let _ = writeln!(res, "{indent}  > {} ({POSTING_LABEL})", r.draft);
            }
            ReplyForm::Error(msg) => {
                let _ = writeln!(res, "{indent}  > {}", r.draft);
                let _ = writeln!(res, "{indent}  Error: {msg}");
            }
        }
    }
    res
}
