use std::sync::Arc;

use agora_client::{
    api::{self, Actor},
    render::{Row, REPLY_LABEL},
    send_reply, CommentNode, NodeState, RelativeTime, ReplyForm, ReplyTarget,
};
use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentItemProps {
    pub node: Arc<CommentNode>,
    pub backend: ui::Backend,
    pub actor: Option<Actor>,
    pub fmt: RelativeTime,

    /// Emitted once a reply got written, after the post's comments were invalidated
    pub on_invalidate: Callback<()>,
}

pub enum CommentItemMsg {
    ToggleCollapse,
    ToggleReply,
    CancelReply,
    Draft(String),
    Submit,
    Submitted(Result<(), api::Error>),
}

/// A comment and, unless collapsed, all its replies
pub struct CommentItem {
    state: NodeState,
}

impl Component for CommentItem {
    type Message = CommentItemMsg;
    type Properties = CommentItemProps;

    fn create(_ctx: &Context<Self>) -> Self {
        CommentItem {
            state: NodeState::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let p = ctx.props();
        match msg {
            CommentItemMsg::ToggleCollapse => return self.state.toggle_collapse(&p.node),
            CommentItemMsg::ToggleReply => self.state.toggle_reply(),
            CommentItemMsg::CancelReply => self.state.cancel_reply(),
            CommentItemMsg::Draft(text) => self.state.set_draft(text),
            CommentItemMsg::Submit => {
                let target = ReplyTarget::reply_to(&p.node);
                match self.state.begin_submit(target, p.actor.as_ref()) {
                    Ok(new) => {
                        let cache = p.backend.0.clone();
                        ctx.link().send_future(async move {
                            CommentItemMsg::Submitted(send_reply(&cache, new).await)
                        });
                    }
                    Err(e) => {
                        tracing::debug!(comment = ?p.node.id(), %e, "reply not submitted");
                        return false;
                    }
                }
            }
            CommentItemMsg::Submitted(res) => {
                self.state.finish_submit(&res);
                if res.is_ok() {
                    p.on_invalidate.emit(());
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let p = ctx.props();
        let row = Row::new(&p.node, 0, &self.state, &p.fmt);
        html! {
            <div class="comment border-start ps-3 py-2">
                <div class="d-flex gap-2">
                    { collapse_button(ctx, &row) }
                    <div class="flex-fill">
                        { meta(&row) }
                        <p class="mt-2 mb-1">{ &row.content }</p>
                        <button
                            type="button"
                            class="btn btn-link btn-sm p-0 text-muted"
                            disabled={ row.form == ReplyForm::Submitting }
                            onclick={ ctx.link().callback(|_| CommentItemMsg::ToggleReply) }
                        >
                            { row.reply_label }
                        </button>
                        { self.reply_form(ctx) }
                        { replies(p, &row) }
                    </div>
                </div>
            </div>
        }
    }
}

impl CommentItem {
    fn reply_form(&self, ctx: &Context<Self>) -> Html {
        if !self.state.form.is_shown() {
            return html! {};
        }
        if ctx.props().actor.is_none() {
            return html! {
                <p class="text-muted small mt-2">{ "You must be logged in to reply." }</p>
            };
        }
        html! {
            <ui::ReplyFormView
                form={ self.state.form.clone() }
                draft={ self.state.draft.clone() }
                submit_label={ REPLY_LABEL }
                on_draft={ ctx.link().callback(CommentItemMsg::Draft) }
                on_submit={ ctx.link().callback(|()| CommentItemMsg::Submit) }
                on_cancel={ Some(ctx.link().callback(|()| CommentItemMsg::CancelReply)) }
            />
        }
    }
}

fn collapse_button(ctx: &Context<CommentItem>, row: &Row) -> Html {
    let Some(state) = row.toggle else {
        return html! { <div class="collapse-spacer"></div> };
    };
    let (icon, title) = match state.is_collapsed() {
        true => ("bi-chevron-down", "Expand"),
        false => ("bi-chevron-up", "Collapse"),
    };
    html! {
        <button
            type="button"
            class={ classes!("btn", "bi-btn", "p-0", "align-self-start", icon) }
            title={ title }
            aria-label={ title }
            onclick={ ctx.link().callback(|_| CommentItemMsg::ToggleCollapse) }
        >
        </button>
    }
}

fn meta(row: &Row) -> Html {
    html! {
        <div class="d-flex align-items-center gap-2 small text-muted">
            { for row.avatar_url.as_ref().map(|url| html! {
                <img class="rounded-circle" src={ url.clone() } width="20" height="20" alt="" />
            }) }
            <span class="fw-semibold text-body">{ &row.author }</span>
            <span>{ "•" }</span>
            <span>{ &row.time }</span>
        </div>
    }
}

fn replies(p: &CommentItemProps, row: &Row) -> Html {
    if let Some(summary) = &row.collapsed_summary {
        return html! {
            <div class="small text-muted mt-2">
                <span class="bi-chevron-down me-1"></span>
                { summary }
            </div>
        };
    }
    if !p.node.has_children() {
        return html! {};
    }
    html! {
        <div class="replies mt-2">
            { for p.node.children.iter().map(|c| html! {
                <CommentItem
                    key={ c.id().to_string() }
                    node={ c.clone() }
                    backend={ p.backend.clone() }
                    actor={ p.actor.clone() }
                    fmt={ p.fmt }
                    on_invalidate={ p.on_invalidate.clone() }
                />
            }) }
        </div>
    }
}

