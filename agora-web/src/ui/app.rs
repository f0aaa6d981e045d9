use std::rc::Rc;

use agora_client::{
    api::{self, Actor, PostId},
    send_reply, CommentCache, NodeState, RelativeTime, RestStore, ReplyTarget, Snapshot,
};
use yew::prelude::*;

use crate::{session, ui, util};

pub enum AppMsg {
    ActorLoaded(Option<Actor>),
    TreeLoaded(Result<Snapshot, String>),

    /// A reply got written somewhere in the thread
    Invalidated,

    ComposerDraft(String),
    ComposerSubmit,
    ComposerDone(Result<(), api::Error>),
}

/// The comment section of the post named in the page url
pub struct App {
    post: Option<PostId>,
    backend: Option<ui::Backend>,
    actor: Option<Actor>,
    fmt: RelativeTime,

    /// Comment states do not survive a change of its generation
    tree: Option<Snapshot>,
    load_error: Option<String>,

    composer: NodeState,
}

impl App {
    fn fetch_tree(&self, ctx: &Context<Self>) {
        let (Some(post), Some(backend)) = (self.post, &self.backend) else {
            return;
        };
        let cache = backend.0.clone();
        ctx.link().send_future(async move {
            AppMsg::TreeLoaded(cache.snapshot(post).await.map_err(|e| format!("{e:#}")))
        });
    }

    fn fetch_actor(&self, ctx: &Context<Self>) {
        let Some(backend) = &self.backend else {
            return;
        };
        let cache = backend.0.clone();
        ctx.link().send_future(async move {
            match cache.store().fetch_actor().await {
                Ok(actor) => AppMsg::ActorLoaded(actor),
                Err(e) => {
                    tracing::error!("failed to fetch current user: {e:#}");
                    AppMsg::ActorLoaded(None)
                }
            }
        });
    }
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let post = session::post_from_location();
        let backend = session::load()
            .map(|config| ui::Backend(Rc::new(CommentCache::new(RestStore::new(config)))));
        let app = App {
            post,
            backend,
            actor: None,
            fmt: RelativeTime::new(util::local_tz()),
            tree: None,
            load_error: None,
            composer: NodeState::composer(),
        };
        app.fetch_actor(ctx);
        app.fetch_tree(ctx);
        app
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::ActorLoaded(actor) => self.actor = actor,
            AppMsg::TreeLoaded(Ok(snapshot)) => {
                if !snapshot.supersedes(self.tree.as_ref()) {
                    tracing::debug!(generation = snapshot.generation, "dropping out-of-date comments");
                    return false;
                }
                self.tree = Some(snapshot);
                self.load_error = None;
            }
            AppMsg::TreeLoaded(Err(e)) => {
                tracing::error!("failed to load comments: {e}");
                self.load_error = Some(e);
            }
            AppMsg::Invalidated => {
                self.fetch_tree(ctx);
                return false;
            }
            AppMsg::ComposerDraft(text) => self.composer.set_draft(text),
            AppMsg::ComposerSubmit => {
                let (Some(post), Some(backend)) = (self.post, &self.backend) else {
                    return false;
                };
                let target = ReplyTarget::top_level(post);
                match self.composer.begin_submit(target, self.actor.as_ref()) {
                    Ok(new) => {
                        let cache = backend.0.clone();
                        ctx.link().send_future(async move {
                            AppMsg::ComposerDone(send_reply(&cache, new).await)
                        });
                    }
                    Err(e) => {
                        tracing::debug!(%e, "comment not submitted");
                        return false;
                    }
                }
            }
            AppMsg::ComposerDone(res) => {
                self.composer.finish_submit(&res);
                if res.is_ok() {
                    self.fetch_tree(ctx);
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let (Some(_), Some(backend)) = (self.post, &self.backend) else {
            return html! {
                <div class="container my-4">
                    <p class="text-muted">
                        { "Open a post from the community page to see its comments." }
                    </p>
                </div>
            };
        };
        html! {
            <section class="container my-4 comment-section">
                <h3>{ "Comments" }</h3>
                { self.composer_view(ctx) }
                { self.thread_view(ctx, backend) }
            </section>
        }
    }
}

impl App {
    fn composer_view(&self, ctx: &Context<Self>) -> Html {
        if self.actor.is_none() {
            return html! {
                <p class="text-muted">{ "You must be logged in to post a comment." }</p>
            };
        }
        html! {
            <ui::ReplyFormView
                form={ self.composer.form.clone() }
                draft={ self.composer.draft.clone() }
                submit_label="Post Comment"
                on_draft={ ctx.link().callback(AppMsg::ComposerDraft) }
                on_submit={ ctx.link().callback(|()| AppMsg::ComposerSubmit) }
            />
        }
    }

    fn thread_view(&self, ctx: &Context<Self>, backend: &ui::Backend) -> Html {
        if let Some(e) = &self.load_error {
            return html! {
                <p class="text-danger">{ format!("Error loading comments: {e}") }</p>
            };
        }
        let Some(Snapshot { generation, tree }) = &self.tree else {
            return html! { <p>{ "Loading comments..." }</p> };
        };
        if tree.is_empty() {
            return html! { <p class="text-muted">{ "No comments yet." }</p> };
        }
        let on_invalidate = ctx.link().callback(|()| AppMsg::Invalidated);
        html! {
            <div class="mt-4">
                { for tree.iter().map(|root| html! {
                    <ui::CommentItem
                        key={ format!("{generation}-{}", root.id()) }
                        node={ root.clone() }
                        backend={ backend.clone() }
                        actor={ self.actor.clone() }
                        fmt={ self.fmt }
                        on_invalidate={ on_invalidate.clone() }
                    />
                }) }
            </div>
        }
    }
}
