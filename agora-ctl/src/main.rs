use agora_client::{
    api::{CommentId, PostId},
    render, submit_reply, CommentCache, RelativeTime, RestConfig, RestStore, TreeView,
};
use anyhow::Context;

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long)]
    host: String,

    #[structopt(long, env = "AGORA_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Timezone used to display dates older than a week
    #[structopt(long, default_value = "UTC")]
    timezone: chrono_tz::Tz,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the comment thread of a post
    Show {
        post: PostId,

        /// Hide the replies to these comments
        #[structopt(long)]
        collapse: Vec<CommentId>,
    },

    /// Post a top-level comment
    Comment { post: PostId, text: String },

    /// Reply to a comment
    Reply {
        post: PostId,
        parent: CommentId,
        text: String,
    },
}

fn access_token() -> anyhow::Result<Option<String>> {
    match std::env::var("AGORA_ACCESS_TOKEN") {
        Ok(tok) => Ok(Some(tok)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).context("retrieving AGORA_ACCESS_TOKEN environment variable"),
    }
}

async fn logged_in_store(config: RestConfig) -> anyhow::Result<RestStore> {
    let mut store = RestStore::new(config);
    let actor = store.load_actor().await?;
    anyhow::ensure!(
        actor.is_some(),
        "posting needs a valid AGORA_ACCESS_TOKEN environment variable"
    );
    Ok(store)
}

fn print_thread(view: &TreeView, fmt: &RelativeTime) {
    let rows = view.rows(fmt);
    if rows.is_empty() {
        println!("No comments yet.");
    } else {
        print!("{}", render::to_text(&rows));
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let config = RestConfig {
        host: opt.host,
        api_key: opt.api_key,
        access_token: access_token()?,
    };
    let fmt = RelativeTime::new(opt.timezone);

    match opt.cmd {
        Command::Show { post, collapse } => {
            let cache = CommentCache::new(RestStore::new(config));
            let mut view = TreeView::new(post, cache.tree(post).await?);
            for id in collapse {
                if !view.toggle_collapse(id) {
                    tracing::warn!(comment = ?id, "comment has no replies to collapse");
                }
            }
            print_thread(&view, &fmt);
        }
        Command::Comment { post, text } => {
            let cache = CommentCache::new(logged_in_store(config).await?);
            let mut view = TreeView::new(post, cache.tree(post).await?);
            let target = view.composer_target();
            view.composer_mut().set_draft(text);
            submit_reply(view.composer_mut(), target, &cache, cache.store())
                .await
                .context("posting comment")?;
            view.replace_tree(cache.tree(post).await?);
            print_thread(&view, &fmt);
        }
        Command::Reply { post, parent, text } => {
            let cache = CommentCache::new(logged_in_store(config).await?);
            let mut view = TreeView::new(post, cache.tree(post).await?);
            let target = view
                .reply_target(parent)
                .with_context(|| format!("replying to comment {parent} of post {post}"))?;
            let state = view.state_mut(parent)?;
            state.open_reply();
            state.set_draft(text);
            submit_reply(state, target, &cache, cache.store())
                .await
                .context("posting reply")?;
            view.replace_tree(cache.tree(post).await?);
            print_thread(&view, &fmt);
        }
    }

    Ok(())
}
