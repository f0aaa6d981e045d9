use anyhow::{anyhow, Context};
use async_trait::async_trait;

use crate::{
    api::{self, Actor, AuthUser, Comment, NewComment, PostId, COMMENTS_TABLE},
    ActorProvider, CommentStore,
};

/// Where the hosted backend lives, and how to authenticate to it
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RestConfig {
    /// Base url, without trailing slash
    pub host: String,

    /// Public key of the project, sent along with every request
    pub api_key: String,

    /// Session token of the logged-in user, if any
    #[serde(default)]
    pub access_token: Option<String>,
}

impl RestConfig {
    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }
}

/// Comment store talking to the hosted backend's table and auth APIs
pub struct RestStore {
    config: RestConfig,
    client: reqwest::Client,
    actor: Option<Actor>,
}

impl RestStore {
    pub fn new(config: RestConfig) -> RestStore {
        RestStore {
            config,
            client: reqwest::Client::new(),
            actor: None,
        }
    }

    pub fn with_actor(self, actor: Option<Actor>) -> RestStore {
        RestStore { actor, ..self }
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{COMMENTS_TABLE}",
            self.config.host.trim_end_matches('/')
        )
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.config.bearer())
    }

    /// Asks the auth service who the access token belongs to. Without an access token,
    /// nobody is logged in.
    pub async fn fetch_actor(&self) -> anyhow::Result<Option<Actor>> {
        if self.config.access_token.is_none() {
            return Ok(None);
        }
        let url = format!("{}/auth/v1/user", self.config.host.trim_end_matches('/'));
        let resp = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .context("querying the current user")?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::info!("access token was refused, continuing logged out");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            return Err(anyhow!(api::Error::from_response(status, &body)))
                .context("querying the current user");
        }
        let user: AuthUser = resp.json().await.context("parsing the current user")?;
        Ok(Some(Actor::from(user)))
    }

    /// Resolves and remembers the current actor
    pub async fn load_actor(&mut self) -> anyhow::Result<Option<&Actor>> {
        self.actor = self.fetch_actor().await?;
        Ok(self.actor.as_ref())
    }
}

#[async_trait(?Send)]
impl CommentStore for RestStore {
    async fn fetch(&self, post: PostId) -> anyhow::Result<Vec<Comment>> {
        let resp = self
            .request(reqwest::Method::GET, self.table_url())
            .query(&[
                ("select", String::from("*")),
                ("post_id", format!("eq.{post}")),
                ("order", String::from("created_at.asc")),
            ])
            .send()
            .await
            .context("sending comment query")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            return Err(anyhow!(api::Error::from_response(status, &body)));
        }
        let comments: Vec<Comment> = resp.json().await.context("parsing comment list")?;
        tracing::debug!(?post, count = comments.len(), "fetched comments");
        Ok(comments)
    }

    async fn create(&self, comment: NewComment) -> Result<(), api::Error> {
        let resp = self
            .request(reqwest::Method::POST, self.table_url())
            .header("Prefer", "return=minimal")
            .json(&comment)
            .send()
            .await
            .map_err(|e| api::Error::Unknown(format!("sending comment: {e}")))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.bytes().await.unwrap_or_default();
        let err = api::Error::from_response(status, &body);
        tracing::error!(%status, ?err, "backend refused comment");
        Err(err)
    }
}

impl ActorProvider for RestStore {
    fn current_actor(&self) -> Option<Actor> {
        self.actor.clone()
    }
}
