use std::{
    collections::{btree_map, BTreeMap, HashSet},
    sync::Arc,
};

use agora_client::{
    api::{
        self, Actor, AuthUser, Comment, CommentId, Error, NewComment, PostId, UserId,
        UserMetadata, Uuid,
    },
    ActorProvider, CommentStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

/// In-memory stand-in for the hosted backend: an auth service and a comments table
pub struct MockServer {
    users: BTreeMap<UserId, MockUser>,
    comments: Vec<Comment>,
    next_id: i64,

    /// Timestamp given to the next comment, advanced by a minute on each insert
    clock: DateTime<Utc>,

    /// When set, every insert fails with this error
    reject_writes: Option<Error>,

    fetches: usize,
    creates: usize,
}

#[derive(Debug)]
struct MockUser {
    email: String,
    pass: String,
    metadata: UserMetadata,
    sessions: HashSet<Uuid>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            comments: Vec::new(),
            next_id: 1,
            clock: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            reject_writes: None,
            fetches: 0,
            creates: 0,
        }
    }

    /// Number of comment fetches served so far
    pub fn test_num_fetches(&self) -> usize {
        self.fetches
    }

    /// Number of inserts attempted so far, including rejected ones
    pub fn test_num_creates(&self) -> usize {
        self.creates
    }

    pub fn test_comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Make every following insert fail with `err`, or succeed again with `None`
    pub fn test_reject_writes(&mut self, err: Option<Error>) {
        self.reject_writes = err;
    }

    pub fn admin_create_user(
        &mut self,
        id: UserId,
        email: String,
        password: String,
        metadata: UserMetadata,
    ) -> Result<(), Error> {
        api::validate_string(&email)?;
        if self.users.values().any(|u| u.email == email) {
            return Err(Error::Rejected {
                code: Some(String::from("email_exists")),
                message: String::from("A user with this email address has already been registered"),
            });
        }
        match self.users.entry(id) {
            btree_map::Entry::Occupied(_) => Err(Error::Rejected {
                code: Some(String::from("user_already_exists")),
                message: format!("User {} already exists", id.0),
            }),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(MockUser {
                    email,
                    pass: password,
                    metadata,
                    sessions: HashSet::new(),
                });
                Ok(())
            }
        }
    }

    /// Inserts a row as-is, bypassing validation and id assignment
    pub fn admin_insert_comment(&mut self, c: Comment) {
        self.next_id = self.next_id.max(c.id.0 + 1);
        self.comments.push(c);
    }

    /// Logs in, returning an access token
    pub fn auth(&mut self, email: &str, password: &str) -> Result<Uuid, Error> {
        for u in self.users.values_mut() {
            if u.email == email {
                if u.pass != password {
                    return Err(Error::PermissionDenied);
                }
                let tok = Uuid::new_v4();
                u.sessions.insert(tok);
                return Ok(tok);
            }
        }
        Err(Error::PermissionDenied)
    }

    pub fn unauth(&mut self, tok: Uuid) -> Result<(), Error> {
        let u = self
            .users
            .values_mut()
            .find(|u| u.sessions.contains(&tok))
            .ok_or(Error::PermissionDenied)?;
        u.sessions.remove(&tok);
        Ok(())
    }

    pub fn whoami(&self, tok: Uuid) -> Result<AuthUser, Error> {
        self.users
            .iter()
            .find(|(_, u)| u.sessions.contains(&tok))
            .map(|(id, u)| AuthUser {
                id: *id,
                email: Some(u.email.clone()),
                user_metadata: u.metadata.clone(),
            })
            .ok_or(Error::PermissionDenied)
    }

    /// Comments of `post`, oldest first
    pub fn fetch_comments(&mut self, post: PostId) -> Vec<Comment> {
        self.fetches += 1;
        let mut res = self
            .comments
            .iter()
            .filter(|c| c.post_id == post)
            .cloned()
            .collect::<Vec<_>>();
        res.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        res
    }

    /// Inserts a comment on behalf of the session `tok`. Comments can only be written
    /// under the id of the logged-in user.
    pub fn create_comment(&mut self, tok: Option<Uuid>, c: NewComment) -> Result<CommentId, Error> {
        self.creates += 1;
        if let Some(err) = &self.reject_writes {
            return Err(err.clone());
        }
        let user = tok
            .map(|tok| self.whoami(tok))
            .transpose()?
            .ok_or(Error::PermissionDenied)?;
        if user.id != c.user_id {
            return Err(Error::PermissionDenied);
        }
        c.validate()?;
        let id = CommentId(self.next_id);
        self.next_id += 1;
        let created_at = self.clock.to_rfc3339();
        self.clock = self.clock + Duration::minutes(1);
        self.comments.push(Comment {
            id,
            post_id: c.post_id,
            parent_comment_id: c.parent_comment_id,
            content: c.content,
            user_id: Some(c.user_id),
            author: c.author,
            avatar_url: c.avatar_url,
            created_at,
        });
        Ok(id)
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

/// One client's connection to a shared `MockServer`, logged in if it has a token
#[derive(Clone)]
pub struct MockStore {
    server: Arc<Mutex<MockServer>>,
    token: Option<Uuid>,
}

impl MockStore {
    pub fn new(server: Arc<Mutex<MockServer>>, token: Option<Uuid>) -> MockStore {
        MockStore { server, token }
    }

    pub fn server(&self) -> &Arc<Mutex<MockServer>> {
        &self.server
    }
}

#[async_trait(?Send)]
impl CommentStore for MockStore {
    async fn fetch(&self, post: PostId) -> anyhow::Result<Vec<Comment>> {
        Ok(self.server.lock().fetch_comments(post))
    }

    async fn create(&self, comment: NewComment) -> Result<(), Error> {
        let id = self.server.lock().create_comment(self.token, comment)?;
        tracing::debug!(?id, "mock server stored comment");
        Ok(())
    }
}

impl ActorProvider for MockStore {
    fn current_actor(&self) -> Option<Actor> {
        let tok = self.token?;
        self.server.lock().whoami(tok).ok().map(Actor::from)
    }
}
