use crate::STUB_UUID;

use uuid::Uuid;

pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn stub() -> UserId {
        UserId(STUB_UUID)
    }
}

/// Free-form metadata attached to an account by the auth service
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// User record as returned by the auth service
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// The authenticated user, as shown next to the comments they write
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Actor {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<AuthUser> for Actor {
    fn from(u: AuthUser) -> Actor {
        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        let display_name = non_empty(u.user_metadata.user_name)
            .or_else(|| non_empty(u.user_metadata.full_name))
            .or_else(|| non_empty(u.email))
            .unwrap_or_else(|| String::from(ANONYMOUS_NAME));
        Actor {
            id: u.id,
            display_name,
            avatar_url: non_empty(u.user_metadata.avatar_url),
        }
    }
}
