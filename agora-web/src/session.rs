use agora_client::{api::PostId, RestConfig};
use gloo_storage::{LocalStorage, Storage};

/// Written by the login flow, which lives outside of this app
pub const KEY_SESSION: &str = "agora-session";

pub fn load() -> Option<RestConfig> {
    match LocalStorage::get(KEY_SESSION) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(?e, "no usable session in local storage");
            None
        }
    }
}

/// The post whose comments are displayed, from the `?post=N` query
pub fn post_from_location() -> Option<PostId> {
    let search = web_sys::window()?.location().search().ok()?;
    parse_post_query(&search)
}

fn parse_post_query(search: &str) -> Option<PostId> {
    search
        .trim_start_matches('?')
        .split('&')
        .find_map(|kv| kv.strip_prefix("post="))
        .and_then(|v| v.parse().ok())
}
