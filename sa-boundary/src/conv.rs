use super::*;
use sa_entities as e;

/// Twitter avatars are served in several sizes that only
/// differ in a suffix of the file name.
const TWITTER_AVATAR_SIZES: [&str; 3] = ["_normal", "_mini", "_bigger"];

fn twitter_avatar_url(url: &str) -> String {
    let Some(dot) = url.rfind('.') else {
        return url.to_string();
    };
    let (path, ext) = url.split_at(dot);
    let path = TWITTER_AVATAR_SIZES
        .iter()
        .find_map(|size| path.strip_suffix(size))
        .unwrap_or(path);
    format!("{path}_bigger{ext}")
}

fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

/// Display name and avatar as provided by a social
/// authentication provider.
fn profile(social_auth: &e::user::SocialAuth) -> (Option<String>, Option<String>) {
    let info = &social_auth.extra_data;
    match social_auth.provider.as_str() {
        "twitter" => (
            string_at(info, "/name"),
            string_at(info, "/profile_image_url").map(|url| twitter_avatar_url(&url)),
        ),
        "facebook" => (
            string_at(info, "/name"),
            string_at(info, "/picture/data/url"),
        ),
        "shareabouts" => (
            string_at(info, "/full_name"),
            string_at(info, "/avatar_url"),
        ),
        _ => (None, None),
    }
}

impl From<&e::user::User> for User {
    fn from(from: &e::user::User) -> Self {
        let (name, avatar_url) = from.social_auth.as_ref().map(profile).unwrap_or_default();
        Self {
            id: from.id.to_string(),
            username: from.username.clone(),
            name,
            avatar_url,
        }
    }
}

impl From<&e::attachment::Attachment> for Attachment {
    fn from(from: &e::attachment::Attachment) -> Self {
        Self {
            name: from.name.clone(),
            file: from.file.clone(),
            created_datetime: from.created_at.to_rfc3339(),
            updated_datetime: from.updated_at.to_rfc3339(),
        }
    }
}

impl From<&e::api_key::ApiKey> for ApiKey {
    fn from(from: &e::api_key::ApiKey) -> Self {
        Self {
            key: from.key.clone(),
            dataset: from.dataset_id.to_string(),
            logged_ip: from.logged_ip.map(|ip| ip.to_string()),
            last_used: from.last_used.to_rfc3339(),
        }
    }
}
