pub const APP_NAME: &str = "Card Grading Scanner";
pub const APP_AUTHOR: &str = "SetScallywag";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

const USER_AGENT_NAME: &str = "card-grading-scanner";

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

/// User agent sent with every API request.
pub fn user_agent() -> String {
    format!("{}/{}", USER_AGENT_NAME, version_label().trim_start_matches(|ch| ch == 'v' || ch == 'V'))
}
