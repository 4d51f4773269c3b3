pub mod url_utils;
pub mod user_agent_utils;
