//! Deep-link URL template.

use crate::config::RedirectConfig;

pub const DEFAULT_BASE_URL: &str = "https://tiktok.ligamx.link";
pub const DEFAULT_DEEP_LINK_PATH: &str = "/app/Apps/TikTok/UI/MatchResults-Level_Detail";
pub const DEFAULT_APPLICATION_ID: u32 = 20;
pub const DEFAULT_TIKTOK_MODE: u32 = 0;

/// Identifiers captured from a short match URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkIds {
    pub match_id: String,
    pub contest_id: String,
    pub group_id: String,
}

/// Fixed target of the redirect; only the captured ids vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkTemplate {
    pub base_url: String,
    pub path: String,
    pub application_id: u32,
    pub tiktok_mode: u32,
}

impl DeepLinkTemplate {
    pub fn from_config(config: &RedirectConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            path: config.path.clone(),
            application_id: config.application_id,
            tiktok_mode: config.tiktok_mode,
        }
    }

    /// Parameters are `;`-separated path parameters, not a query string.
    pub fn render(&self, ids: &DeepLinkIds) -> String {
        format!(
            "{}{};applicationid={};contestid={};usergroupid={};matchid={};tiktokmode={}",
            self.base_url,
            self.path,
            self.application_id,
            ids.contest_id,
            ids.group_id,
            ids.match_id,
            self.tiktok_mode,
        )
    }
}

impl Default for DeepLinkTemplate {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            path: DEFAULT_DEEP_LINK_PATH.to_owned(),
            application_id: DEFAULT_APPLICATION_ID,
            tiktok_mode: DEFAULT_TIKTOK_MODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_custom_base() {
        let config = RedirectConfig {
            base_url: "https://links.example.com/".into(),
            application_id: 7,
            ..RedirectConfig::default()
        };
        let template = DeepLinkTemplate::from_config(&config);
        let url = template.render(&DeepLinkIds {
            match_id: "3".into(),
            contest_id: "2".into(),
            group_id: "1".into(),
        });
        assert_eq!(
            url,
            "https://links.example.com/app/Apps/TikTok/UI/MatchResults-Level_Detail;applicationid=7;contestid=2;usergroupid=1;matchid=3;tiktokmode=0"
        );
    }
}
