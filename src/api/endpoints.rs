use url::Url;

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBase { url: String, reason: String },
}

/// Backend endpoint table, rooted at `{base_url}/{route}`
#[derive(Debug, Clone)]
pub struct Endpoints {
    root: Url,
}

impl Endpoints {
    pub fn new(base_url: &str, route: &str) -> Result<Self, EndpointError> {
        let invalid = |reason: String| EndpointError::InvalidBase {
            url: base_url.to_string(),
            reason,
        };

        let mut root = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if root.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_string()));
        }
        root.set_query(None);
        root.set_fragment(None);
        if let Ok(mut segments) = root.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(route.split('/').filter(|s| !s.is_empty()));
        }

        Ok(Self { root })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, EndpointError> {
        Self::new(&config.api.base_url, &config.api.route)
    }

    /// Joins path segments (each percent-encoded) and appends query pairs
    pub fn url(&self, segments: &[&str], query: &[(&str, String)]) -> String {
        let mut url = self.root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url.to_string()
    }

    pub fn paged(&self, segments: &[&str], page: u32, limit: u32) -> String {
        self.url(
            segments,
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
    }

    // Auth

    pub fn login(&self) -> String {
        self.url(&["auth", "login"], &[])
    }

    pub fn verify_mobile(&self) -> String {
        self.url(&["auth", "verify-mobile"], &[])
    }

    pub fn resend_otp(&self) -> String {
        self.url(&["auth", "resend-mobile-otp"], &[])
    }

    pub fn logout(&self) -> String {
        self.url(&["auth", "logout"], &[])
    }

    pub fn refresh_token(&self) -> String {
        self.url(&["auth", "refresh-token"], &[])
    }

    // Dashboard

    pub fn user_data_counts(&self, user_id: &str) -> String {
        self.url(&["getUserDataCounts", user_id], &[])
    }

    pub fn next_nearest_event(&self) -> String {
        self.url(&["next-nearest-event"], &[])
    }

    pub fn notifications(&self, user_id: &str, page: u32, limit: u32) -> String {
        self.paged(&["getNotificationsById", user_id], page, limit)
    }

    pub fn profile_completion(&self, user_id: &str) -> String {
        self.url(&["getProfileCompletion", user_id], &[])
    }

    pub fn testimonials(&self, user_id: &str, page: u32, limit: u32) -> String {
        self.paged(&["getTestimonialByUserId", user_id], page, limit)
    }

    // Members

    pub fn inside_users(&self, page: u32, limit: u32) -> String {
        self.paged(&["get-inside-users"], page, limit)
    }

    pub fn outside_users(&self, page: u32, limit: u32) -> String {
        self.paged(&["get-outside-users"], page, limit)
    }
}
