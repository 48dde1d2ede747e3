//! Shared types used across the domain resources

use serde::{Deserialize, Deserializer, Serialize};

/// Which side of a record the current user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Given,
    Received,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Given => "given",
            Direction::Received => "received",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records whose direction is derived from their giver/receiver fields
pub trait Directed {
    fn direction_for(&self, user_id: &str) -> Option<Direction>;
}

/// Member summary as populated by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, rename = "profilePic", skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A member reference that is either a bare id or a populated summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberLink {
    Id(String),
    Member(MemberSummary),
}

impl MemberLink {
    pub fn id(&self) -> &str {
        match self {
            MemberLink::Id(id) => id,
            MemberLink::Member(member) => &member.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            MemberLink::Id(_) => None,
            MemberLink::Member(member) => Some(member.name.as_str()).filter(|n| !n.is_empty()),
        }
    }

    /// Name when populated, otherwise the id
    pub fn display(&self) -> &str {
        self.name().unwrap_or_else(|| self.id())
    }

    pub fn is(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.id() == user_id
    }
}

impl Default for MemberLink {
    fn default() -> Self {
        MemberLink::Id(String::new())
    }
}

/// Field deserializer that reads JSON `null` as `T::default()`
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// True when an optional reference points at `user_id`
pub fn links_to(link: Option<&MemberLink>, user_id: &str) -> bool {
    link.is_some_and(|l| l.is(user_id))
}

/// Display text for an optional reference; a deleted member shows as `-`
pub fn link_display(link: Option<&MemberLink>) -> &str {
    link.map_or("-", MemberLink::display)
}

/// `★★★☆☆` for a 1-5 rating
pub fn rating_stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Absolute image URL, or the default avatar when the record has none
pub fn image_url(prefix: &str, path: Option<&str>) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{}{}", prefix, path),
        None => "/assets/default-avatar.png".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_member_link_accepts_id_or_populated_member() {
        let id: MemberLink = serde_json::from_value(json!("u1")).unwrap();
        let member: MemberLink =
            serde_json::from_value(json!({ "_id": "u2", "name": "Asha", "profilePic": "p.png" })).unwrap();
        assert_eq!(id.id(), "u1");
        assert_eq!(id.display(), "u1");
        assert_eq!(member.id(), "u2");
        assert_eq!(member.display(), "Asha");
        assert!(member.is("u2"));
        assert!(!MemberLink::default().is(""));
    }

    #[test]
    fn test_null_member_fields_and_missing_links() {
        let member: MemberLink = serde_json::from_value(json!({ "_id": "u3", "name": null })).unwrap();
        assert_eq!(member.display(), "u3");
        assert_eq!(link_display(None), "-");
        assert!(!links_to(None, "u3"));
        assert!(links_to(Some(&member), "u3"));
    }

    #[test]
    fn test_rating_stars() {
        assert_eq!(rating_stars(3), "★★★☆☆");
        assert_eq!(rating_stars(9), "★★★★★");
        assert_eq!(rating_stars(0), "☆☆☆☆☆");
    }

    #[test]
    fn test_image_url_falls_back_to_default_avatar() {
        assert_eq!(image_url("http://img/", Some("a.png")), "http://img/a.png");
        assert_eq!(image_url("http://img/", Some("")), "/assets/default-avatar.png");
        assert_eq!(image_url("http://img/", None), "/assets/default-avatar.png");
    }
}
