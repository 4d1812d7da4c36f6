pub mod columns;
pub mod filters;
pub mod forms;

use std::fmt;

/// A backend collection the console can browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Albums,
    Artists,
    Songs,
    Categories,
    Playlists,
    Users,
    Permissions,
}

impl Resource {
    /// Resources reachable from the sidebar, in display order.
    pub const BROWSABLE: [Resource; 6] = [
        Resource::Albums,
        Resource::Artists,
        Resource::Songs,
        Resource::Categories,
        Resource::Playlists,
        Resource::Users,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Resource::Albums => "albums",
            Resource::Artists => "artists",
            Resource::Songs => "songs",
            Resource::Categories => "categories",
            Resource::Playlists => "playlists",
            Resource::Users => "users",
            Resource::Permissions => "permissions",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Albums => "Albums",
            Resource::Artists => "Artists",
            Resource::Songs => "Songs",
            Resource::Categories => "Categories",
            Resource::Playlists => "Playlists",
            Resource::Users => "Users",
            Resource::Permissions => "Permissions",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Albums => "album",
            Resource::Artists => "artist",
            Resource::Songs => "song",
            Resource::Categories => "category",
            Resource::Playlists => "playlist",
            Resource::Users => "user",
            Resource::Permissions => "permission",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Reads the `_id` of a backend document.
pub fn record_id(record: &serde_json::Value) -> Option<&str> {
    record.get("_id").and_then(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_backend_collections() {
        assert_eq!(Resource::Albums.path(), "albums");
        assert_eq!(Resource::Categories.to_string(), "categories");
        assert!(!Resource::BROWSABLE.contains(&Resource::Permissions));
    }

    #[test]
    fn record_id_reads_underscore_id() {
        let record = serde_json::json!({ "_id": "a1", "name": "A" });
        assert_eq!(record_id(&record), Some("a1"));
        assert_eq!(record_id(&serde_json::json!({ "id": 3 })), None);
    }
}
