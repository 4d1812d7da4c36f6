use super::Resource;
use crate::query::{FilterKind, FilterSchema};

use FilterKind::{Bool, Date, Number, Text};

static ALBUMS: FilterSchema = FilterSchema::new(&[
    ("q", Text),
    ("isActive", Bool),
    ("categoryId", Text),
    ("created_from", Date),
    ("created_to", Date),
]);

static ARTISTS: FilterSchema = FilterSchema::new(&[
    ("q", Text),
    ("isActive", Bool),
    ("gender", Number),
    ("categoryId", Text),
    ("created_from", Date),
    ("created_to", Date),
]);

static SONGS: FilterSchema = FilterSchema::new(&[
    ("q", Text),
    ("isActive", Bool),
    ("type", Number),
    ("categoryId", Text),
    ("created_from", Date),
    ("created_to", Date),
]);

static CATEGORIES: FilterSchema = FilterSchema::new(&[
    ("q", Text),
    ("isActive", Bool),
    ("created_from", Date),
    ("created_to", Date),
]);

static PLAYLISTS: FilterSchema = FilterSchema::new(&[
    ("q", Text),
    ("isActive", Bool),
    ("type", Number),
    ("status", Number),
    ("created_from", Date),
    ("created_to", Date),
    ("used_from", Date),
    ("used_to", Date),
]);

static USERS: FilterSchema = FilterSchema::new(&[
    ("q", Text),
    ("role", Number),
    ("gender", Number),
    ("isActive", Bool),
    ("created_from", Date),
    ("created_to", Date),
    ("used_from", Date),
    ("used_to", Date),
]);

static PERMISSIONS: FilterSchema = FilterSchema::new(&[("q", Text)]);

impl Resource {
    pub fn filter_schema(&self) -> &'static FilterSchema {
        match self {
            Resource::Albums => &ALBUMS,
            Resource::Artists => &ARTISTS,
            Resource::Songs => &SONGS,
            Resource::Categories => &CATEGORIES,
            Resource::Playlists => &PLAYLISTS,
            Resource::Users => &USERS,
            Resource::Permissions => &PERMISSIONS,
        }
    }
}
