use serde_json::Value;

use super::Resource;
use crate::{
    form::{
        FieldKind::{self, Bool, Choice, Date, MultiChoice, Number, Text, Upload},
        FieldSpec, FormSchema, Payload,
        schema::unchanged,
        upload::UploadKind::{Audio, Image},
    },
    list::reference::ReferenceKey,
};

const fn req(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec::required(name, label, kind)
}

const fn opt(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec::optional(name, label, kind)
}

static ALBUM_FIELDS: [FieldSpec; 7] = [
    opt("imageURL", "Image", Upload(Image)),
    opt("bannerURL", "Banner", Upload(Image)),
    req("name", "Name", Text),
    opt("songList", "Songs", MultiChoice(ReferenceKey::Songs)),
    req("isActive", "Status", Bool),
    req("categoryId", "Category", Choice(ReferenceKey::Categories)),
    req("description", "Description", Text),
];

static ARTIST_FIELDS: [FieldSpec; 8] = [
    req("avatarURL", "Avatar", Upload(Image)),
    req("bannerURL", "Banner", Upload(Image)),
    req("fullName", "Name", Text),
    opt("gender", "Gender", Number),
    opt("categoryId", "Category", Choice(ReferenceKey::Categories)),
    opt("dateOfBirth", "Date of birth", Date),
    req("description", "Description", Text),
    req("isActive", "Status", Bool),
];

static SONG_FIELDS: [FieldSpec; 6] = [
    opt("imageURL", "Image", Upload(Image)).locked_when(is_listener_song),
    req("mediaURL", "Audio", Upload(Audio)).locked_when(is_catalog_import),
    req("name", "Name", Text).locked_when(is_catalog_import),
    req("artistIdList", "Artists", MultiChoice(ReferenceKey::Artists)).locked_when(is_catalog_import),
    req("categoryId", "Category", Choice(ReferenceKey::Categories)),
    req("isActive", "Status", Bool),
];

static CATEGORY_FIELDS: [FieldSpec; 4] = [
    req("bannerURL", "Banner", Upload(Image)),
    req("name", "Name", Text),
    req("isActive", "Status", Bool),
    req("description", "Description", Text),
];

static PLAYLIST_FIELDS: [FieldSpec; 6] = [
    opt("imageURL", "Image", Upload(Image)),
    req("name", "Name", Text),
    opt("description", "Description", Text),
    opt("type", "Type", Number),
    opt("songList", "Songs", MultiChoice(ReferenceKey::Songs)),
    req("isActive", "Status", Bool),
];

static USER_FIELDS: [FieldSpec; 6] = [
    req("fullName", "Full name", Text),
    req("email", "Email", Text),
    req("role", "Role", Choice(ReferenceKey::Permissions)),
    opt("gender", "Gender", Number),
    opt("dateOfBirth", "Date of birth", Date),
    req("isActive", "Status", Bool),
];

static PERMISSION_FIELDS: [FieldSpec; 2] = [
    req("name", "Name", Text),
    req("code", "Code", Number),
];

static ALBUMS: FormSchema = FormSchema {
    resource: Resource::Albums,
    fields: &ALBUM_FIELDS,
    outbound: unchanged,
};

static ARTISTS: FormSchema = FormSchema {
    resource: Resource::Artists,
    fields: &ARTIST_FIELDS,
    outbound: unchanged,
};

static SONGS: FormSchema = FormSchema {
    resource: Resource::Songs,
    fields: &SONG_FIELDS,
    outbound: song_outbound,
};

static CATEGORIES: FormSchema = FormSchema {
    resource: Resource::Categories,
    fields: &CATEGORY_FIELDS,
    outbound: unchanged,
};

static PLAYLISTS: FormSchema = FormSchema {
    resource: Resource::Playlists,
    fields: &PLAYLIST_FIELDS,
    outbound: unchanged,
};

static USERS: FormSchema = FormSchema {
    resource: Resource::Users,
    fields: &USER_FIELDS,
    outbound: user_outbound,
};

static PERMISSIONS: FormSchema = FormSchema {
    resource: Resource::Permissions,
    fields: &PERMISSION_FIELDS,
    outbound: unchanged,
};

/// Songs of `type` 1 come from an external catalog; their audio, title and
/// artists follow the source.
fn is_catalog_import(record: &Value) -> bool {
    record.get("type").and_then(Value::as_i64) == Some(1)
}

/// Songs uploaded by a listener keep the listener's cover.
fn is_listener_song(record: &Value) -> bool {
    match record.get("userId") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(id)) => !id.is_empty(),
        Some(_) => true,
    }
}

/// The song form edits `artistIdList`; the backend stores `artistList`.
fn song_outbound(payload: &mut Payload) {
    if let Some(artists) = payload.remove("artistIdList") {
        payload.insert("artistList".to_string(), artists);
    }
}

/// Roles are permission codes, picked as text but stored as numbers.
fn user_outbound(payload: &mut Payload) {
    if let Some(role) = payload.get_mut("role") {
        if let Some(code) = role.as_str().and_then(|s| s.parse::<i64>().ok()) {
            *role = code.into();
        }
    }
}

impl Resource {
    pub fn form_schema(&self) -> &'static FormSchema {
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
