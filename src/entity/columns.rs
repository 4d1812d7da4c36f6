use serde_json::Value;

use super::Resource;
use crate::util::date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Plain,
    Date,
    Status,
}

/// One table column: a path into the row document and how to show it.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub title: &'static str,
    pub path: &'static [&'static str],
    pub width: u16,
    pub format: CellFormat,
}

const fn col(title: &'static str, path: &'static [&'static str], width: u16, format: CellFormat) -> Column {
    Column {
        title,
        path,
        width,
        format,
    }
}

const NAME: Column = col("Name", &["name"], 30, CellFormat::Plain);
const CATEGORY: Column = col("Category", &["category", "name"], 18, CellFormat::Plain);
const VIEWS: Column = col("Plays", &["view"], 8, CellFormat::Plain);
const CREATED: Column = col("Created", &["createdAt"], 12, CellFormat::Date);
const STATUS: Column = col("Status", &["isActive"], 10, CellFormat::Status);

static ALBUMS: [Column; 5] = [
    NAME,
    col("Artist", &["artist", "fullName"], 20, CellFormat::Plain),
    CATEGORY,
    VIEWS,
    STATUS,
];

static ARTISTS: [Column; 5] = [
    col("Name", &["fullName"], 30, CellFormat::Plain),
    CATEGORY,
    col("Born", &["dateOfBirth"], 12, CellFormat::Date),
    CREATED,
    STATUS,
];

static SONGS: [Column; 6] = [
    NAME,
    CATEGORY,
    col("Created by", &["user", "fullName"], 18, CellFormat::Plain),
    VIEWS,
    CREATED,
    STATUS,
];

static CATEGORIES: [Column; 4] = [
    NAME,
    col("Description", &["description"], 40, CellFormat::Plain),
    CREATED,
    STATUS,
];

static PLAYLISTS: [Column; 5] = [
    NAME,
    col("Owner", &["user", "fullName"], 18, CellFormat::Plain),
    col("Type", &["type"], 6, CellFormat::Plain),
    CREATED,
    STATUS,
];

static USERS: [Column; 6] = [
    col("Full name", &["fullName"], 24, CellFormat::Plain),
    col("Email", &["email"], 28, CellFormat::Plain),
    col("Role", &["role"], 6, CellFormat::Plain),
    col("Born", &["dateOfBirth"], 12, CellFormat::Date),
    CREATED,
    STATUS,
];

static PERMISSIONS: [Column; 2] = [
    NAME,
    col("Code", &["code"], 6, CellFormat::Plain),
];

impl Resource {
    pub fn columns(&self) -> &'static [Column] {
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

impl Column {
    pub fn cell(&self, row: &Value) -> String {
        let value = self
            .path
            .iter()
            .try_fold(row, |current, key| current.get(key));

        match (self.format, value) {
            (_, None | Some(Value::Null)) => String::new(),
            (CellFormat::Status, Some(Value::Bool(true))) => "Active".to_string(),
            (CellFormat::Status, Some(_)) => "Inactive".to_string(),
            (CellFormat::Date, Some(Value::String(raw))) => date::parse_instant(raw)
                .map(|d| date::display_date(&d))
                .unwrap_or_else(|| raw.clone()),
            (_, Some(Value::String(s))) => s.clone(),
            (_, Some(other)) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_paths_and_formats() {
        let row = json!({
            "name": "Blue",
            "category": { "name": "Jazz" },
            "view": 12,
            "createdAt": "2024-02-03T10:00:00Z",
            "isActive": false,
        });
        let cells: Vec<_> = Resource::Songs.columns().iter().map(|c| c.cell(&row)).collect();
        assert_eq!(cells, vec!["Blue", "Jazz", "", "12", "03/02/2024", "Inactive"]);
    }
}
