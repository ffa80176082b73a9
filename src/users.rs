use serde::Deserialize;

use crate::filter::FilterKind;

/// A single entry of the user directory as delivered by the endpoint.
/// Only `username`, `email` and `phone` are shown; everything else is carried along.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    pub username: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub company: Option<Company>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    #[serde(default)]
    pub geo: Option<Geo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(rename = "catchPhrase", default)]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: String,
}

impl UserRecord {
    #[cfg(test)]
    pub fn new(username: &str, email: &str, phone: &str) -> Self {
        Self {
            id: None,
            name: None,
            username: username.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            website: None,
            address: None,
            company: None,
        }
    }

    pub fn value(&self, column: ColumnId) -> &str {
        match column {
            ColumnId::Username => &self.username,
            ColumnId::Email => &self.email,
            ColumnId::Phone => &self.phone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnId {
    Username,
    Email,
    Phone,
}

/// Column order of the rendered table.
pub const COLUMNS: [ColumnId; 3] = [ColumnId::Username, ColumnId::Email, ColumnId::Phone];

impl ColumnId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Username => "username",
            ColumnId::Email => "email",
            ColumnId::Phone => "phone",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnId::Username => "Username",
            ColumnId::Email => "Email",
            ColumnId::Phone => "Phone",
        }
    }

    // Selected per column, never detected from the values.
    pub fn filter_kind(&self) -> FilterKind {
        match self {
            ColumnId::Username | ColumnId::Email => FilterKind::Contains,
            ColumnId::Phone => FilterKind::DateOrNumberEquals,
        }
    }

    /// 0-based position in `COLUMNS`.
    pub fn from_position(pos: usize) -> Option<Self> {
        COLUMNS.get(pos).copied()
    }
}
