//! A user-profile codec and the checking logic behind the
//! `profile-check` binary.
//!
//! The profile exercises most of the codec toolbox in one shape:
//!
//! ```json
//! {
//!   "name": "Ada",
//!   "email": "ada@example.com",
//!   "age": 36,
//!   "roles": ["admin", "editor"],
//!   "links": {"github": "https://github.com/ada"},
//!   "theme": null,
//!   "home": [51.5, -0.12],
//!   "joined": "2024-05-01T12:30:00.000Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use verity::prelude::*;

// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub age: Option<f64>,
    pub roles: NonEmptyList<Role>,
    pub links: Vec<(String, String)>,
    /// `None` means "follow the system setting".
    pub theme: Option<Value>,
    /// Latitude and longitude.
    pub home: Option<(f64, f64)>,
    pub joined: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Codecs
// ---------------------------------------------------------------------------

pub fn role() -> Codec<Role> {
    enumeration([
        (Role::Admin, "admin"),
        (Role::Editor, "editor"),
        (Role::Viewer, "viewer"),
    ])
}

/// The profile as a record, before it is turned into a [`Profile`].
pub fn profile_record() -> Codec<Record> {
    Codec::interface(
        Properties::new()
            .property("name", string())
            .property("email", string())
            .property("age", optional(number()))
            .property("roles", non_empty_list(role()))
            .property("links", record(string(), string()))
            .property("theme", nullable(exactly(["light", "dark"])))
            .property("home", maybe(tuple((number(), number()))))
            .property("joined", date()),
    )
}

pub fn profile() -> Codec<Profile> {
    profile_record().transform(
        |record| {
            Ok(Profile {
                name: record.field("name")?,
                email: record.field("email")?,
                age: record.optional_field("age")?,
                roles: record.field("roles")?,
                links: record.field("links")?,
                theme: record.field("theme")?,
                home: record.optional_field("home")?,
                joined: record.field("joined")?,
            })
        },
        |profile: &Profile| {
            let mut record = Record::new()
                .with("name", profile.name.clone())
                .with("email", profile.email.clone())
                .with("roles", profile.roles.clone())
                .with("links", profile.links.clone())
                .with("theme", profile.theme.clone())
                .with("joined", profile.joined);
            if profile.age.is_some() {
                record.insert("age", profile.age);
            }
            if profile.home.is_some() {
                record.insert("home", profile.home);
            }
            record
        },
    )
}

// ---------------------------------------------------------------------------
// Checking
// ---------------------------------------------------------------------------

/// What the binary prints for one input document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub valid: bool,
    /// The profile re-encoded in normalised form, when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
    /// The rendered error message, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The same failure as a tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DecodeError>,
}

/// Decodes `text` as a profile.
///
/// Shape problems are part of the report. Only unparseable JSON is an
/// `Err`, since there is no document to report on.
pub fn check(text: &str) -> Result<Report, VerityError> {
    let codec = profile();
    match verity::decode_str(&codec, text) {
        Ok(profile) => {
            tracing::info!(name = %profile.name, roles = profile.roles.len(), "profile is valid");
            Ok(Report {
                valid: true,
                profile: Some(codec.encode(&profile)),
                message: None,
                error: None,
            })
        }
        Err(err @ VerityError::Json(_)) => Err(err),
        Err(err) => {
            tracing::info!(error = %err, "profile is invalid");
            Ok(Report {
                valid: false,
                profile: None,
                message: Some(err.to_string()),
                error: Some(err.to_decode_error()),
            })
        }
    }
}

/// The JSON-Schema of the profile document.
pub fn schema() -> Value {
    profile().schema().to_value()
}
