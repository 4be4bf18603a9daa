//! Wire shapes exchanged with the registry.
//!
//! Every response body is decoded into one of these types on receipt; a body that does
//! not fit surfaces as [`ModpkgError::MalformedResponse`](crate::error::ModpkgError)
//! instead of leaking missing fields further down.

use crate::error::{ModpkgError, ModpkgResult};
use serde::{Deserialize, Deserializer, Serialize};

/// One published, immutable build of a mod.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub id: String,
    pub version_number: String,
    pub filesize: u64,
    pub download_url: String,
    pub mod_id: String,
    pub game_version: String,
    pub mod_loader: String,
    /// Raw comma-joined `name:version` tokens; `null` or absent reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependencies: String,
}

/// The part of a mod listing the resolver needs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ModRecord {
    pub id: String,
    pub slug: String,
}

/// Status envelope the registry wraps around mutating responses.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiMessage {
    /// An `error` envelope becomes a [`ModpkgError::RegistryResponse`] even though the
    /// HTTP status was a success.
    pub fn into_result(self, url: &str) -> ModpkgResult<ApiMessage> {
        match self.kind {
            MessageKind::Success => Ok(self),
            MessageKind::Error => Err(ModpkgError::RegistryResponse {
                url: url.to_string(),
                status: 200,
                message: self.message,
            }),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

/// Body of `POST /api/mods`.
#[derive(Serialize, Debug, Clone)]
pub struct NewMod {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub game: Option<String>,
    pub readme: String,
}

#[derive(Serialize)]
pub(crate) struct SignIn<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
