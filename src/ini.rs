//! AWS shared-credentials file parsing (INI) and tilde expansion.
//!
//! Grounded in the teacher's dependency on `rust-ini` (listed in its workspace manifest for
//! exactly this purpose) rather than a hand-rolled line scanner.

use crate::error::{CredentialError, Result};
use ini::Ini;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A parsed credentials file: profile name -> (field name -> value).
pub type ProfileMap = HashMap<String, HashMap<String, String>>;

/// Recognized field names within a profile section (spec §3).
pub mod fields {
    pub const ACCESS_KEY_ID: &str = "aws_access_key_id";
    pub const SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
    pub const SESSION_TOKEN: &str = "aws_session_token";
}

/// Parse an AWS shared-credentials file.
///
/// - `[name]` opens a section.
/// - `key = value` (whitespace around `=` ignored) sets a field within the current section.
/// - Blank lines and lines starting with `#` or `;` are comments.
/// - Any other line is a syntax error.
/// - Section order is irrelevant; a later duplicate key overwrites an earlier one.
pub fn parse(bytes: &[u8]) -> Result<ProfileMap> {
    let text = String::from_utf8_lossy(bytes);
    let conf = Ini::load_from_str(&text)
        .map_err(|e| CredentialError::InvalidCredentialFileSyntax(e.to_string()))?;

    let mut profiles = ProfileMap::new();
    for (section, props) in &conf {
        let Some(section) = section else {
            // Properties set before any `[section]` header have no home in the profile model.
            continue;
        };
        let entry = profiles.entry(section.to_string()).or_default();
        for (key, value) in props.iter() {
            entry.insert(key.to_string(), value.to_string());
        }
    }
    Ok(profiles)
}

/// Look up a single profile's access key id, secret access key, and optional session token.
pub fn lookup_profile<'a>(
    profiles: &'a ProfileMap,
    name: &str,
) -> Result<(&'a str, &'a str, Option<&'a str>)> {
    let profile = profiles
        .get(name)
        .ok_or_else(|| CredentialError::MissingProfile(name.to_string()))?;

    let access_key_id = profile
        .get(fields::ACCESS_KEY_ID)
        .map(String::as_str)
        .ok_or(CredentialError::MissingAccessKeyId)?;
    let secret_access_key = profile
        .get(fields::SECRET_ACCESS_KEY)
        .map(String::as_str)
        .ok_or(CredentialError::MissingSecretAccessKey)?;
    let session_token = profile.get(fields::SESSION_TOKEN).map(String::as_str);

    Ok((access_key_id, secret_access_key, session_token))
}

/// Expand a leading `~/` to the current user's home directory (POSIX convention). Paths not
/// starting with `~` are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| Path::new(path).to_path_buf()),
        None => Path::new(path).to_path_buf(),
    }
}
