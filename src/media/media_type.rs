//! Structured media types used for content negotiation and persistence.
//!
//! A [`WalkTrackMediaType`] extends a plain MIME type with a dotted structure
//! name and an integer version, e.g.
//! `application/json; structure=WalkTrack.Entry; version=1`. The canonical
//! string form is what goes into `Content-Type` / `Accept` headers and what
//! keys the transcoder registry.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::utils::errors::AppError;

#[derive(Debug, Clone, Eq)]
pub struct WalkTrackMediaType {
    mime_type: String,
    sub_type: String,
    structure: String,
    version: u32,
}

impl WalkTrackMediaType {
    pub fn builder() -> WalkTrackMediaTypeBuilder {
        WalkTrackMediaTypeBuilder::default()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn structure(&self) -> &str {
        &self.structure
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Lowercased canonical form. Equality, hashing and registry keys all go
    /// through this so that header casing never matters.
    pub fn canonical(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for WalkTrackMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}; structure={}; version={}",
            self.mime_type, self.sub_type, self.structure, self.version
        )
    }
}

impl PartialEq for WalkTrackMediaType {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Hash for WalkTrackMediaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl FromStr for WalkTrackMediaType {
    type Err = AppError;

    /// Parses the canonical form. Splits on `;`, the first segment on `/`
    /// (exactly two non-empty parts required), then reads `key=value`
    /// parameters. `structure` and `version` are recognized case-insensitively;
    /// unknown parameters are ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err(AppError::invalid_request("Media type must not be empty"));
        }

        let mut segments = value.split(';').map(str::trim);

        let mime_segment = segments.next().unwrap_or_default();
        let mime_parts: Vec<&str> = mime_segment.split('/').collect();
        let [mime_type, sub_type] = mime_parts.as_slice() else {
            return Err(AppError::invalid_request(format!(
                "Malformed media type '{mime_segment}'"
            )));
        };

        let mut structure = None;
        let mut version = 0u32;

        for segment in segments {
            if segment.is_empty() {
                continue;
            }
            let parts: Vec<&str> = segment.split('=').collect();
            let [key, param_value] = parts.as_slice() else {
                return Err(AppError::invalid_request(format!(
                    "Malformed media type parameter '{segment}'"
                )));
            };

            match key.trim().to_lowercase().as_str() {
                "structure" => structure = Some(param_value.trim().to_string()),
                "version" => {
                    version = param_value.trim().parse().map_err(|_| {
                        AppError::invalid_request(format!(
                            "Media type version '{param_value}' is not an integer"
                        ))
                    })?;
                }
                _ => {}
            }
        }

        WalkTrackMediaType::builder()
            .mime_type(*mime_type)
            .sub_type(*sub_type)
            .structure(structure.unwrap_or_default())
            .version(version)
            .build()
    }
}

#[derive(Debug, Default)]
pub struct WalkTrackMediaTypeBuilder {
    mime_type: String,
    sub_type: String,
    structure: String,
    version: u32,
}

impl WalkTrackMediaTypeBuilder {
    pub fn mime_type(mut self, value: impl Into<String>) -> Self {
        self.mime_type = value.into();
        self
    }

    pub fn sub_type(mut self, value: impl Into<String>) -> Self {
        self.sub_type = value.into();
        self
    }

    pub fn structure(mut self, value: impl Into<String>) -> Self {
        self.structure = value.into();
        self
    }

    pub fn version(mut self, value: u32) -> Self {
        self.version = value;
        self
    }

    pub fn build(self) -> Result<WalkTrackMediaType, AppError> {
        if self.mime_type.trim().is_empty() {
            return Err(AppError::invalid_request("Media type must have a type"));
        }
        if self.sub_type.trim().is_empty() {
            return Err(AppError::invalid_request("Media type must have a subtype"));
        }
        if self.structure.trim().is_empty() {
            return Err(AppError::invalid_request(
                "Media type must have a structure",
            ));
        }

        Ok(WalkTrackMediaType {
            mime_type: self.mime_type,
            sub_type: self.sub_type,
            structure: self.structure,
            version: self.version,
        })
    }
}

/// Shorthand for the `application/json; structure=...; version=N` family that
/// every built-in transcoder uses.
pub fn json_media_type(structure: &str, version: u32) -> WalkTrackMediaType {
    WalkTrackMediaType {
        mime_type: "application".to_string(),
        sub_type: "json".to_string(),
        structure: structure.to_string(),
        version,
    }
}
