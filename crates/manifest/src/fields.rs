//! Output field names and flag tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::ManifestError;

/// Override keys accepted by [`ManifestFieldNames::from_overrides`].
pub const OVERRIDE_KEYS: [&str; 13] = [
    "images",
    "collectionId",
    "herisId",
    "idName",
    "title",
    "altText",
    "symbolImage",
    "mediaType",
    "creationDate",
    "copyRightBDA",
    "fileInformation",
    "publishable",
    "migratedInformation",
];

/// Keys written into the manifest.
///
/// Every name can be replaced; names left unset keep their default.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ManifestFieldNames {
    /// Key of the record array.
    pub images: String,
    /// Key of the collection identifier.
    #[serde(rename = "collectionId", alias = "herisId")]
    pub collection_id: String,
    /// Key of the record id.
    #[serde(rename = "idName")]
    pub id: String,
    /// Key of the title.
    pub title: String,
    /// Key of the alternative text.
    #[serde(rename = "altText")]
    pub alt_text: String,
    /// Key of the symbol-image flag.
    #[serde(rename = "symbolImage")]
    pub symbol: String,
    /// Key of the media type.
    #[serde(rename = "mediaType")]
    pub media_type: String,
    /// Key of the creation date.
    #[serde(rename = "creationDate")]
    pub creation_date: String,
    /// Key of the copyright flag.
    #[serde(rename = "copyRightBDA")]
    pub copyright: String,
    /// Key of the file information text.
    #[serde(rename = "fileInformation")]
    pub file_info: String,
    /// Key of the publishable flag.
    pub publishable: String,
    /// Key of the migrated information.
    #[serde(rename = "migratedInformation")]
    pub migrated_info: String,
}

impl Default for ManifestFieldNames {
    fn default() -> Self {
        Self {
            images: "images".to_owned(),
            collection_id: "HERIS-ID".to_owned(),
            id: "Id".to_owned(),
            title: "Titel".to_owned(),
            alt_text: "alt_text".to_owned(),
            symbol: "SymbolBild".to_owned(),
            media_type: "media_type".to_owned(),
            creation_date: "Aufnahmedatum".to_owned(),
            copyright: "Copyright BDA".to_owned(),
            file_info: "Dateiinformation".to_owned(),
            publishable: "publikationsfähig".to_owned(),
            migrated_info: "Migrierte Information".to_owned(),
        }
    }
}

impl ManifestFieldNames {
    /// Applies `overrides` on top of the defaults.
    ///
    /// Keys are those of [`OVERRIDE_KEYS`]; blank values are skipped and
    /// unrecognised keys ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::FieldNames`] when the same field is named
    /// twice, for example through both `collectionId` and `herisId`.
    pub fn from_overrides<I, K, V>(overrides: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut map = Map::new();
        for (key, value) in overrides {
            let value = value.as_ref().trim();
            if !value.is_empty() {
                map.insert(key.into(), Value::String(value.to_owned()));
            }
        }
        serde_json::from_value(Value::Object(map)).map_err(ManifestError::FieldNames)
    }
}

/// Strings rendered for the copyright and publishable flags.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlagTokens {
    /// Rendered for `true`.
    pub yes: String,
    /// Rendered for `false`.
    pub no: String,
}

impl Default for FlagTokens {
    fn default() -> Self {
        Self {
            yes: "ja".to_owned(),
            no: "nein".to_owned(),
        }
    }
}

impl FlagTokens {
    /// Token for `flag`.
    #[must_use]
    pub fn render(&self, flag: bool) -> &str {
        if flag { &self.yes } else { &self.no }
    }
}

/// How a boolean record flag is written.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FlagStyle {
    /// A JSON `true` or `false`.
    Boolean,
    /// The configured [`FlagTokens`] string.
    Token,
}

impl FlagStyle {
    /// Configuration token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Token => "token",
        }
    }
}

impl fmt::Display for FlagStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised [`FlagStyle`] token.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown flag style '{0}', expected 'boolean' or 'token'")]
pub struct ParseFlagStyleError(String);

impl FromStr for FlagStyle {
    type Err = ParseFlagStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(Self::Boolean),
            "token" | "tokens" => Ok(Self::Token),
            _ => Err(ParseFlagStyleError(s.to_owned())),
        }
    }
}

/// Per-flag [`FlagStyle`].
///
/// Defaults write the symbol flag as a boolean and the copyright and
/// publishable flags as tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FlagStyles {
    /// Style of the symbol image flag.
    pub symbol: FlagStyle,
    /// Style of the copyright flag.
    pub copyright: FlagStyle,
    /// Style of the publishable flag.
    pub publishable: FlagStyle,
}

impl Default for FlagStyles {
    fn default() -> Self {
        Self {
            symbol: FlagStyle::Boolean,
            copyright: FlagStyle::Token,
            publishable: FlagStyle::Token,
        }
    }
}

/// A flag ready for serialisation in its configured style.
pub(crate) struct RenderedFlag<'a> {
    pub(crate) flag: bool,
    pub(crate) style: FlagStyle,
    pub(crate) tokens: &'a FlagTokens,
}

impl Serialize for RenderedFlag<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.style {
            FlagStyle::Boolean => serializer.serialize_bool(self.flag),
            FlagStyle::Token => serializer.serialize_str(self.tokens.render(self.flag)),
        }
    }
}
