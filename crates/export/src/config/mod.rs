//! Typed export settings.
//!
//! Settings arrive as flat key/value pairs, either from a [`SettingsFile`]
//! or from a host that already resolved them. Keys are matched ignoring
//! case, spaces, `_` and `-`, so `scpLogin`, `scp login` and `SCP_LOGIN` are
//! the same key. Manifest key overrides use the `json.` prefix, e.g.
//! `json.idName = Kennung`.

mod file;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use manifest::{FlagStyle, ManifestFieldNames, ManifestOptions, OVERRIDE_KEYS, TimestampSource};
use structure::DEFAULT_PAGE_ORDER_FIELD;
use transport::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_SSH_PORT, SshConfig};
use zeroize::Zeroizing;

pub use file::{SettingsFile, WILDCARD_SECTION};

use crate::ConfigError;

const JSON_PREFIX: &str = "json.";

/// Connection settings for SCP delivery.
#[derive(Clone)]
pub struct ScpSettings {
    /// Login name.
    pub login: String,
    /// Password, wiped from memory on drop.
    pub password: Zeroizing<String>,
    /// Remote host.
    pub hostname: String,
    /// Remote port.
    pub port: u16,
    /// Known hosts file; `None` means `~/.ssh/known_hosts`.
    pub known_hosts: Option<PathBuf>,
    /// Connection timeout.
    pub timeout: Duration,
}

impl Default for ScpSettings {
    fn default() -> Self {
        Self {
            login: String::new(),
            password: Zeroizing::new(String::new()),
            hostname: String::new(),
            port: DEFAULT_SSH_PORT,
            known_hosts: None,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl fmt::Debug for ScpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScpSettings")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("known_hosts", &self.known_hosts)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ScpSettings {
    /// Known hosts file to verify the server against.
    #[must_use]
    pub fn known_hosts_path(&self) -> Option<PathBuf> {
        self.known_hosts
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".ssh").join("known_hosts")))
    }

    /// Session parameters for the transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSettings`] naming `knownHosts` when no
    /// file is configured and no home directory is known.
    pub fn ssh_config(&self) -> Result<SshConfig, ConfigError> {
        let known_hosts = self.known_hosts_path().ok_or(ConfigError::MissingSettings {
            keys: vec!["knownHosts"],
        })?;
        let config = SshConfig::new(
            self.hostname.as_str(),
            self.login.as_str(),
            self.password.as_str(),
            known_hosts,
        );
        Ok(config.with_port(self.port).with_timeout(self.timeout))
    }
}

/// Everything an export run needs to know.
#[derive(Clone, Debug)]
pub struct ExportSettings {
    /// Also write and deliver the JSON manifest.
    pub export_manifest: bool,
    /// Also prune and deliver the structural document.
    pub export_structure: bool,
    /// Deliver into a subfolder named after the source folder.
    pub create_subfolders: bool,
    /// Process property holding the selection.
    pub property_name: String,
    /// Alias of the image folder to export from.
    pub source_folder: String,
    /// Destination folder, before variable replacement.
    pub target_folder: String,
    /// Deliver over SCP instead of copying locally.
    pub use_scp: bool,
    /// SCP connection settings.
    pub scp: ScpSettings,
    /// Page metadata holding the page order.
    pub page_order_field: String,
    /// Manifest shape.
    pub manifest: ManifestOptions,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            export_manifest: false,
            export_structure: false,
            create_subfolders: false,
            property_name: String::new(),
            source_folder: String::new(),
            target_folder: String::new(),
            use_scp: false,
            scp: ScpSettings::default(),
            page_order_field: DEFAULT_PAGE_ORDER_FIELD.to_owned(),
            manifest: ManifestOptions::default(),
        }
    }
}

/// Lower-cases `key` and drops spaces, `_` and `-`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Ok(true),
        "no" | "false" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value, "a boolean (yes/no, true/false, on/off, 1/0)")),
    }
}

fn parse_flag_style(key: &str, value: &str) -> Result<FlagStyle, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, value, "'boolean' or 'token'"))
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        expected,
    }
}

impl ExportSettings {
    /// Builds settings from key/value pairs; later pairs override earlier
    /// ones and unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparsable booleans, numbers
    /// and timestamp sources, and [`ConfigError::FieldNames`] for
    /// contradictory manifest key overrides.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        let mut overrides: Vec<(&'static str, String)> = Vec::new();

        for (raw_key, raw_value) in pairs {
            let raw_key = raw_key.as_ref();
            let raw_value = raw_value.as_ref();
            let value = raw_value.trim();
            let key = normalize_key(raw_key);

            if let Some(field) = key.strip_prefix(JSON_PREFIX) {
                match OVERRIDE_KEYS
                    .iter()
                    .copied()
                    .find(|name| normalize_key(name) == field)
                {
                    Some(name) => {
                        overrides.retain(|(existing, _)| *existing != name);
                        overrides.push((name, value.to_owned()));
                    }
                    None => tracing::debug!(
                        target: "export::run",
                        key = raw_key,
                        "ignoring unknown manifest key"
                    ),
                }
                continue;
            }

            match key.as_str() {
                "exportjson" => settings.export_manifest = parse_bool(raw_key, value)?,
                "exportmetsfile" => settings.export_structure = parse_bool(raw_key, value)?,
                "createsubfolders" => settings.create_subfolders = parse_bool(raw_key, value)?,
                "propertyname" => settings.property_name = value.to_owned(),
                "sourcefolder" => settings.source_folder = value.to_owned(),
                "targetfolder" => settings.target_folder = value.to_owned(),
                "usescp" => settings.use_scp = parse_bool(raw_key, value)?,
                "knownhosts" => {
                    settings.scp.known_hosts = (!value.is_empty()).then(|| PathBuf::from(value));
                }
                "scplogin" => settings.scp.login = value.to_owned(),
                "scppassword" => settings.scp.password = Zeroizing::new(raw_value.to_owned()),
                "scphostname" => settings.scp.hostname = value.to_owned(),
                "scpport" => {
                    settings.scp.port = value
                        .parse()
                        .map_err(|_| invalid(raw_key, value, "a port number"))?;
                }
                "scptimeout" => {
                    let seconds: u64 = value
                        .parse()
                        .map_err(|_| invalid(raw_key, value, "a number of seconds"))?;
                    settings.scp.timeout = Duration::from_secs(seconds);
                }
                "collectionid" => {
                    settings.manifest.collection_id = value
                        .parse()
                        .map_err(|_| invalid(raw_key, value, "an integer"))?;
                }
                "pageorderfield" => settings.page_order_field = value.to_owned(),
                "creationdatesource" => {
                    settings.manifest.timestamp_source = value
                        .parse::<TimestampSource>()
                        .map_err(|_| invalid(raw_key, value, "'created' or 'modified'"))?;
                }
                "yestoken" => settings.manifest.tokens.yes = value.to_owned(),
                "notoken" => settings.manifest.tokens.no = value.to_owned(),
                "symbolimagestyle" => {
                    settings.manifest.flag_styles.symbol = parse_flag_style(raw_key, value)?;
                }
                "copyrightbdastyle" => {
                    settings.manifest.flag_styles.copyright = parse_flag_style(raw_key, value)?;
                }
                "publishablestyle" => {
                    settings.manifest.flag_styles.publishable = parse_flag_style(raw_key, value)?;
                }
                _ => tracing::debug!(
                    target: "export::run",
                    key = raw_key,
                    "ignoring unknown setting"
                ),
            }
        }

        settings.manifest.fields =
            ManifestFieldNames::from_overrides(overrides).map_err(ConfigError::FieldNames)?;
        if settings.page_order_field.is_empty() {
            settings.page_order_field = DEFAULT_PAGE_ORDER_FIELD.to_owned();
        }
        Ok(settings)
    }

    /// Checks that every required setting is present.
    ///
    /// # Errors
    ///
    /// Returns one [`ConfigError::MissingSettings`] listing every blank
    /// required key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut keys = Vec::new();
        for (key, value) in [
            ("propertyName", &self.property_name),
            ("sourceFolder", &self.source_folder),
            ("targetFolder", &self.target_folder),
        ] {
            if value.trim().is_empty() {
                keys.push(key);
            }
        }
        if self.use_scp {
            for (key, value) in [
                ("scpLogin", self.scp.login.as_str()),
                ("scpPassword", self.scp.password.as_str()),
                ("scpHostname", self.scp.hostname.as_str()),
            ] {
                if value.trim().is_empty() {
                    keys.push(key);
                }
            }
        }
        if keys.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingSettings { keys })
        }
    }
}
