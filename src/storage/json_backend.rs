use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::errors::{PlanError, Result};

use super::{
    paths::{ensure_dir, PathResolver},
    Profile, ProfileStore,
};

const PROFILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Profiles stored as pretty JSON files under the data root.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    profiles_dir: PathBuf,
    backups_dir: PathBuf,
    state_file: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let profiles_dir = PathResolver::profile_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&profiles_dir)?;
        ensure_dir(&backups_dir)?;
        let state_file = PathResolver::state_file_in(&app_root);
        Ok(Self {
            root: app_root,
            profiles_dir,
            backups_dir,
            state_file,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir
            .join(format!("{}.{}", canonical_name(name), PROFILE_EXTENSION))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    pub fn last_profile(&self) -> Result<Option<String>> {
        Ok(self.read_state()?.last_profile)
    }

    pub fn record_last_profile(&self, name: Option<&str>) -> Result<()> {
        let mut state = self.read_state()?;
        state.last_profile = name.map(canonical_name);
        let data = serde_json::to_string_pretty(&state)?;
        write_atomic(&self.state_file, &data)
    }

    fn read_state(&self) -> Result<StoreState> {
        if self.state_file.exists() {
            let data = fs::read_to_string(&self.state_file)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(StoreState::default())
        }
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let backup_name = backup_file_name(&dir, name, Some("autosave"));
        fs::copy(path, dir.join(&backup_name))?;
        self.prune_backups(name)
    }

    /// Loads a stored profile, falling back to the default when its file is corrupt.
    pub fn load_or_default(&self, name: &str) -> Result<Profile> {
        let path = self.profile_path(name);
        if !path.exists() {
            return Err(PlanError::ProfileNotFound(name.to_string()));
        }
        load_profile_or_default(&path)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(name, entry);
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %err, "could not prune old backup");
            }
        }
        Ok(())
    }
}

impl ProfileStore for JsonStorage {
    fn save(&self, profile: &Profile, name: &str) -> Result<()> {
        let path = self.profile_path(name);
        self.backup_existing_file(name, &path)?;
        save_profile_to_path(profile, &path)?;
        debug!(profile = %canonical_name(name), path = %path.display(), "profile saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Profile> {
        let path = self.profile_path(name);
        if !path.exists() {
            return Err(PlanError::ProfileNotFound(name.to_string()));
        }
        load_profile_from_path(&path)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.profiles_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PROFILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PROFILE_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(file_name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_stamp(b)
                .cmp(&parse_backup_stamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn backup(&self, profile: &Profile, name: &str, note: Option<&str>) -> Result<String> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let backup_name = backup_file_name(&dir, name, note);
        let json = serde_json::to_string_pretty(profile)?;
        write_atomic(&dir.join(&backup_name), &json)?;
        self.prune_backups(name)?;
        Ok(backup_name)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Profile> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(PlanError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let profile = load_profile_from_path(&backup_path)?;
        save_profile_to_path(&profile, &self.profile_path(name))?;
        Ok(profile)
    }
}

pub fn save_profile_to_path(profile: &Profile, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads a profile file; unparseable contents fall back to [`Profile::default`].
///
/// A missing or unreadable file is still an error.
pub fn load_profile_or_default(path: &Path) -> Result<Profile> {
    let data = fs::read_to_string(path)?;
    match serde_json::from_str(&data) {
        Ok(profile) => Ok(profile),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "ignoring corrupt profile, using the default profile"
            );
            Ok(Profile::default())
        }
    }
}

pub fn load_profile_from_path(path: &Path) -> Result<Profile> {
    let data = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&data)?;
    Ok(profile)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    last_profile: Option<String>,
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "profile".into()
    } else {
        sanitized
    }
}

/// `<name>_<YYYYMMDD>_<HHMMSS>[-<seq>][_<note>].json`, with `seq` counting up
/// from 2 when the same second and note are already taken in `dir`.
fn backup_file_name(dir: &Path, name: &str, note: Option<&str>) -> String {
    let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let label = sanitize_backup_note(note);
    let mut seq = 1u32;
    loop {
        let mut stem = format!("{}_{}", canonical_name(name), timestamp);
        if seq > 1 {
            stem.push_str(&format!("-{seq}"));
        }
        if let Some(label) = &label {
            stem.push('_');
            stem.push_str(label);
        }
        let candidate = format!("{}.{}", stem, PROFILE_EXTENSION);
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        seq += 1;
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads the timestamp and sequence number back out of a backup file name.
fn parse_backup_stamp(name: &str) -> Option<(DateTime<Utc>, u32)> {
    let stem = name.strip_suffix(&format!(".{}", PROFILE_EXTENSION))?;
    let parts: Vec<&str> = stem.split('_').collect();
    parts.windows(2).find_map(|pair| {
        let (date_part, time_token) = (pair[0], pair[1]);
        let (time_part, seq) = match time_token.split_once('-') {
            Some((time, seq)) => (time, seq.parse().ok()?),
            None => (time_token, 1),
        };
        if !is_digits(date_part, 8) || !is_digits(time_part, 6) {
            return None;
        }
        NaiveDateTime::parse_from_str(&format!("{date_part}{time_part}"), "%Y%m%d%H%M%S")
            .ok()
            .map(|naive| (DateTime::from_naive_utc_and_offset(naive, Utc), seq))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
