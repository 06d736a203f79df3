#![forbid(unsafe_code)]

//! The loader/merger: orchestrates a locale load from index to flag index.
//!
//! # Load pipeline
//!
//! 1. Parse the localization index if this is the first load (fatal on
//!    failure; everything else degrades).
//! 2. Reset the flag index, font overlay, and image store.
//! 3. Settle the working locale: probe the first data file and fall back
//!    to the closest existing locale when the probe misses.
//! 4. Load the flat file list, then the active file group, in declaration
//!    order. Each file is parsed per its declared kind and merged.
//! 5. With auditing on, every file gets a second pass against the default
//!    locale; entries seen only there are recorded as missing (and
//!    back-filled when repair is requested).
//!
//! Completion is an explicit state machine: every per-file pass consumes
//! one unit of `LoadState::Loading`, and the finished notification fires
//! exactly once when the count reaches zero.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Index missing/malformed | `init` returns an error |
//! | Data file missing/empty | Recorded as missing when auditing, else skipped |
//! | Data file unparsable | Skipped with a warning |
//! | Requested locale absent | Closest existing locale substituted |
//! | Unknown file group | Treated as empty, with a warning |

use std::collections::HashMap;

use crate::assets::{AssetSource, FsAssetSource};
use crate::error::{GlossaError, Result};
use crate::fontrules::{FontRule, parse_font_rules};
use crate::locale;
use crate::manifest::{FileEntry, FileKind, Manifest};
use crate::tabular::Table;

/// Load-completion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No load requested yet (or cleared).
    Idle,
    /// A load is consuming per-file passes; `remaining` counts the passes
    /// still owed (each file counts once per pass, twice when auditing).
    Loading { remaining: usize },
    /// The flag index is complete and safe to query.
    Complete,
}

/// Missing-data report produced by an audit pass.
///
/// Absent entirely (`None` from the accessors) when no audit ran or when
/// the audit found nothing, so callers can tell "not checked" from
/// "checked and clean".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingReport {
    /// Paths (or image ids) present in the default locale only.
    pub files: Vec<String>,
    /// Table id → flags present in the default locale only.
    pub flags: HashMap<String, Vec<String>>,
}

impl MissingReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.flags.is_empty()
    }
}

/// Options for [`Glossa::init`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Desired locale, e.g. `"en-US"`. Normalized before use; empty means
    /// the manifest's default locale.
    pub locale: String,
    /// File group to activate alongside the flat list.
    pub group: Option<String>,
    /// Audit against the default locale, recording gaps.
    pub check_missing: bool,
    /// Back-fill recorded gaps with default-locale values.
    pub replace_missing: bool,
    /// Base directory prepended to every data path.
    pub directory: String,
}

impl InitOptions {
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn check_missing(mut self, check: bool) -> Self {
        self.check_missing = check;
        self
    }

    #[must_use]
    pub fn replace_missing(mut self, replace: bool) -> Self {
        self.replace_missing = replace;
        self
    }

    #[must_use]
    pub fn directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    /// Merge into the flag index.
    Active,
    /// Compare against the default locale; record (and optionally repair)
    /// gaps instead of merging.
    Audit,
}

/// The localization engine.
///
/// Owns the parsed index, the merged flag index, and everything looked up
/// at runtime. Single-threaded by design: loads are synchronous, and the
/// flag index is replaced wholesale on every [`init`](Self::init) or
/// [`switch_file_group`](Self::switch_file_group).
pub struct Glossa {
    pub(crate) source: Box<dyn AssetSource>,
    pub(crate) manifest: Option<Manifest>,
    pub(crate) index: HashMap<String, HashMap<String, String>>,
    pub(crate) fonts: HashMap<String, FontRule>,
    pub(crate) images: HashMap<String, Vec<u8>>,
    pub(crate) icons: HashMap<String, Vec<u8>>,
    pub(crate) locale: String,
    pub(crate) group: Option<String>,
    pub(crate) directory: String,
    pub(crate) check_missing: bool,
    pub(crate) replace_missing: bool,
    pub(crate) missing: Option<MissingReport>,
    pub(crate) state: LoadState,
    pub(crate) on_finished: Option<Box<dyn FnMut()>>,
}

impl Glossa {
    #[must_use]
    pub fn new(source: Box<dyn AssetSource>) -> Self {
        Self {
            source,
            manifest: None,
            index: HashMap::new(),
            fonts: HashMap::new(),
            images: HashMap::new(),
            icons: HashMap::new(),
            locale: String::new(),
            group: None,
            directory: String::new(),
            check_missing: false,
            replace_missing: false,
            missing: None,
            state: LoadState::Idle,
            on_finished: None,
        }
    }

    /// Engine over a filesystem locale tree rooted at `root`.
    #[must_use]
    pub fn from_dir(root: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Box::new(FsAssetSource::new(root)))
    }

    /// Register the zero-argument load-finished notification. Fires exactly
    /// once per completed `init` or `switch_file_group`.
    pub fn on_load_finished(&mut self, callback: impl FnMut() + 'static) {
        self.on_finished = Some(Box::new(callback));
    }

    /// Initialize (or re-initialize) for a locale.
    ///
    /// The localization index is parsed on the first call and reused until
    /// a hard [`clear`](Self::clear); the flag index is rebuilt every call.
    pub fn init(&mut self, opts: InitOptions) -> Result<()> {
        if matches!(self.state, LoadState::Loading { .. }) {
            return Err(GlossaError::LoadInProgress);
        }

        self.directory = opts.directory;
        self.locale = locale::normalize(&opts.locale);

        let default_locale = match &self.manifest {
            Some(manifest) => manifest.default_locale.clone(),
            None => {
                let manifest = self.load_manifest()?;
                let default_locale = manifest.default_locale.clone();
                self.manifest = Some(manifest);
                self.load_icons();
                default_locale
            }
        };

        if self.locale.is_empty() {
            self.locale = default_locale.clone();
        }
        self.group = opts.group.filter(|g| !g.is_empty());

        // Auditing a locale against itself is meaningless.
        let audit = opts.check_missing && self.locale != default_locale;
        self.check_missing = audit;
        self.replace_missing = audit && opts.replace_missing;
        self.missing = audit.then(MissingReport::default);

        self.index.clear();
        self.fonts.clear();
        self.images.clear();

        self.resolve_locale();

        let plan = self.collect_plan(true, true);
        self.run_load(&plan, &default_locale)
    }

    /// Swap the active file group, reloading only the new group's files.
    ///
    /// Flat-list data (and anything the previous group merged) is retained;
    /// the audit buffers are re-armed when auditing was on.
    pub fn switch_file_group(&mut self, group: &str) -> Result<()> {
        if matches!(self.state, LoadState::Loading { .. }) {
            return Err(GlossaError::LoadInProgress);
        }
        let default_locale = self
            .manifest
            .as_ref()
            .map(|m| m.default_locale.clone())
            .ok_or(GlossaError::NotInitialized)?;

        if self.check_missing && self.missing.is_none() {
            self.missing = Some(MissingReport::default());
        }

        self.group = (!group.is_empty()).then(|| group.to_string());
        let plan = self.collect_plan(false, true);
        self.run_load(&plan, &default_locale)
    }

    /// Discard loaded data. A soft clear keeps the parsed index (locale
    /// list and icons included); a hard clear drops that too, restoring
    /// the pre-initialized state.
    pub fn clear(&mut self, hard: bool) {
        self.index.clear();
        self.fonts.clear();
        self.images.clear();
        self.missing = None;
        self.check_missing = false;
        self.replace_missing = false;
        self.group = None;
        self.state = LoadState::Idle;
        self.on_finished = None;
        if hard {
            self.manifest = None;
            self.icons.clear();
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Complete
    }

    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The working locale (after normalization and closest-match fallback).
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Locale codes declared by the index, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        self.manifest
            .as_ref()
            .map(Manifest::locale_codes)
            .unwrap_or_default()
    }

    /// The full missing-data report, when an audit ran and found gaps.
    #[must_use]
    pub fn missing_report(&self) -> Option<&MissingReport> {
        self.missing.as_ref()
    }

    /// Missing file paths, when an audit recorded any.
    #[must_use]
    pub fn missing_files(&self) -> Option<&[String]> {
        self.missing
            .as_ref()
            .filter(|r| !r.files.is_empty())
            .map(|r| r.files.as_slice())
    }

    /// Missing flags per table id, when an audit recorded any.
    #[must_use]
    pub fn missing_flags(&self) -> Option<&HashMap<String, Vec<String>>> {
        self.missing
            .as_ref()
            .filter(|r| !r.flags.is_empty())
            .map(|r| &r.flags)
    }

    /// Raw icon bytes for a declared locale.
    #[must_use]
    pub fn icon(&self, locale: &str) -> Option<&[u8]> {
        self.icons.get(locale).map(Vec::as_slice)
    }

    /// Raw bytes of a loaded per-locale image.
    #[must_use]
    pub fn image(&self, id: &str) -> Option<&[u8]> {
        self.images.get(id).map(Vec::as_slice)
    }

    // ── load pipeline ────────────────────────────────────────────────

    fn load_manifest(&mut self) -> Result<Manifest> {
        let path = self.data_path("index.xml");
        let raw = self
            .source
            .load_text(&path)
            .map_err(|source| GlossaError::ManifestLoad {
                path: path.clone(),
                source,
            })?;
        let manifest = Manifest::parse(&raw)?;
        tracing::debug!(
            files = manifest.files.len(),
            groups = manifest.groups.len(),
            locales = manifest.locales.len(),
            "localization index parsed"
        );
        Ok(manifest)
    }

    fn load_icons(&mut self) {
        let codes: Vec<String> = self
            .manifest
            .as_ref()
            .map(|m| m.locales.keys().cloned().collect())
            .unwrap_or_default();
        for code in codes {
            let path = self.data_path(&format!("_flags/{code}.png"));
            match self.source.load_image(&path) {
                Ok(bytes) => {
                    self.icons.insert(code, bytes);
                }
                Err(_) => tracing::debug!(locale = %code, "no icon for locale"),
            }
        }
    }

    /// Probe the working locale and degrade to the closest existing one
    /// when its data is absent.
    fn resolve_locale(&mut self) {
        let Some(probe) = self.collect_plan(true, true).into_iter().next() else {
            return;
        };
        let path = self.data_path(&format!("{}/{}", self.locale, probe.path));
        if matches!(self.source.load_text(&path), Ok(text) if !text.is_empty()) {
            return;
        }
        tracing::warn!(locale = %self.locale, "no data for locale, searching for closest match");
        let listing = self.source.list_directory(&self.data_path(""));
        let candidates = locale::candidate_locales(&listing);
        if let Some(best) =
            locale::closest_locale(&self.locale, candidates.iter().map(String::as_str))
        {
            tracing::info!(fallback = %best, "degrading to closest existing locale");
            self.locale = best;
        }
    }

    /// Files owed by the current configuration: the flat list, the active
    /// group, or both, in declaration order.
    fn collect_plan(&self, flat: bool, group: bool) -> Vec<FileEntry> {
        let Some(manifest) = &self.manifest else {
            return Vec::new();
        };
        let mut plan = Vec::new();
        if flat {
            plan.extend(manifest.files.iter().cloned());
        }
        if group {
            if let Some(name) = &self.group {
                match manifest.groups.get(name) {
                    Some(files) => plan.extend(files.iter().cloned()),
                    None => tracing::warn!(group = %name, "unknown file group"),
                }
            }
        }
        plan
    }

    fn run_load(&mut self, plan: &[FileEntry], default_locale: &str) -> Result<()> {
        let passes = if self.check_missing { 2 } else { 1 };
        let total = plan.len() * passes;
        self.state = LoadState::Loading { remaining: total };
        tracing::debug!(
            files = plan.len(),
            audit = self.check_missing,
            "starting locale load"
        );

        if total == 0 {
            self.finish_load();
            return Ok(());
        }

        for entry in plan {
            // Current-locale pass before the default-locale pass, per file,
            // so missing-flag detection sees the merged state.
            self.load_entry(entry, Pass::Active, default_locale);
            self.complete_pass();
            if self.check_missing {
                self.load_entry(entry, Pass::Audit, default_locale);
                self.complete_pass();
            }
        }
        Ok(())
    }

    fn load_entry(&mut self, entry: &FileEntry, pass: Pass, default_locale: &str) {
        let loc = match pass {
            Pass::Active => self.locale.clone(),
            Pass::Audit => default_locale.to_string(),
        };
        let rel = format!("{loc}/{}", entry.path);

        match entry.kind {
            FileKind::Tsv | FileKind::Csv => {
                let raw = match self.source.load_text(&self.data_path(&rel)) {
                    Ok(raw) if !raw.is_empty() => raw,
                    _ => {
                        tracing::debug!(file = %entry.path, locale = %loc, "data file missing or empty");
                        self.record_missing_file(&entry.path);
                        return;
                    }
                };
                let parsed = match entry.kind {
                    FileKind::Tsv => Ok(Table::parse_tsv(&raw)),
                    _ => Table::parse_csv(&raw, entry.delimiter.unwrap_or(',')),
                };
                match parsed {
                    Ok(table) => self.merge_table(&table, &entry.id, pass),
                    Err(error) => {
                        tracing::warn!(file = %entry.path, %error, "skipping unparsable data file");
                    }
                }
            }
            FileKind::RuleXml => {
                // Rule files carry no per-locale flags; nothing to audit.
                if pass == Pass::Audit {
                    return;
                }
                let raw = match self.source.load_text(&self.data_path(&rel)) {
                    Ok(raw) if !raw.is_empty() => raw,
                    _ => {
                        self.record_missing_file(&entry.path);
                        return;
                    }
                };
                if entry.id == "fonts" {
                    match parse_font_rules(&raw) {
                        Ok(rules) => self.fonts.extend(rules),
                        Err(error) => {
                            tracing::warn!(file = %entry.path, %error, "skipping unparsable rule file");
                        }
                    }
                } else {
                    tracing::debug!(id = %entry.id, "no handler for rule file");
                }
            }
            FileKind::Image => match self.source.load_image(&self.data_path(&rel)) {
                Ok(bytes) => self.store_image(&entry.id, bytes, pass),
                Err(_) => self.record_missing_file(&entry.id),
            },
        }
    }

    fn merge_table(&mut self, table: &Table, table_id: &str, pass: Pass) {
        // The table exists once its file was seen, even if every row is
        // rejected below.
        self.index.entry(table_id.to_string()).or_default();

        // The first field is the flag root; "comment" fields carry no data.
        let real_fields = 1 + table
            .fields
            .iter()
            .skip(1)
            .filter(|f| f.as_str() != "comment")
            .count();

        for row in &table.grid {
            let Some(flag_root) = row.first() else {
                continue;
            };
            if real_fields > 2 {
                // ("flag", "suffix1", "suffix2", ...) pattern: each data
                // field merges as flag_suffix.
                for (i, field) in table.fields.iter().enumerate().skip(1) {
                    if field == "comment" {
                        continue;
                    }
                    let Some(value) = row.get(i) else {
                        continue;
                    };
                    self.write_flag(table_id, format!("{flag_root}_{field}"), value, pass);
                }
            } else if real_fields == 2 {
                // Standard ("flag", "value") pattern.
                let Some(value) = row.get(1) else {
                    continue;
                };
                self.write_flag(table_id, flag_root.clone(), value, pass);
            }
        }
    }

    fn write_flag(&mut self, table_id: &str, flag: String, value: &str, pass: Pass) {
        let flag = flag.to_uppercase();
        match pass {
            Pass::Active => {
                self.index
                    .entry(table_id.to_string())
                    .or_default()
                    .insert(flag, value.to_string());
            }
            Pass::Audit => {
                let present = self
                    .index
                    .get(table_id)
                    .is_some_and(|t| t.contains_key(&flag));
                if !present {
                    self.record_missing_flag(table_id, &flag);
                    if self.replace_missing {
                        self.index
                            .entry(table_id.to_string())
                            .or_default()
                            .insert(flag, value.to_string());
                    }
                }
            }
        }
    }

    fn store_image(&mut self, id: &str, bytes: Vec<u8>, pass: Pass) {
        match pass {
            Pass::Active => {
                self.images.insert(id.to_string(), bytes);
            }
            Pass::Audit => {
                if !self.images.contains_key(id) {
                    self.record_missing_file(id);
                    if self.replace_missing {
                        self.images.insert(id.to_string(), bytes);
                    }
                }
            }
        }
    }

    fn record_missing_file(&mut self, name: &str) {
        if !self.check_missing {
            return;
        }
        if let Some(report) = self.missing.as_mut() {
            if !report.files.iter().any(|f| f == name) {
                report.files.push(name.to_string());
            }
        }
    }

    fn record_missing_flag(&mut self, table_id: &str, flag: &str) {
        if let Some(report) = self.missing.as_mut() {
            let flags = report.flags.entry(table_id.to_string()).or_default();
            if !flags.iter().any(|f| f == flag) {
                flags.push(flag.to_string());
            }
        }
    }

    fn complete_pass(&mut self) {
        if let LoadState::Loading { remaining } = &mut self.state {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.finish_load();
            }
        }
    }

    fn finish_load(&mut self) {
        self.state = LoadState::Complete;
        // "Nothing missing" reports as absent, not empty.
        if self.missing.as_ref().is_some_and(MissingReport::is_empty) {
            self.missing = None;
        }
        tracing::info!(locale = %self.locale, "locale data load complete");
        if let Some(mut callback) = self.on_finished.take() {
            callback();
            self.on_finished = Some(callback);
        }
    }

    pub(crate) fn data_path(&self, rest: &str) -> String {
        let mut path = String::new();
        if !self.directory.is_empty() {
            path.push_str(self.directory.trim_end_matches('/'));
            path.push('/');
        }
        path.push_str("locales");
        if !rest.is_empty() {
            path.push('/');
            path.push_str(rest);
        }
        path
    }
}
