#![forbid(unsafe_code)]

//! Typed model of the localization index (`index.xml`).
//!
//! The index is parsed once per engine lifetime and survives locale
//! switches; only a hard clear discards it. Everything the loader needs is
//! resolved to plain structs at parse time — file entries know their
//! parser, locale labels have their comma-separated id lists split, note
//! text is keyed per locale.
//!
//! Expected document shape:
//!
//! ```xml
//! <data>
//!   <file id="data" value="data.tsv" extension="tsv"/>
//!   <file id="extra" value="extra.csv" extension="csv" delimiter=";"/>
//!   <fileGroup id="intro">
//!     <file id="intro" value="intro.tsv" extension="tsv"/>
//!   </fileGroup>
//!   <locale id="en-US" is_default="true">
//!     <ui language="Language" region="Region"/>
//!     <label id="en-US,en-GB" language="English" region="United States"/>
//!   </locale>
//!   <note id="wip">
//!     <text id="en-US" title="Heads up" body="Translation in progress"/>
//!   </note>
//! </data>
//! ```

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{GlossaError, Result};

/// Which parser consumes a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Comma-style delimited text with quoted cells.
    Csv,
    /// Tab-delimited text, no quoting.
    Tsv,
    /// Rule document (font replacements).
    RuleXml,
    /// Image asset, stored as raw bytes under the entry id.
    Image,
}

impl FileKind {
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xml" => Some(Self::RuleXml),
            "png" => Some(Self::Image),
            _ => None,
        }
    }
}

/// One data file declared by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Logical table name the file's data merges under.
    pub id: String,
    /// Relative filename, without the locale prefix.
    pub path: String,
    pub kind: FileKind,
    /// Custom cell delimiter for `Csv` entries.
    pub delimiter: Option<char>,
}

/// Localized UI vocabulary carried by a locale entry ("Language",
/// "Region" in that locale's own words).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiStrings {
    pub language: Option<String>,
    pub region: Option<String>,
}

/// How one locale names a language/region, addressed by the locales the
/// naming is written *for*.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleLabel {
    pub ids: Vec<String>,
    pub language: Option<String>,
    pub region: Option<String>,
}

impl LocaleLabel {
    /// Whether this label is addressed to `locale`.
    #[must_use]
    pub fn addresses(&self, locale: &str) -> bool {
        self.ids.iter().any(|id| id.contains(locale))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleEntry {
    pub code: String,
    pub is_default: bool,
    pub ui: Option<UiStrings>,
    pub labels: Vec<LocaleLabel>,
}

impl LocaleEntry {
    /// First label addressed to `locale`, if any.
    #[must_use]
    pub fn label_for(&self, locale: &str) -> Option<&LocaleLabel> {
        self.labels.iter().find(|l| l.addresses(locale))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteText {
    pub title: String,
    pub body: String,
}

/// A translation note: per-locale title/body pairs, independent of the
/// flag index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteEntry {
    pub id: String,
    pub texts: HashMap<String, NoteText>,
}

/// The parsed localization index.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Files loaded on every init, in declaration order.
    pub files: Vec<FileEntry>,
    /// Named file groups, loaded lazily alongside the flat list.
    pub groups: HashMap<String, Vec<FileEntry>>,
    pub locales: HashMap<String, LocaleEntry>,
    pub notes: HashMap<String, NoteEntry>,
    /// Locale every other locale is audited against. Last entry marked
    /// `is_default="true"` wins; `en-US` when nothing is marked.
    pub default_locale: String,
}

impl Manifest {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut builder = IndexBuilder::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => builder.open(&e, false),
                Ok(Event::Empty(e)) => builder.open(&e, true),
                Ok(Event::End(e)) => builder.close(e.name().as_ref()),
                Ok(Event::Eof) => break,
                Err(e) => return Err(GlossaError::ManifestParse(format!("{e}"))),
                _ => {}
            }
            buf.clear();
        }

        builder.finish()
    }

    /// Declared locale codes, sorted for deterministic output.
    #[must_use]
    pub fn locale_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.locales.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

#[derive(Default)]
struct IndexBuilder {
    manifest: Manifest,
    saw_data: bool,
    group: Option<String>,
    locale: Option<LocaleEntry>,
    note: Option<NoteEntry>,
}

impl IndexBuilder {
    fn open(&mut self, e: &BytesStart<'_>, self_closing: bool) {
        match e.name().as_ref() {
            b"data" => self.saw_data = true,
            b"file" => {
                if let Some(entry) = parse_file_entry(e) {
                    match self.group.as_deref() {
                        Some(g) => {
                            if let Some(files) = self.manifest.groups.get_mut(g) {
                                files.push(entry);
                            }
                        }
                        None => self.manifest.files.push(entry),
                    }
                }
            }
            b"fileGroup" => {
                if let Some(id) = attr(e, "id") {
                    self.manifest.groups.entry(id.clone()).or_default();
                    if !self_closing {
                        self.group = Some(id);
                    }
                }
            }
            b"locale" => {
                self.flush_locale();
                if let Some(id) = attr(e, "id") {
                    self.locale = Some(LocaleEntry {
                        code: id,
                        is_default: attr(e, "is_default").as_deref() == Some("true"),
                        ui: None,
                        labels: Vec::new(),
                    });
                    if self_closing {
                        self.flush_locale();
                    }
                }
            }
            b"ui" => {
                if let Some(entry) = self.locale.as_mut() {
                    entry.ui = Some(UiStrings {
                        language: attr(e, "language"),
                        region: attr(e, "region"),
                    });
                }
            }
            b"label" => {
                if let Some(entry) = self.locale.as_mut() {
                    entry.labels.push(LocaleLabel {
                        ids: split_ids(attr(e, "id").as_deref().unwrap_or("")),
                        language: attr(e, "language"),
                        region: attr(e, "region"),
                    });
                }
            }
            b"note" => {
                self.flush_note();
                if let Some(id) = attr(e, "id") {
                    self.note = Some(NoteEntry {
                        id,
                        texts: HashMap::new(),
                    });
                    if self_closing {
                        self.flush_note();
                    }
                }
            }
            b"text" => {
                if let Some(n) = self.note.as_mut() {
                    let title = attr(e, "title").unwrap_or_default();
                    let body = attr(e, "body").unwrap_or_default();
                    for lid in split_ids(attr(e, "id").as_deref().unwrap_or("")) {
                        n.texts.insert(
                            lid,
                            NoteText {
                                title: title.clone(),
                                body: body.clone(),
                            },
                        );
                    }
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"fileGroup" => self.group = None,
            b"locale" => self.flush_locale(),
            b"note" => self.flush_note(),
            _ => {}
        }
    }

    fn flush_locale(&mut self) {
        if let Some(entry) = self.locale.take() {
            if entry.is_default {
                self.manifest.default_locale = entry.code.clone();
            }
            self.manifest.locales.insert(entry.code.clone(), entry);
        }
    }

    fn flush_note(&mut self) {
        if let Some(entry) = self.note.take() {
            self.manifest.notes.insert(entry.id.clone(), entry);
        }
    }

    fn finish(mut self) -> Result<Manifest> {
        self.flush_locale();
        self.flush_note();

        if !self.saw_data {
            return Err(GlossaError::ManifestParse(
                "missing <data> root element".to_string(),
            ));
        }

        if self.manifest.default_locale.is_empty() {
            self.manifest.default_locale = "en-US".to_string();
        }

        Ok(self.manifest)
    }
}

fn parse_file_entry(e: &BytesStart<'_>) -> Option<FileEntry> {
    let path = attr(e, "value")?;
    if path.is_empty() {
        tracing::warn!("file entry with empty value in localization index");
        return None;
    }
    let ext = attr(e, "extension").unwrap_or_default();
    let Some(kind) = FileKind::from_extension(&ext) else {
        tracing::warn!(path = %path, extension = %ext, "file entry with unknown extension");
        return None;
    };
    Some(FileEntry {
        id: attr(e, "id").unwrap_or_else(|| path.clone()),
        path,
        kind,
        delimiter: attr(e, "delimiter").and_then(|d| d.chars().next()),
    })
}

fn attr(start: &BytesStart<'_>, name: &str) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
