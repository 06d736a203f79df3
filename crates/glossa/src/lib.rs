#![forbid(unsafe_code)]

//! Runtime localization engine: indexed locale data, flag lookup, audits.
//!
//! # Role
//! `glossa` turns a directory of locale data — an XML index, delimited
//! translation tables, font-override rules, images — into an in-memory
//! flag index and answers translation lookups against it. Untranslated
//! flags degrade to their own text instead of failing, so a half-finished
//! locale stays usable.
//!
//! # Primary responsibilities
//! - **Index model** ([`manifest`]): the parsed `index.xml` — file lists,
//!   file groups, locales, notes — resolved to typed entries once.
//! - **Tabular parsing** ([`tabular`]): quote-aware delimited cells with
//!   the format's cell-first row assembly.
//! - **Locale resolution** ([`locale`]): `xx-YY` normalization and
//!   closest-match fallback for locales with no data.
//! - **Loading & auditing** ([`engine`]): merge files into the flag index,
//!   optionally diffing against the default locale to report or repair
//!   missing translations.
//! - **Lookup** ([`lookup`]): safe/unsafe flag queries, `<RE>` redirects,
//!   placeholder tokens, `$KEY:locale` index strings, font rules, notes.
//!
//! # Example
//! ```
//! use glossa::{Glossa, InitOptions, assets::MemoryAssetSource};
//!
//! let mut source = MemoryAssetSource::new();
//! source.insert_text(
//!     "locales/index.xml",
//!     r#"<data>
//!          <file id="data" value="data.tsv" extension="tsv"/>
//!          <locale id="en-US" is_default="true"/>
//!        </data>"#,
//! );
//! source.insert_text("locales/en-US/data.tsv", "flag\tvalue\t\n$HELLO\tHello!\t\n");
//!
//! let mut glossa = Glossa::new(Box::new(source));
//! glossa.init(InitOptions::new("en-US"))?;
//! assert_eq!(glossa.get("$HELLO"), "Hello!");
//! assert_eq!(glossa.get("$MISSING"), "$MISSING");
//! # Ok::<(), glossa::GlossaError>(())
//! ```

pub mod assets;
pub mod engine;
pub mod error;
pub mod fontrules;
pub mod locale;
pub mod lookup;
pub mod manifest;
pub mod replace;
pub mod tabular;

pub use assets::{AssetError, AssetSource, FsAssetSource, MemoryAssetSource};
pub use engine::{Glossa, InitOptions, LoadState, MissingReport};
pub use error::{GlossaError, Result};
pub use fontrules::FontRule;
pub use manifest::{FileEntry, FileKind, LocaleEntry, Manifest, NoteEntry};
pub use tabular::Table;
