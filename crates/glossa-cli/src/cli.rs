use std::path::PathBuf;

use clap::Parser;

use glossa::{Glossa, GlossaError, InitOptions};

#[derive(Debug, Parser)]
#[command(
    name = "glossa",
    about = "Inspect and audit a glossa locale tree",
    version
)]
pub struct Cli {
    /// Root directory containing the `locales/` tree.
    pub root: PathBuf,

    /// Locale to load, e.g. "en-US". Empty means the default locale.
    #[arg(default_value = "")]
    pub locale: String,

    /// File group to activate alongside the flat list.
    #[arg(long)]
    pub group: Option<String>,

    /// Audit against the default locale and report gaps.
    #[arg(long)]
    pub check_missing: bool,

    /// Back-fill audited gaps with default-locale values.
    #[arg(long)]
    pub replace_missing: bool,

    /// Flags to look up after loading (repeatable).
    #[arg(long = "flag")]
    pub flags: Vec<String>,

    /// Context (table id) for the lookups.
    #[arg(long, default_value = "data")]
    pub context: String,
}

impl Cli {
    pub fn into_options(self) -> (PathBuf, InitOptions, Vec<String>, String) {
        let mut opts = InitOptions::new(self.locale)
            .check_missing(self.check_missing)
            .replace_missing(self.replace_missing);
        if let Some(group) = self.group {
            opts = opts.group(group);
        }
        (self.root, opts, self.flags, self.context)
    }
}

pub fn run_from_env() -> Result<(), GlossaError> {
    let cli = Cli::parse();
    let (root, opts, flags, context) = cli.into_options();

    let mut glossa = Glossa::from_dir(root);
    glossa.init(opts)?;

    println!("locale: {}", glossa.locale());
    println!("declared: {}", glossa.locales().join(", "));

    for flag in &flags {
        println!("{flag} = {}", glossa.get_in(flag, &context));
    }

    if let Some(files) = glossa.missing_files() {
        println!("missing files:");
        for file in files {
            println!("  {file}");
        }
    }
    if let Some(tables) = glossa.missing_flags() {
        println!("missing flags:");
        let mut ids: Vec<&String> = tables.keys().collect();
        ids.sort_unstable();
        for id in ids {
            println!("  [{id}] {}", tables[id].join(", "));
        }
    }
    if glossa.missing_report().is_none() && glossa.is_loaded() {
        tracing::debug!("no missing-data report (audit off or nothing missing)");
    }

    Ok(())
}
