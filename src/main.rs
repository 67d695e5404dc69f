use std::process;

use bibparse::Database;

use clap::Parser;
use eyre::WrapErr;
use log::{error, info, trace};
use regex::Regex;

#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Settings {
    /// Filepaths of the .bib files to parse
    #[clap(required = true)]
    files: Vec<String>,

    /// Print only entries of this type, can be repeated
    #[clap(short = 't', long = "type")]
    types: Vec<String>,

    /// Print only entries of none of the types given by --type
    #[clap(long, requires = "types")]
    complement: bool,

    /// Print only entries where this field matches --pattern
    #[clap(short, long, requires = "pattern")]
    field: Option<String>,

    /// Regular expression searched for in the field given by --field
    #[clap(short, long, requires = "field")]
    pattern: Option<String>,

    /// Sort all entries by ID, without putting collections last
    #[clap(long)]
    unordered: bool,

    /// Rewrite each file in canonical order instead of printing it
    #[clap(short, long, conflicts_with_all = &["types", "field", "unordered"])]
    write: bool,

    /// Print entries as JSON
    #[cfg(feature = "serde_json")]
    #[clap(long, conflicts_with_all = &["write", "unordered"])]
    json: bool,

    /// How chatty the program is, can be repeated
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,

    /// Only report errors
    #[clap(short, long)]
    quiet: bool,
}

fn select(settings: &Settings, pattern: Option<&Regex>, mut db: Database) -> Database {
    if !settings.types.is_empty() {
        let kinds: Vec<&str> = settings.types.iter().map(String::as_str).collect();
        trace!("filtering by type {:?} (complement: {})", kinds, settings.complement);
        db = db.by_type(&kinds, settings.complement);
    }
    if let (Some(field), Some(pattern)) = (&settings.field, pattern) {
        trace!("filtering by field '{}' matching '{}'", field, pattern);
        db = db.by_field_pattern(field, pattern);
    }
    db
}

fn try_main() -> eyre::Result<()> {
    let settings = Settings::parse();

    let verbosity = if settings.quiet {
        0
    } else {
        settings.verbosity as usize + 1
    };
    stderrlog::new().verbosity(verbosity).init()?;

    let pattern = settings
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .wrap_err("invalid --pattern")?;

    for file in &settings.files {
        let db = Database::from_file(file).wrap_err_with(|| format!("cannot parse '{}'", file))?;
        info!("{}: {} entries", file, db.len());

        if settings.write {
            db.write_to(file)
                .wrap_err_with(|| format!("cannot write '{}'", file))?;
            continue;
        }

        let db = select(&settings, pattern.as_ref(), db);

        #[cfg(feature = "serde_json")]
        if settings.json {
            println!("{}", serde_json::to_string(&db)?);
            continue;
        }

        if settings.unordered {
            println!("{}", db.serialize_unordered());
        } else {
            println!("{}", db.serialize());
        }
    }

    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{:#}", err);
        process::exit(2);
    }
}
