#![forbid(unsafe_code)]

//! Preference inspection CLI
//!
//! Loads a JSON definitions file (plus an optional resource pack), renders
//! the resulting collection as text, and round-trips edits through the same
//! notify/save path the presentation layer would use.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use prefkit::{
    FileStore, MapResources, NoResources, PrefValue, PreferenceEntry, PreferenceGroup,
    PreferenceLoader, Resources,
};

#[derive(Parser)]
#[command(name = "prefkit", about = "Inspect and edit schema-driven preferences")]
struct Cli {
    /// Path to the JSON preference definitions file
    #[arg(long)]
    schema: PathBuf,

    /// Optional JSON resource pack for @kind/name references
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Override the store directory (defaults to the user config dir)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every entry with its current value
    Show,
    /// Print one entry's current value
    Get { key: String },
    /// Update one entry and persist it
    Set { key: String, value: String },
}

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let document = fs::read_to_string(&cli.schema)
        .context(format!("Failed to read schema file {}", cli.schema.display()))?;

    let resources: Box<dyn Resources + Send> = match &cli.resources {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .context(format!("Failed to read resource pack {}", path.display()))?;
            let pack: MapResources = serde_json::from_str(&contents)
                .context(format!("Failed to parse resource pack {}", path.display()))?;
            Box::new(pack)
        }
        None => Box::new(NoResources),
    };

    let store_dir = cli.store_dir.clone();
    let mut loader = PreferenceLoader::new();
    let handle = loader.spawn(document, BoxedResources(resources), move |namespace| {
        match &store_dir {
            Some(dir) => FileStore::open_path(dir.join(format!("{namespace}.json"))),
            None => FileStore::open(namespace),
        }
    });

    let (mut group, mut store) = handle
        .wait()
        .context("Failed to load preference definitions")?;
    info!(namespace = %group.namespace(), entries = group.len(), "Collection ready");

    match cli.command {
        Command::Show => {
            for entry in group.displayable() {
                println!("{}", render_entry(entry));
            }
        }
        Command::Get { key } => {
            let Some(entry) = group.find(&key) else {
                bail!("No preference with key '{key}'");
            };
            println!("{}", render_entry(entry));
        }
        Command::Set { key, value } => {
            apply_edit(&mut group, &key, &value)?;
            group.save(&mut store);
            store.commit()?;
            if let Some(entry) = group.find(&key) {
                println!("{}", render_entry(entry));
            }
        }
    }

    Ok(())
}

/// Apply a user edit the way a presentation layer would: coerce the raw
/// text to the value kind the entry owns, then notify by key.
fn apply_edit(group: &mut PreferenceGroup, key: &str, value: &str) -> Result<()> {
    let updates: Vec<PrefValue> = match group.find(key) {
        Some(PreferenceEntry::Boolean(_)) => {
            let checked: bool = value
                .parse()
                .context(format!("'{value}' is not a boolean"))?;
            vec![PrefValue::Bool(checked)]
        }
        Some(PreferenceEntry::List(p)) => {
            let selected: i64 = value
                .parse()
                .context(format!("'{value}' is not an option index"))?;
            let Some(display) = p.display_list.get(selected as usize) else {
                bail!(
                    "Option index {selected} out of range (0..{})",
                    p.display_list.len()
                );
            };
            // A completed selection is reported as two events: index, text
            vec![PrefValue::Int(selected), PrefValue::Str(display.clone())]
        }
        Some(other) => bail!("'{key}' ({}) is not editable", other.type_tag()),
        None => bail!("No preference with key '{key}'"),
    };

    for update in &updates {
        group.notify_update(key, update);
    }
    Ok(())
}

fn render_entry(entry: &PreferenceEntry) -> String {
    let description = entry
        .context_description()
        .map(|d| format!(" - {d}"))
        .unwrap_or_default();
    match entry {
        PreferenceEntry::Simple(p) => format!("    {} ({}){description}", p.meta.name, p.meta.key),
        PreferenceEntry::Boolean(p) => {
            let mark = if p.checked { "x" } else { " " };
            format!("[{mark}] {} ({}){description}", p.meta.name, p.meta.key)
        }
        PreferenceEntry::List(p) => format!(
            "[{}] {} ({}){description}",
            p.selected_display, p.meta.name, p.meta.key
        ),
        PreferenceEntry::Group(g) => {
            let mut lines = vec![format!("{} ({})", g.meta().name, g.meta().key)];
            for child in g.displayable() {
                lines.push(format!("  {}", render_entry(child)));
            }
            lines.join("\n")
        }
    }
}

/// Adapter so a boxed resolver can cross the loader's Send bound
struct BoxedResources(Box<dyn Resources + Send>);

impl Resources for BoxedResources {
    fn string(&self, res: prefkit::ResourceRef<'_>) -> Option<String> {
        self.0.string(res)
    }

    fn integer(&self, res: prefkit::ResourceRef<'_>) -> Option<i64> {
        self.0.integer(res)
    }

    fn string_array(&self, res: prefkit::ResourceRef<'_>) -> Option<Vec<String>> {
        self.0.string_array(res)
    }
}
