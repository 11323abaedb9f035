use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pinback_core::{
    compose_query, layout, Catalog, FilterAction, FilterState, HttpCatalog, MemCatalog, Session,
};
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod filters;
mod gallery;
mod logging;
mod theme;
mod view;

use filters::{FilterArgs, Mode};

#[derive(Parser)]
#[command(name = "pinback", version, about = "Browse the pin-back button archive")]
struct Cli {
    /// Archive service base URL (overrides settings)
    #[arg(long, global = true)]
    server: Option<String>,
    /// Serve records from a local JSON file instead of the archive service
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Settings file (default: <config dir>/pinback/settings.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal gallery (default)
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the request the filters compose to, without sending it
    Query {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Fetch once and print the records with their layout boxes
    Search {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        #[arg(long)]
        json: bool,
    },
    /// Keyword suggestions for a prefix
    Suggest {
        prefix: String,
        #[arg(long)]
        json: bool,
    },
    /// Show effective settings and paths
    Config {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Browse {
        filters: FilterArgs::default(),
    });
    match &command {
        Commands::Browse { .. } => logging::init_file(&config::log_path()),
        _ => logging::init_stderr(),
    }
    let mut settings = config::load_settings(cli.config.as_deref());
    if let Some(server) = cli.server {
        settings.server.base_url = server;
    }

    match command {
        Commands::Browse { filters } => {
            let catalog = open_catalog(cli.catalog.as_ref(), &settings)?;
            let state = initial_state(&settings, &filters);
            let session = Session::new(catalog, state, settings.session_config())
                .context("starting fetch runtime")?;
            gallery::run_gallery_default(session, theme::load_theme(), settings.poll_interval())?;
        }
        Commands::Query { filters, json } => {
            let query = compose_query(&initial_state(&settings, &filters));
            if json {
                println!("{}", serde_json::to_string_pretty(&query)?);
            } else {
                let catalog = open_catalog(cli.catalog.as_ref(), &settings)?;
                println!("{}", catalog.describe(&query));
            }
        }
        Commands::Search {
            filters,
            mode,
            json,
        } => {
            let mut state = initial_state(&settings, &filters);
            if let Some(m) = mode {
                state = state.apply(FilterAction::SetRenderMode(m.into()));
            }
            let query = compose_query(&state);
            let catalog = open_catalog(cli.catalog.as_ref(), &settings)?;
            tracing::debug!(request = %catalog.describe(&query), "search");
            let records = catalog
                .images(&query)
                .with_context(|| format!("fetching {}", catalog.describe(&query)))?;
            let laid = layout(
                &records,
                state.render_mode(),
                state.grid_size(),
                state.real_life_scale(),
            );
            if json {
                let out = serde_json::json!({
                    "count": records.len(),
                    "mode": laid.mode,
                    "placed": laid.placed,
                    "excluded": laid.excluded,
                    "empty": laid.empty().map(|e| e.message()),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{} images found", records.len());
                match laid.empty() {
                    Some(e) => println!("{}", e.message()),
                    None => {
                        for p in &laid.placed {
                            println!(
                                "{}\t{}x{}px\t{}\t{}",
                                p.record.id,
                                p.render_box.width_px,
                                p.render_box.height_px,
                                p.record.display_title(),
                                p.record.caption()
                            );
                        }
                    }
                }
            }
        }
        Commands::Suggest { prefix, json } => {
            let catalog = open_catalog(cli.catalog.as_ref(), &settings)?;
            let items = catalog
                .suggestions(&prefix)
                .with_context(|| format!("fetching suggestions for {prefix:?}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for s in items {
                    println!("{s}");
                }
            }
        }
        Commands::Config { json } => {
            if json {
                let mut v = serde_json::to_value(&settings)?;
                if let Some(map) = v.as_object_mut() {
                    map.insert("config_dir".into(), path_value(config::config_dir()));
                    map.insert("settings_path".into(), path_value(config::settings_path()));
                    map.insert("log_path".into(), path_value(config::log_path()));
                }
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                println!("config_dir: {}", config::config_dir().display());
                println!("settings: {}", config::settings_path().display());
                println!("log: {}", config::log_path().display());
                println!("server: {}", settings.server.base_url);
                println!("timeout: {}ms", settings.timeout().as_millis());
                let s = settings.session_config();
                println!("blur_grace: {}ms", s.blur_grace.as_millis());
                println!("suggest_debounce: {}ms", s.suggest_debounce.as_millis());
            }
        }
    }

    Ok(())
}

/// Configured gallery defaults, then command-line flags on top.
fn initial_state(settings: &config::Settings, args: &FilterArgs) -> FilterState {
    FilterState::default()
        .apply_all(settings.gallery_actions())
        .apply_all(args.actions())
}

fn open_catalog(path: Option<&PathBuf>, settings: &config::Settings) -> Result<Arc<dyn Catalog>> {
    if let Some(p) = path {
        let mem = MemCatalog::from_path(p)
            .with_context(|| format!("loading catalog {}", p.display()))?;
        tracing::debug!(records = mem.len(), "local catalog loaded");
        return Ok(Arc::new(mem));
    }
    let http = HttpCatalog::new(&settings.server.base_url, settings.timeout())
        .with_context(|| format!("bad server url {:?}", settings.server.base_url))?;
    Ok(Arc::new(http))
}

fn path_value(p: PathBuf) -> serde_json::Value {
    serde_json::Value::String(p.display().to_string())
}
