//! aimg - command-line front end for an indexed image collection
//!
//! Every invocation resolves configuration, synchronises the root folder
//! and answers from the in-memory index. Nothing is persisted between runs
//! except gallery files the user writes.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aimg_common::config::{Settings, TomlConfig, CONFIG_FILE_ENV, ROOT_FOLDER_ENV};
use aimg_common::DisplayMode;
use aimg_index::services::{Combine, EmbeddingTable, Recommender, SearchField};
use aimg_index::Collection;

/// Command-line arguments for aimg
#[derive(Parser, Debug)]
#[command(name = "aimg")]
#[command(about = "Index, search and browse a folder of generated images")]
#[command(version)]
struct Args {
    /// Root folder containing the images
    #[arg(short, long, env = ROOT_FOLDER_ENV)]
    root: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long, env = CONFIG_FILE_ENV)]
    config: Option<PathBuf>,

    /// Embedding table (JSON); relative paths are taken from the root
    #[arg(short, long)]
    embeddings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the root folder and report what was indexed
    Scan,

    /// Show one image (identifier, relative path or file name)
    Show {
        image: String,

        /// metadata_only, metadata_and_image or image_only (or 0/1/2)
        #[arg(short, long)]
        mode: Option<DisplayMode>,
    },

    /// Find images by metadata substring
    Search {
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long)]
        cfg_scale: Option<String>,
        #[arg(long)]
        steps: Option<String>,
        #[arg(long)]
        sampler: Option<String>,
        #[arg(long)]
        date: Option<String>,

        /// Match any criterion instead of all of them
        #[arg(long)]
        any: bool,
    },

    /// List the images most similar to one image
    Similar {
        image: String,

        /// Number of results
        #[arg(short, default_value = "5")]
        k: usize,
    },

    /// Display every image of a gallery file
    Gallery {
        file: PathBuf,

        #[arg(short, long)]
        mode: Option<DisplayMode>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref());
    let settings = Settings::resolve(&config, args.root.clone(), args.embeddings.clone());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting aimg v{}", env!("CARGO_PKG_VERSION"));
    info!("Root folder: {}", settings.root_folder.display());

    let mut collection = Collection::from_settings(&settings);
    let report = collection
        .sync()
        .with_context(|| format!("Failed to scan {}", settings.root_folder.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Scan => {
            let failures = collection.load_all_metadata();
            writeln!(out, "{}", collection.registry())?;
            writeln!(out, "Added: {}", report.added.len())?;
            if !report.collisions.is_empty() {
                writeln!(
                    out,
                    "Not indexed (identifier collision): {}",
                    report.collisions.join(", ")
                )?;
            }
            if failures > 0 {
                writeln!(out, "Metadata unreadable: {} file(s)", failures)?;
            }
        }

        Command::Show { image, mode } => {
            let id = collection.require(&image)?;
            collection.load_metadata(id);
            let viewer = collection.viewer();
            if viewer.show_image(id, mode.unwrap_or(settings.display_mode), &mut out)? {
                wait_for_enter(&mut out)?;
            }
        }

        Command::Search {
            prompt,
            model,
            seed,
            cfg_scale,
            steps,
            sampler,
            date,
            any,
        } => {
            let criteria: Vec<(SearchField, String)> = [
                (SearchField::Prompt, prompt),
                (SearchField::Model, model),
                (SearchField::Seed, seed),
                (SearchField::CfgScale, cfg_scale),
                (SearchField::Steps, steps),
                (SearchField::Sampler, sampler),
                (SearchField::Date, date),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();

            collection.load_all_metadata();
            let combine = if any { Combine::Any } else { Combine::All };
            let hits = collection.search().query_all(&criteria, combine);

            let mut paths: Vec<&str> = hits
                .iter()
                .filter_map(|&id| collection.registry().path_of(id))
                .collect();
            paths.sort_unstable();

            writeln!(out, "{} match(es)", paths.len())?;
            for path in paths {
                writeln!(out, "  {}", path)?;
            }
        }

        Command::Similar { image, k } => {
            let id = collection.require(&image)?;
            let table = EmbeddingTable::load(&settings.embeddings_file).with_context(|| {
                format!("Failed to load embeddings from {}", settings.embeddings_file.display())
            })?;

            let mut recommender = Recommender::with_extension(table, &settings.image_extension);
            recommender.preprocess(collection.registry());

            let results = recommender.find_similar_scored(id, k);
            if results.is_empty() {
                warn!(image = %image, "No similar images found");
            }
            for (similar, score) in results {
                let path = collection.registry().path_of(similar).unwrap_or("?");
                writeln!(out, "{:.4}  {}", score, path)?;
            }
        }

        Command::Gallery { file, mode } => {
            let (gallery, load_report) = collection
                .load_gallery(&file)
                .with_context(|| format!("Failed to load gallery {}", file.display()))?;
            if !load_report.skipped.is_empty() {
                writeln!(out, "Skipped {} unknown image(s)", load_report.skipped.len())?;
            }

            let viewer = collection.viewer();
            let mode = mode.unwrap_or(settings.display_mode);
            let mut pause = || wait_for_enter(&mut io::stdout());
            gallery.show(&viewer, mode, &mut out, &mut pause)?;
        }
    }

    Ok(())
}

/// Block until the user presses Enter
fn wait_for_enter(out: &mut dyn Write) -> io::Result<()> {
    write!(out, "Press Enter to continue...")?;
    out.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
