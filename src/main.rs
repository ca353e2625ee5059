mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use genealogy_graph::config::{LayoutConfig, load_layout_config};
use genealogy_graph::genealogy::{Notables, Preset, load_notables};
use tracing_subscriber::EnvFilter;

use crate::app::{GenealogyApp, GraphSource};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph JSON to open instead of a preset.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Directory holding one `<preset>.json` graph per preset key.
    #[arg(long, default_value = "presets")]
    presets_dir: PathBuf,

    /// Preset key, e.g. `michaelatiyah`.
    #[arg(long)]
    preset: Option<String>,

    /// JSON list of notable persons to colour differently.
    #[arg(long)]
    notables: Option<PathBuf>,

    /// JSON overrides for the simulation and viewport parameters.
    #[arg(long)]
    layout_config: Option<PathBuf>,
}

impl Args {
    fn source(&self) -> Result<GraphSource> {
        if let Some(path) = &self.graph {
            return Ok(GraphSource::File(path.clone()));
        }
        if !self.presets_dir.is_dir() {
            bail!(
                "presets directory `{}` not found; pass --graph <FILE>, or --presets-dir <DIR> \
                 containing <preset>.json files",
                self.presets_dir.display()
            );
        }
        let preset = match self.preset.as_deref() {
            Some(key) => Preset::from_key(key).with_context(|| {
                let known = Preset::ALL.map(Preset::key).join(", ");
                format!("unknown preset `{key}` (known: {known})")
            })?,
            None => Preset::default(),
        };
        Ok(GraphSource::Preset(preset))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("genealogy_graph=info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let source = args.source()?;
    let notables = match &args.notables {
        Some(path) => load_notables(path)?,
        None => Notables::default(),
    };
    let layout = match &args.layout_config {
        Some(path) => load_layout_config(path)?,
        None => LayoutConfig::default(),
    };
    let presets_dir = args.presets_dir;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "genealogy-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(GenealogyApp::new(
                cc,
                source,
                presets_dir,
                notables,
                layout,
            )))
        }),
    )
    .map_err(|error| anyhow!("{error}"))
}
