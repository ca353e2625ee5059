use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use genealogy_graph::config::LayoutConfig;
use genealogy_graph::genealogy::{Graph, NodeId, Notables, Preset, load_graph};
use genealogy_graph::layout::{QuadtreeCell, Simulation, SimulationConfig};
use genealogy_graph::view::{DragController, Lineage, RenderStyle, ViewportController};
use tracing::{info, warn};

mod graph;
mod render_utils;
mod ui;

/// Where a graph snapshot comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphSource {
    File(PathBuf),
    Preset(Preset),
}

impl GraphSource {
    fn path(&self, presets_dir: &Path) -> PathBuf {
        match self {
            Self::File(path) => path.clone(),
            Self::Preset(preset) => preset.path_in(presets_dir),
        }
    }

    fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Preset(preset) => preset.label().to_owned(),
        }
    }
}

type LoadResult = Result<Graph, String>;

pub struct GenealogyApp {
    source: GraphSource,
    presets_dir: PathBuf,
    notables: Arc<Notables>,
    layout: LayoutConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

/// What the ready view asks of the shell after a frame.
enum ShellRequest {
    Reload,
    Load(GraphSource),
}

struct ViewModel {
    graph: Graph,
    notables: Arc<Notables>,
    source: GraphSource,
    simulation: Simulation,
    viewport: ViewportController,
    drag: DragController,
    style: RenderStyle,
    config: SimulationConfig,
    live_physics: bool,
    show_quadtree_overlay: bool,
    show_about: bool,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
    lineage: Option<Lineage>,
    quadtree_cells: Vec<QuadtreeCell>,
    pointer_inside: bool,
    wheel_active: bool,
    placed: bool,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<NodeId>>,
}

impl GenealogyApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: GraphSource,
        presets_dir: PathBuf,
        notables: Notables,
        layout: LayoutConfig,
    ) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_load(source.path(&presets_dir)),
        };
        Self {
            source,
            presets_dir,
            notables: Arc::new(notables),
            layout,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph(&path).map_err(|error| format!("{error:#}"));
            // The receiver is gone when a newer load replaced this one.
            let _ = tx.send(result);
        });

        rx
    }

    fn ready_state(&self, result: LoadResult) -> AppState {
        let graph = match result {
            Ok(graph) => graph,
            Err(error) => {
                warn!(%error, "graph load failed");
                return AppState::Error(error);
            }
        };

        match ViewModel::new(
            graph,
            Arc::clone(&self.notables),
            self.source.clone(),
            &self.layout,
        ) {
            Ok(model) => AppState::Ready(Box::new(model)),
            Err(error) => AppState::Error(error.to_string()),
        }
    }

    fn begin_load(&mut self, source: GraphSource) {
        info!(source = %source.label(), "loading genealogy graph");
        self.source = source;
        self.reload_rx = Some(Self::spawn_load(self.source.path(&self.presets_dir)));
    }

    fn replace_state(&mut self, next: AppState) {
        if let AppState::Ready(model) = &mut self.state {
            model.dispose();
        }
        self.reload_rx = None;
        self.state = next;
    }
}

impl eframe::App for GenealogyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                let label = self.source.label();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading genealogy of {label}..."));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load genealogy graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = AppState::Loading {
                        rx: Self::spawn_load(self.source.path(&self.presets_dir)),
                    };
                }
            }
            AppState::Ready(model) => {
                let is_reloading = self.reload_rx.is_some();
                let request = model.show(ctx, is_reloading);

                match request {
                    Some(ShellRequest::Reload) => self.begin_load(self.source.clone()),
                    Some(ShellRequest::Load(source)) => self.begin_load(source),
                    None => {}
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            let next = self.ready_state(result);
            self.replace_state(next);
        }
    }
}
