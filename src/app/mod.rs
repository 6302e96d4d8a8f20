use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{Context, Pos2};

use crate::analysis::{Analysis, analyze};
use crate::graph::{GraphStore, NodeId};
use crate::layout::{LayoutConfig, LiveRelaxation};
use crate::syntax::SourceParser;

mod camera;
mod graph;
mod highlight;
mod render_utils;
mod ui;

use self::camera::OrbitCamera;

pub const SAMPLE_SOURCE: &str = r#"import { EventEmitter } from "events";
import * as path from "path";
const fs = require("fs");

class Logger {
  log(message) {
    console.log(message);
  }
}

const logger = new Logger();
const config = { retries: 3, hosts: ["alpha", "beta"], verbose: false };

function connect(host) {
  logger;
  return fs.readFileSync(path.join(host, "config.json"));
}

const hosts = config.hosts.map((host) => connect(host));
connect("alpha");
"#;

/// Startup options for the viewer.
pub struct ViewerOptions {
    pub source: String,
    pub layout: LayoutConfig,
    pub node_size: f32,
    pub seed: Option<u64>,
}

pub struct CodeGraphApp {
    parser: Box<dyn SourceParser>,
    model: ViewModel,
}

struct ViewModel {
    source: String,
    store: GraphStore,
    layout: LayoutConfig,
    seed: Option<u64>,
    node_size: f32,
    analysis: Option<Analysis>,
    last_error: Option<String>,
    live_layout: bool,
    live_relaxation: LiveRelaxation,
    camera: OrbitCamera,
    drag: Option<NodeDrag>,
    selected: Option<NodeId>,
    search: String,
    graph_revision: u64,
    search_match_cache: Option<SearchMatchCache>,
    view_scratch: ViewScratch,
}

#[derive(Clone, Copy, Debug)]
struct NodeDrag {
    node: NodeId,
    /// Camera depth at grab time; the node moves in the plane at this depth.
    depth: f32,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<NodeId>>,
}

#[derive(Clone, Copy, Debug)]
struct ProjectedNode {
    screen: Pos2,
    radius: f32,
    depth: f32,
}

#[derive(Default)]
struct ViewScratch {
    projected: Vec<Option<ProjectedNode>>,
    draw_order: Vec<usize>,
}

impl CodeGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        parser: Box<dyn SourceParser>,
        options: ViewerOptions,
    ) -> Self {
        let mut app = Self {
            parser,
            model: ViewModel::new(options),
        };
        app.run_analysis();
        app
    }

    fn run_analysis(&mut self) {
        self.model.run_analysis(self.parser.as_ref());
    }
}

impl eframe::App for CodeGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut analyze_requested = false;
        self.model.show(ctx, &mut analyze_requested);

        if analyze_requested {
            self.run_analysis();
            ctx.request_repaint();
        }
    }
}

impl ViewModel {
    fn new(options: ViewerOptions) -> Self {
        Self {
            source: options.source,
            store: GraphStore::new(),
            layout: options.layout,
            seed: options.seed,
            node_size: options.node_size,
            analysis: None,
            last_error: None,
            live_layout: true,
            live_relaxation: LiveRelaxation::default(),
            camera: OrbitCamera::default(),
            drag: None,
            selected: None,
            search: String::new(),
            graph_revision: 0,
            search_match_cache: None,
            view_scratch: ViewScratch::default(),
        }
    }

    /// Runs a full build pass on the editor contents. A failed parse leaves
    /// the graph empty and keeps the message for the controls panel.
    fn run_analysis(&mut self, parser: &dyn SourceParser) {
        self.graph_revision += 1;
        self.drag = None;
        self.selected = None;
        self.search_match_cache = None;

        match analyze(&self.source, parser, &mut self.store, &self.layout, self.seed) {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.last_error = None;
            }
            Err(error) => {
                tracing::warn!(%error, "analysis failed");
                self.analysis = None;
                self.last_error = Some(error.to_string());
            }
        }
    }
}
