mod plan;
mod report;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use procgraph_core::{builtin_registry, evaluate, EvalState, GraphError, PropertyError, RegistryError};
use thiserror::Error;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::plan::Plan;
use crate::report::RunSummary;

#[derive(Parser, Debug)]
#[command(name = "procgraph")]
#[command(about = "Build and evaluate a procedural geometry node graph", long_about = None)]
#[command(version)]
struct Args {
    /// JSON plan describing nodes, properties and links (builtin demo when omitted)
    #[arg(short, long)]
    plan: Option<PathBuf>,

    /// List registered node types with their sockets and properties
    #[arg(long)]
    list: bool,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid plan: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("node '{node}': {source}")]
    Property {
        node: String,
        #[source]
        source: PropertyError,
    },
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),
    #[error("plan references unknown node '{0}'")]
    UnknownNode(String),
    #[error("plan declares node '{0}' twice")]
    DuplicateNode(String),
    #[error("malformed link '{0}', expected 'node.socket -> node.socket'")]
    BadLink(String),
    #[error("{0} node(s) failed during evaluation")]
    Evaluation(usize),
}

fn main() -> ExitCode {
    let args = Args::parse();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(args.log_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("procgraph: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let registry = builtin_registry()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list {
        if args.json {
            serde_json::to_writer_pretty(&mut out, &report::node_type_listings(&registry))?;
            writeln!(out)?;
        } else {
            report::write_node_types(&mut out, &registry)?;
        }
        return Ok(());
    }

    let plan = match &args.plan {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading plan");
            Plan::load(path)?
        }
        None => {
            tracing::info!("no plan given, using the builtin demo");
            Plan::demo()?
        }
    };

    let built = plan::build_graph(&plan, &registry)?;
    tracing::debug!(nodes = built.ids.len(), links = plan.links.len(), "plan built");
    let mut graph = built.graph;
    let mut state = EvalState::new();
    let eval_report = evaluate(&mut graph, &mut state)?;

    let summary = RunSummary::collect(&eval_report, &graph, &state);

    if args.json {
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    } else {
        report::write_summary(&mut out, &graph, &summary)?;
    }

    tracing::info!(
        nodes = eval_report.order.len(),
        warnings = eval_report.warning_count(),
        "evaluation finished in {:.2} ms",
        eval_report.total_duration_ms()
    );

    if eval_report.errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Evaluation(eval_report.errors.len()))
    }
}
