//! `lode build` — the full pipeline from sources to hashed artifacts.
//!
//! Orchestrates the complete build:
//! 1. Resolve the project root and load `lode.toml`
//! 2. Build the rule table and the module graph
//! 3. Transform every module on the worker pool, cache-first
//! 4. Plan chunks and concatenate chunk bundles
//! 5. Write artifacts and the manifest atomically
//! 6. Persist and garbage-collect the cache

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use rayon::prelude::*;

use lode_cache::Cache;
use lode_config::BuildMode;
use lode_emit::{ArtifactWriter, BuildArtifact, BuildManifest};
use lode_graph::{build_graph, plan_chunks, ModuleGraph, Resolver};
use lode_transform::{execute, ExecuteContext, TransformOutput, TransformRegistry};

use crate::pipeline::load_project;
use crate::report::BuildFailure;
use crate::{BuildArgs, CliMode, GlobalArgs};

/// Directory under the project root holding the incremental cache.
const CACHE_DIR: &str = ".lode-cache";

/// Runs the `lode build` command.
///
/// Returns exit code 0 on success. Any pipeline failure is reported on
/// stderr in the requested format and yields exit code 1.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match build_project(args, global) {
        Ok(()) => Ok(0),
        Err(failure) => {
            failure.report(args.format);
            Ok(1)
        }
    }
}

/// The full pipeline, separated from exit-code handling.
fn build_project(args: &BuildArgs, global: &GlobalArgs) -> Result<(), BuildFailure> {
    let (project_dir, config) = load_project(global)?;

    if !global.quiet {
        eprintln!("   Building {}", config.project.name);
    }

    let mode = match args.mode {
        Some(CliMode::Dev) => BuildMode::Development,
        Some(CliMode::Prod) => BuildMode::Production,
        None => config.build.mode,
    };

    let registry = TransformRegistry::from_config(&config.rules)?;
    let resolver = Resolver::new(
        &project_dir,
        config.resolve.extensions.clone(),
        config.resolve.module_dirs.clone(),
    );
    let graph = build_graph(&config.entries, &resolver)?;

    if !global.quiet {
        eprintln!(
            "    Graphed {} module(s), {} edge(s)",
            graph.len(),
            graph.edge_count()
        );
    }

    let cache = if args.no_cache {
        Cache::disabled()
    } else {
        Cache::load_or_create(&project_dir.join(CACHE_DIR), env!("CARGO_PKG_VERSION"))
    };

    let ctx = ExecuteContext {
        mode,
        hash_length: config.build.hash_length,
    };
    let outputs = transform_all(&graph, &registry, &cache, &ctx, args.jobs)?;

    if !global.quiet {
        eprintln!("Transformed {} module(s)", outputs.len());
    }

    let plan = plan_chunks(&graph, resolver.module_dirs());
    let (artifacts, chunk_files) =
        assemble_artifacts(&graph, &plan.chunks, &outputs, config.build.hash_length);

    if global.verbose {
        for (chunk, modules) in &plan.chunks {
            eprintln!("      Chunk {} ({} module(s))", chunk, modules.len());
        }
    }

    let mut manifest = BuildManifest::new();
    for (entry, chunk_order) in &plan.entry_chunks {
        let files = chunk_order
            .iter()
            .filter_map(|chunk| chunk_files.get(chunk).cloned())
            .collect();
        manifest.insert(entry.clone(), files);
    }

    let dest = project_dir.join(&config.build.dest);
    let writer = ArtifactWriter::new(&dest, config.build.preserve.clone());
    writer.write(&artifacts, &manifest)?;

    cache.retain_modules(graph.order());
    if let Err(e) = cache.save() {
        eprintln!("warning: failed to save cache: {e}");
    }
    if let Err(e) = cache.gc() {
        eprintln!("warning: cache cleanup failed: {e}");
    }
    if cache.write_failures() > 0 {
        eprintln!(
            "warning: {} cache write(s) failed; affected modules rebuild next run",
            cache.write_failures()
        );
    }

    if !global.quiet {
        eprintln!(
            "    Emitted {} file(s) to {}",
            artifacts.len(),
            dest.display()
        );
        eprintln!("   Build complete.");
    }

    Ok(())
}

/// Transforms every module in the graph, in parallel, cache-first.
///
/// `jobs` caps the worker pool size; the default pool uses one thread per
/// logical CPU. The first failure aborts the whole build.
fn transform_all(
    graph: &ModuleGraph,
    registry: &TransformRegistry,
    cache: &Cache,
    ctx: &ExecuteContext,
    jobs: Option<usize>,
) -> Result<HashMap<PathBuf, TransformOutput>, BuildFailure> {
    let run = || {
        graph
            .order()
            .par_iter()
            .map(|path| {
                let node = graph.node(path).ok_or_else(|| BuildFailure {
                    kind: "graph",
                    path: Some(path.clone()),
                    message: "module missing from graph".to_string(),
                })?;
                let rule = registry.match_rule(path)?;
                let output = execute(node, rule, cache, ctx)?;
                Ok((path.clone(), output))
            })
            .collect::<Result<HashMap<_, _>, BuildFailure>>()
    };

    match jobs {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| {
                    BuildFailure::new("config", format!("cannot build worker pool: {e}"))
                })?;
            pool.install(run)
        }
        None => run(),
    }
}

/// Concatenates chunk bundles and collects side artifacts.
///
/// Returns the artifact set plus the chunk-name → final-filename map used
/// to fill the manifest. Bundle members are joined in the plan's
/// dependencies-first order; side artifacts follow the same module order,
/// so the artifact list is deterministic.
fn assemble_artifacts(
    graph: &ModuleGraph,
    chunks: &BTreeMap<String, Vec<PathBuf>>,
    outputs: &HashMap<PathBuf, TransformOutput>,
    hash_length: usize,
) -> (Vec<BuildArtifact>, BTreeMap<String, String>) {
    let mut artifacts = Vec::new();
    let mut chunk_files = BTreeMap::new();

    for (chunk, modules) in chunks {
        let mut bundle = Vec::new();
        for path in modules {
            if let Some(output) = outputs.get(path) {
                if !bundle.is_empty() {
                    bundle.push(b'\n');
                }
                bundle.extend_from_slice(&output.content);
            }
        }
        let ext = chunk_extension(graph, modules);
        let artifact = BuildArtifact::hashed(&format!("{chunk}.{ext}"), bundle, hash_length);
        chunk_files.insert(chunk.clone(), artifact.name.clone());
        artifacts.push(artifact);
    }

    for path in graph.order() {
        if let Some(output) = outputs.get(path) {
            for side in &output.side {
                artifacts.push(BuildArtifact::named(side.name.clone(), side.bytes.clone()));
            }
        }
    }

    (artifacts, chunk_files)
}

/// Picks the bundle extension for a chunk from its first member's kind.
fn chunk_extension(graph: &ModuleGraph, modules: &[PathBuf]) -> &'static str {
    modules
        .first()
        .and_then(|path| graph.node(path))
        .map(|node| match node.kind {
            lode_common::ModuleKind::Style => "css",
            _ => "js",
        })
        .unwrap_or("js")
}
