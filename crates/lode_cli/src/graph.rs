//! `lode graph` — inspect the resolved module graph and chunk plan.

use lode_graph::{build_graph, plan_chunks, Resolver};

use crate::pipeline::load_project;
use crate::report::BuildFailure;
use crate::{GlobalArgs, GraphArgs};

/// Runs the `lode graph` command.
///
/// Resolves the full module graph and prints it together with the chunk
/// assignment, without transforming or writing anything.
pub fn run(args: &GraphArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match print_graph(global) {
        Ok(()) => Ok(0),
        Err(failure) => {
            failure.report(args.format);
            Ok(1)
        }
    }
}

fn print_graph(global: &GlobalArgs) -> Result<(), BuildFailure> {
    let (project_dir, config) = load_project(global)?;
    let resolver = Resolver::new(
        &project_dir,
        config.resolve.extensions.clone(),
        config.resolve.module_dirs.clone(),
    );
    let graph = build_graph(&config.entries, &resolver)?;
    let plan = plan_chunks(&graph, resolver.module_dirs());

    println!("entries:");
    for (name, path) in graph.entries() {
        println!("  {} -> {}", name, display_relative(&project_dir, path));
    }

    println!("modules ({}):", graph.len());
    for path in graph.order() {
        if let Some(node) = graph.node(path) {
            println!(
                "  {} [{:?}, {} dep(s)]",
                display_relative(&project_dir, path),
                node.kind,
                node.deps.len()
            );
        }
    }

    println!("chunks:");
    for (chunk, modules) in &plan.chunks {
        println!("  {} ({} module(s))", chunk, modules.len());
        if global.verbose {
            for path in modules {
                println!("    {}", display_relative(&project_dir, path));
            }
        }
    }

    println!("load order:");
    for (entry, chunk_order) in &plan.entry_chunks {
        println!("  {}: {}", entry, chunk_order.join(", "));
    }

    Ok(())
}

/// Renders a module path relative to the project root when possible.
fn display_relative(root: &std::path::Path, path: &std::path::Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
