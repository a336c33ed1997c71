//! Command implementations for the CLI.

mod discovery;
mod manage;
mod targets;

use std::path::{Path, PathBuf};

use anyhow::Result;
use specshard_adapters::get_loader;
use specshard_core::plugin::DEFAULT_CACHE_DIR;
use specshard_core::{
    PluginOptions, ProjectNode, Scanner, TargetSynthesizer, TargetsAccumulator, TargetsCache,
};
use tracing::warn;

use crate::formatting::print_summary_box;

pub use discovery::cmd_scan;
pub use manage::{cmd_check_plugin, cmd_clear_cache};
pub use targets::{cmd_graph, cmd_show};

/// Settings shared by every command.
pub struct Context {
    pub workspace_root: PathBuf,
    pub cache_dir: Option<PathBuf>,
    pub options: PluginOptions,
}

impl Context {
    fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| self.workspace_root.join(DEFAULT_CACHE_DIR))
    }

    fn synthesizer(&self, no_cache: bool) -> Result<TargetSynthesizer> {
        let synthesizer = TargetSynthesizer::for_workspace(
            &self.workspace_root,
            self.options.clone(),
            Some(self.cache_dir()),
            |path: &Path| get_loader(path),
        )?;

        if no_cache {
            // Start empty but still flush to the same file.
            Ok(synthesizer.with_cache(TargetsCache::new(self.cache_dir())))
        } else {
            Ok(synthesizer)
        }
    }
}

/// Runs synthesis over every config in the workspace, in scan order.
///
/// The cache is flushed once at the end; a failed flush is only logged.
fn synthesize_all(ctx: &Context, no_cache: bool) -> Result<(TargetSynthesizer, Vec<ProjectNode>)> {
    let mut synthesizer = ctx.synthesizer(no_cache)?;
    let configs = Scanner::new(&ctx.workspace_root).scan();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;

    let mut accumulator = TargetsAccumulator::new();
    let mut nodes = Vec::new();
    rt.block_on(async {
        for config in &configs {
            if let Some(node) = synthesizer.create_nodes(config, &mut accumulator).await? {
                nodes.push(node);
            }
        }
        Ok::<_, specshard_core::Error>(())
    })?;

    if let Err(err) = synthesizer.flush(&accumulator) {
        warn!(error = %err, "failed to write targets cache");
    }

    Ok((synthesizer, nodes))
}

fn print_cache_stats(synthesizer: &TargetSynthesizer) {
    let stats = synthesizer.cache().stats();
    let hit_rate = stats.hit_rate() * 100.0;
    print_summary_box(
        "Targets Cache",
        &[
            ("Hit Rate", &format!("{:.0}%", hit_rate)),
            ("Hits", &stats.hits.to_string()),
            ("Misses", &stats.misses.to_string()),
        ],
    );
    println!();
}
