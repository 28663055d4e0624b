//! Transform chain execution with cache short-circuit.
//!
//! For each module the executor computes the source content hash, consults
//! the incremental cache under (path, content hash, chain key), and only
//! on a miss runs the step chain. The chain key folds the build-wide
//! settings steps read (mode, hash length) into the chain identity, so a
//! settings change misses the cache instead of serving output produced
//! under the old settings. Steps run in registered order with pipeline
//! semantics: step N's output is step N+1's input, and side outputs
//! accumulate across steps. A failing step aborts the chain and nothing
//! is written.

use lode_cache::Cache;
use lode_common::ContentHash;
use lode_config::BuildMode;
use lode_graph::ModuleNode;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::registry::MatchedRule;
use crate::step::{SideOutput, StepContext};

/// Build-wide settings for transform execution.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteContext {
    /// The build mode.
    pub mode: BuildMode,
    /// Hash length for side-artifact filenames.
    pub hash_length: usize,
}

impl ExecuteContext {
    /// Cache key component covering everything that can change a chain's
    /// output: the chain identity plus the settings steps read from the
    /// context.
    fn chain_key(&self, chain: ContentHash) -> ContentHash {
        let tag = format!("{chain}:{}:{}", self.mode.as_str(), self.hash_length);
        ContentHash::from_bytes(tag.as_bytes())
    }
}

/// The final output of a module's transform chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOutput {
    /// Transformed module content.
    pub content: Vec<u8>,
    /// Side outputs emitted by the chain, in emission order.
    pub side: Vec<SideOutput>,
}

/// Runs a module's matched transform chain, consulting the cache first.
///
/// On a cache hit the stored output is returned without rerunning any
/// step. On a miss the chain runs and the result is recorded fail-safely.
pub fn execute(
    node: &ModuleNode,
    rule: MatchedRule<'_>,
    cache: &Cache,
    ctx: &ExecuteContext,
) -> Result<TransformOutput, TransformError> {
    let content_hash = ContentHash::from_bytes(&node.content);
    let chain_key = ctx.chain_key(rule.chain);

    if let Some(payload) = cache.get(&node.path, content_hash, chain_key) {
        // An undecodable payload is treated as a miss and rebuilt.
        if let Ok((output, _)) = bincode::serde::decode_from_slice::<TransformOutput, _>(
            &payload,
            bincode::config::standard(),
        ) {
            return Ok(output);
        }
    }

    let step_ctx = StepContext {
        module: &node.path,
        mode: ctx.mode,
        hash_length: ctx.hash_length,
    };

    let mut content = node.content.clone();
    let mut side = Vec::new();
    for step in rule.steps {
        let out = step
            .apply(&content, &step_ctx)
            .map_err(|reason| TransformError::Step {
                step: step.name(),
                path: node.path.clone(),
                reason,
            })?;
        content = out.content;
        side.extend(out.side);
    }

    let output = TransformOutput { content, side };

    if let Ok(payload) = bincode::serde::encode_to_vec(&output, bincode::config::standard()) {
        cache.put(&node.path, content_hash, chain_key, &payload);
    }

    Ok(output)
}
