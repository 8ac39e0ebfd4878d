//! Suggestion scoring CLI command.

use clap::Args;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use devflow_core::config::DevflowConfig;
use devflow_core::error::AppError;
use devflow_hooks::builtin::{MatchFlags, score};

/// Match flags of a candidate
#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// A file in the prompt matched
    #[arg(long)]
    pub file: bool,
    /// A keyword in the prompt matched
    #[arg(long)]
    pub keyword: bool,
    /// The working directory matched
    #[arg(long)]
    pub dir: bool,
    /// The active project matched
    #[arg(long)]
    pub project: bool,
}

#[derive(Debug, Serialize)]
struct ScoreReport {
    score: u32,
    min_match_score: u32,
    suggested: bool,
}

/// Execute the score command
pub fn execute(
    args: &ScoreArgs,
    config: &DevflowConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let flags = MatchFlags {
        file_match: args.file,
        keyword_match: args.keyword,
        dir_match: args.dir,
        project_match: args.project,
    };
    let total = score(&flags);
    let min_match_score = config.hooks.suggestions.min_match_score;

    output::print_record(
        &ScoreReport {
            score: total,
            min_match_score,
            suggested: total >= min_match_score,
        },
        format,
    );
    Ok(())
}
