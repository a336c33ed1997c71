//! Config discovery command.

use anyhow::Result;
use owo_colors::OwoColorize;
use specshard_core::{discover, Scanner};

use super::Context;

pub fn cmd_scan(ctx: &Context, json: bool) -> Result<()> {
    let configs = Scanner::new(&ctx.workspace_root).scan();
    let projects: Vec<_> = configs
        .iter()
        .map(|config| (config, discover(&ctx.workspace_root, config)))
        .collect();

    if json {
        let data: Vec<_> = projects
            .iter()
            .map(|(config, project)| {
                serde_json::json!({
                    "configFile": config,
                    "projectRoot": project.as_ref().map(|p| p.root_str()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{}", "[Scanning test runner configs...]".bold().cyan());
    println!();

    if projects.is_empty() {
        println!("  {} No test runner configs found", "WARNING:".yellow());
    } else {
        println!(
            "  {} Found {} {}",
            "OK".green(),
            projects.len().to_string().bold().cyan(),
            "configs".bold()
        );
        println!();
        for (config, project) in &projects {
            match project {
                Some(project) => println!(
                    "  {} {}",
                    project.root_str().bold().white(),
                    format!("({})", config.display()).bright_black()
                ),
                None => println!(
                    "  {} {}",
                    config.display().to_string().bright_black(),
                    "(no package.json or project.json, skipped)".yellow()
                ),
            }
        }
    }
    println!();

    Ok(())
}
