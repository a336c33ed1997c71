//! Target synthesis and inspection commands.

use anyhow::Result;
use owo_colors::OwoColorize;
use specshard_core::TargetGraph;

use crate::formatting::{print_group_list, print_section_header, print_target_table, SectionStyle};

use super::{print_cache_stats, synthesize_all, Context};

pub fn cmd_show(ctx: &Context, json: bool, no_cache: bool) -> Result<()> {
    let (synthesizer, nodes) = synthesize_all(ctx, no_cache)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    print_section_header("Synthesized Targets", SectionStyle::Primary);

    if nodes.is_empty() {
        println!("  {} No projects found", "WARNING:".yellow());
        println!();
    }

    for node in &nodes {
        println!(
            "  {} {}",
            node.root.bold().white(),
            format!("({} targets)", node.targets.len()).bright_black()
        );
        print_target_table(&node.targets);
        for (group, members) in &node.metadata.target_groups {
            print_group_list(group, members);
        }
        println!();
    }

    print_cache_stats(&synthesizer);
    Ok(())
}

pub fn cmd_graph(ctx: &Context, project: &str) -> Result<()> {
    let (_, nodes) = synthesize_all(ctx, false)?;
    let wanted = specshard_core::path_utils::normalize(project);

    let node = nodes
        .iter()
        .find(|node| node.root == wanted)
        .ok_or_else(|| {
            let available: Vec<&str> = nodes.iter().map(|n| n.root.as_str()).collect();
            anyhow::anyhow!(
                "Project not found: {}. Available projects: {}",
                project,
                available.join(", ")
            )
        })?;

    let graph = TargetGraph::new(&node.targets)?;
    let order = graph.topological_order();

    print_section_header(&format!("Target Order for {}", node.root), SectionStyle::Primary);

    if order.is_empty() {
        println!("  {} No targets", "WARNING:".yellow());
    } else {
        for (idx, target) in order.iter().enumerate() {
            let deps = graph.dependencies(target)?;
            let suffix = if deps.is_empty() {
                String::new()
            } else {
                format!("(after {} targets)", deps.len())
            };
            println!(
                "  {} {} {}",
                format!("{:2}", idx + 1).bright_black(),
                target.bold().white(),
                suffix.bright_black()
            );
        }
    }
    println!();

    Ok(())
}
