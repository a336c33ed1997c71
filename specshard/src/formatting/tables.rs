//! Table formatting utilities using comfy-table.

use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use specshard_core::target::NOOP_EXECUTOR;
use specshard_core::Targets;

/// Prints one row per target: what it runs, what it waits for, what it
/// produces.
pub fn print_target_table(targets: &Targets) {
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Target").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Runs").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Depends On").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Outputs").add_attribute(comfy_table::Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);

    for (name, spec) in targets {
        let runs = match (&spec.command, &spec.executor) {
            (Some(command), _) => command.clone(),
            (None, Some(executor)) if executor == NOOP_EXECUTOR => "(aggregate)".to_string(),
            (None, Some(executor)) => executor.clone(),
            (None, None) => String::new(),
        };
        let depends_on = if spec.depends_on.is_empty() {
            String::new()
        } else {
            format!("{} targets", spec.depends_on.len())
        };

        table.add_row(vec![
            Cell::new(name).fg(comfy_table::Color::White),
            Cell::new(runs),
            Cell::new(depends_on).fg(comfy_table::Color::DarkGrey),
            Cell::new(spec.outputs.join("\n")).fg(comfy_table::Color::DarkGrey),
        ]);
    }

    println!("{}", table);
}

/// Prints a target group and its members (one per line).
pub fn print_group_list(group: &str, members: &[String]) {
    println!("  {} {}", "group".bright_black(), group.bold().cyan());
    if members.is_empty() {
        println!("    {} {}", "→".cyan(), "(none)".bright_black());
        return;
    }

    for member in members {
        println!("    {} {}", "→".cyan(), member.white());
    }
}
