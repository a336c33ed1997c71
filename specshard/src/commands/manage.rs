//! Cache management and workspace checks.

use anyhow::Result;
use specshard_core::{is_plugin_registered, TargetsCache, WorkspaceConfig};

use crate::formatting::{print_key_value, print_success, print_warning};

use super::Context;

pub fn cmd_clear_cache(ctx: &Context) -> Result<()> {
    let cache = TargetsCache::new(ctx.cache_dir());
    let existed = cache.path().exists();
    cache.clear()?;

    if existed {
        print_success("Targets cache cleared");
    } else {
        print_warning("No targets cache to clear");
    }
    print_key_value("Path", &cache.path().display().to_string());
    println!();

    Ok(())
}

pub fn cmd_check_plugin(ctx: &Context, name: &str) -> Result<()> {
    let workspace = WorkspaceConfig::load(&ctx.workspace_root)?;

    if is_plugin_registered(&workspace, name) {
        print_success(&format!("{} is registered", name));
    } else {
        print_warning(&format!("{} is not registered", name));
        let registered: Vec<&str> = workspace.plugins.iter().map(|p| p.name()).collect();
        if !registered.is_empty() {
            print_key_value("Registered", &registered.join(", "));
        }
    }
    println!();

    Ok(())
}
