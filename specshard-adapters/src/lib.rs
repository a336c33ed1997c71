pub mod json_loader;
pub mod toml_loader;

pub use json_loader::JsonLoader;
pub use toml_loader::TomlLoader;

use std::path::Path;

use specshard_core::error::{Error, Result};
use specshard_core::loader::ConfigLoader;

/// Picks the loader for a config file by its extension.
pub fn get_loader(path: &Path) -> Result<Box<dyn ConfigLoader>> {
    let loaders: [Box<dyn ConfigLoader>; 2] = [Box::new(JsonLoader), Box::new(TomlLoader)];
    loaders
        .into_iter()
        .find(|loader| loader.supports(path))
        .ok_or_else(|| Error::UnsupportedConfig(path.to_path_buf()))
}
