//! CLI formatting utilities.
//!
//! Keeps colors and table styling consistent across commands.

mod headers;
mod output;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{print_key_value, print_summary_box};
pub use status::{print_success, print_warning};
pub use tables::{print_group_list, print_target_table};
