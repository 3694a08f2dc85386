//! Rendering helpers (text and markdown) for human-readable output and artifacts.

mod markdown;
mod report;
mod text;

pub use markdown::{
    render_patch_md, render_pipeline_md, render_plan_md, render_report_md, render_warnings_md,
};
pub use report::{extend_with_patch, render_lines, warning_report};
pub use text::{render_patch_text, render_pipeline_text, render_plan_text, render_text};
