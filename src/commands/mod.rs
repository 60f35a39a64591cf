mod analyze;
mod prompts;
mod render;
mod styles;

pub use analyze::run_analyze;
pub use prompts::run_prompts;
pub use render::run_render;
pub use styles::run_styles;
