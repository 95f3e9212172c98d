//! Image generation tools.

mod generate;

pub use generate::ImageGenerateTool;
