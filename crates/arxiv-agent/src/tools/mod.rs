//! The research tools that models can use.

mod read_pdf;
mod render;
mod search;

pub use read_pdf::{ReadPdfError, ReadPdfTool};
pub use render::{RenderConfig, RenderError, RenderLatexTool};
pub use search::{ArxivConfig, ArxivSearchTool, Paper, SearchError};
