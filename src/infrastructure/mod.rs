//! 基础设施层
//!
//! 持有稀缺资源（文件系统、无头浏览器 Page），只暴露能力，不认识流程

pub mod browser;
pub mod exporter;
pub mod source_ingestor;

pub use browser::launch_headless_browser;
pub use exporter::{
    export_with_fallback, ExportOptions, HtmlExporter, PageFormat, PaperExporter, PdfExporter,
};
pub use source_ingestor::{ingest_dir, ingest_files, IngestReport};
