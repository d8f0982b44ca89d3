pub mod commands;
pub mod config;
pub mod document;
pub mod editor;
pub mod export;
pub mod history;
pub mod input;
pub mod notice;
pub mod page;
pub mod shortcuts;
pub mod state;
pub mod storage;
pub mod tools;
pub mod upload;

pub use commands::{CommandOutcome, EditCommand};
pub use config::{EditorConfig, RevisitPolicy};
pub use document::DocumentSession;
pub use editor::Editor;
pub use export::{ExportPipeline, ExportReport, PageExport, PageOutcome};
pub use history::PageHistory;
pub use page::PageSession;
