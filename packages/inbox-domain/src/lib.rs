pub mod attachment;
pub mod filename;
pub mod inbound;
pub mod notification;
pub mod recipient;
pub mod source;

/// Job name consumed by the document processing pipeline.
pub const PROCESS_DOCUMENT_EVENT: &str = "process-document";
