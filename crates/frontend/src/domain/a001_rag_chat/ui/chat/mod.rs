//! RAG Chat UI Module (MVVM Standard)
//!
//! Structure:
//! - model.rs: HTTP transport and API functions
//! - session.rs: ChatSession state machine and the RagBackend seam
//! - view_model.rs: RagChatVm with RwSignals
//! - view.rs: Main component RagChat

mod model;
mod session;
mod view;
mod view_model;

pub use model::HttpBackend;
pub use session::{ChatSession, RagBackend, UploadNotice};
pub use view::RagChat;
pub use view_model::RagChatVm;
