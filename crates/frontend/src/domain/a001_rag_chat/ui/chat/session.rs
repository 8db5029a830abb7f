//! RAG Chat - Session state machine
//!
//! `ChatSession` owns everything the page knows about the conversation:
//! the transcript, the pending file selection, the loading flag and the
//! draft question. Every request goes through a `begin_*` transition that
//! raises the loading flag and a `finish_*` transition that consumes the
//! request's `Result` and lowers it again, so the flag is released on every
//! outcome.
//!
//! The session is plain Rust and generic over the file handle type, so the
//! same logic runs against `web_sys::File` in the browser and against
//! in-memory fakes in tests.

use crate::shared::api_error::ApiError;
use async_trait::async_trait;
use contracts::domain::a001_rag_chat::aggregate::ChatMessage;
use contracts::domain::a001_rag_chat::dto::{QueryRequest, QueryResponse, UploadResponse};

pub const QUERY_ERROR_PREFIX: &str = "Error al procesar la consulta: ";
pub const UPLOAD_OK_NOTICE: &str = "Archivos subidos correctamente";
pub const UPLOAD_ERROR_PREFIX: &str = "Error al subir archivos: ";
pub const SOURCES_LABEL: &str = "Fuentes: ";
pub const SOURCES_SEPARATOR: &str = ", ";
pub const THINKING_TEXT: &str = "Pensando...";

/// Transport seam between the session and the RAG backend
#[async_trait(?Send)]
pub trait RagBackend {
    /// Handle of a user-selected file
    type File;

    /// Send every file in one multipart request
    async fn upload(&self, files: &[Self::File]) -> Result<UploadResponse, ApiError>;

    /// Ask one question
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError>;
}

/// Blocking notice shown to the user once an upload settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadNotice {
    Uploaded,
    Failed(ApiError),
}

impl UploadNotice {
    pub fn message(&self) -> String {
        match self {
            UploadNotice::Uploaded => UPLOAD_OK_NOTICE.to_string(),
            UploadNotice::Failed(e) => format!("{}{}", UPLOAD_ERROR_PREFIX, e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession<F> {
    transcript: Vec<ChatMessage>,
    pending_upload: Vec<F>,
    draft: String,
    loading: bool,
    top_k: Option<u32>,
}

impl<F> Default for ChatSession<F> {
    fn default() -> Self {
        Self {
            transcript: Vec::new(),
            pending_upload: Vec::new(),
            draft: String::new(),
            loading: false,
            top_k: None,
        }
    }
}

impl<F> ChatSession<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieval depth attached to every question
    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn pending_upload(&self) -> &[F] {
        &self.pending_upload
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Replace the pending selection with whatever the picker holds now
    pub fn select_files(&mut self, files: Vec<F>) {
        self.pending_upload = files;
    }

    pub fn can_upload(&self) -> bool {
        !self.loading && !self.pending_upload.is_empty()
    }

    pub fn can_send(&self) -> bool {
        !self.loading && !is_blank(&self.draft)
    }

    /// Start an upload of the pending selection.
    ///
    /// Returns the files to send, or `None` when there is nothing to send or
    /// another request is still running. The selection itself stays pending
    /// until the upload succeeds.
    pub fn begin_upload(&mut self) -> Option<Vec<F>>
    where
        F: Clone,
    {
        if !self.can_upload() {
            return None;
        }
        self.loading = true;
        Some(self.pending_upload.clone())
    }

    pub fn finish_upload(&mut self, result: Result<UploadResponse, ApiError>) -> UploadNotice {
        self.loading = false;
        match result {
            Ok(response) => {
                log::debug!("Upload accepted: {}", response.summary());
                self.pending_upload.clear();
                UploadNotice::Uploaded
            }
            Err(e) => {
                log::warn!("Upload failed: {}", e);
                UploadNotice::Failed(e)
            }
        }
    }

    /// Start a query from the current draft.
    ///
    /// Appends the user's turn verbatim, clears the draft and raises the
    /// loading flag. Blank drafts and calls made while another request is
    /// running leave the session untouched and return `None`.
    pub fn begin_send(&mut self) -> Option<QueryRequest> {
        if !self.can_send() {
            return None;
        }
        let question = std::mem::take(&mut self.draft);
        self.transcript.push(ChatMessage::user(question.clone()));
        self.loading = true;
        Some(QueryRequest::new(question).with_top_k(self.top_k))
    }

    pub fn finish_send(&mut self, result: Result<QueryResponse, ApiError>) {
        let reply = match result {
            Ok(response) => ChatMessage::assistant(response.answer).with_sources(response.sources),
            Err(e) => {
                log::warn!("Query failed: {}", e);
                ChatMessage::assistant(format!("{}{}", QUERY_ERROR_PREFIX, e))
            }
        };
        self.transcript.push(reply);
        self.loading = false;
    }

    /// Upload the pending selection and wait for the outcome.
    ///
    /// `None` means the call declined without sending anything.
    pub async fn upload_files<B>(&mut self, backend: &B) -> Option<UploadNotice>
    where
        B: RagBackend<File = F>,
        F: Clone,
    {
        let files = self.begin_upload()?;
        let result = backend.upload(&files).await;
        Some(self.finish_upload(result))
    }

    /// Send the draft as a question and wait for the answer.
    ///
    /// Returns `false` when the call declined without sending anything.
    pub async fn send_question<B>(&mut self, backend: &B) -> bool
    where
        B: RagBackend<File = F>,
    {
        let Some(request) = self.begin_send() else {
            return false;
        };
        let result = backend.query(&request).await;
        self.finish_send(result);
        true
    }
}

/// Blank in the browser's sense: besides Unicode whitespace, a byte order
/// mark (U+FEFF) counts as empty, as it does for `String.prototype.trim`.
fn is_blank(text: &str) -> bool {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
        .is_empty()
}

/// Secondary line listing the files an answer was drawn from
pub fn sources_caption(message: &ChatMessage) -> Option<String> {
    message
        .source_filenames()
        .map(|names| format!("{}{}", SOURCES_LABEL, names.join(SOURCES_SEPARATOR)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_rag_chat::aggregate::{ChatRole, Source};
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// In-memory backend: replays scripted results and records every call
    #[derive(Default)]
    struct FakeBackend {
        upload_results: RefCell<VecDeque<Result<UploadResponse, ApiError>>>,
        query_results: RefCell<VecDeque<Result<QueryResponse, ApiError>>>,
        uploads: RefCell<Vec<Vec<String>>>,
        queries: RefCell<Vec<QueryRequest>>,
    }

    impl FakeBackend {
        fn answering(results: Vec<Result<QueryResponse, ApiError>>) -> Self {
            Self {
                query_results: RefCell::new(results.into()),
                ..Default::default()
            }
        }

        fn uploading(results: Vec<Result<UploadResponse, ApiError>>) -> Self {
            Self {
                upload_results: RefCell::new(results.into()),
                ..Default::default()
            }
        }
    }

    #[async_trait(?Send)]
    impl RagBackend for FakeBackend {
        type File = String;

        async fn upload(&self, files: &[String]) -> Result<UploadResponse, ApiError> {
            self.uploads.borrow_mut().push(files.to_vec());
            self.upload_results
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(UploadResponse::default()))
        }

        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
            self.queries.borrow_mut().push(request.clone());
            self.query_results
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted answer".into())))
        }
    }

    fn answer(text: &str) -> Result<QueryResponse, ApiError> {
        Ok(QueryResponse {
            answer: text.to_string(),
            sources: None,
        })
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_send_question_with_sources() {
        let backend = FakeBackend::answering(vec![Ok(QueryResponse {
            answer: "5 days".into(),
            sources: Some(vec![Source::new("policy.pdf")]),
        })]);
        let mut session = ChatSession::<String>::new();
        session.set_draft("What is the leave policy?");

        assert!(block_on(session.send_question(&backend)));

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, ChatRole::User);
        assert_eq!(transcript[0].content, "What is the leave policy?");
        assert_eq!(transcript[1].role, ChatRole::Assistant);
        assert_eq!(transcript[1].content, "5 days");
        assert_eq!(
            sources_caption(&transcript[1]).as_deref(),
            Some("Fuentes: policy.pdf")
        );
        assert_eq!(session.draft(), "");
        assert!(!session.is_loading());
        assert_eq!(
            backend.queries.borrow()[0].question,
            "What is the leave policy?"
        );
    }

    #[test]
    fn test_send_question_network_error() {
        let backend = FakeBackend::answering(vec![Err(ApiError::Network("timeout".into()))]);
        let mut session = ChatSession::<String>::new();
        session.set_draft("¿Horario de verano?");

        assert!(block_on(session.send_question(&backend)));

        let reply = &session.transcript()[1];
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.content, "Error al procesar la consulta: timeout");
        assert_eq!(reply.sources, None);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_send_question_http_error() {
        let backend = FakeBackend::answering(vec![Err(ApiError::Status(500))]);
        let mut session = ChatSession::<String>::new();
        session.set_draft("hola");

        block_on(session.send_question(&backend));

        assert_eq!(
            session.transcript()[1].content,
            "Error al procesar la consulta: Request failed with status code 500"
        );
        assert!(!session.is_loading());
    }

    #[test]
    fn test_blank_question_is_ignored() {
        let backend = FakeBackend::default();
        let mut session = ChatSession::<String>::new();

        for blank in ["", "   ", "\n\t "] {
            session.set_draft(blank);
            assert!(!block_on(session.send_question(&backend)));
            assert!(session.transcript().is_empty());
            assert_eq!(session.draft(), blank);
            assert!(!session.is_loading());
        }
        assert!(backend.queries.borrow().is_empty());
    }

    #[test]
    fn test_byte_order_mark_draft_is_blank() {
        let backend = FakeBackend::default();
        let mut session = ChatSession::<String>::new();

        for blank in ["\u{FEFF}", " \u{FEFF}\u{00A0}\n", "\u{3000}"] {
            session.set_draft(blank);
            assert!(!session.can_send());
            assert!(session.begin_send().is_none());
            assert!(!block_on(session.send_question(&backend)));
            assert!(session.transcript().is_empty());
            assert!(!session.is_loading());
        }
        assert!(backend.queries.borrow().is_empty());

        session.set_draft("\u{FEFF}hola");
        assert!(session.can_send());
    }

    #[test]
    fn test_transcript_grows_by_two_per_question() {
        let questions = ["uno", "  dos  ", "tres"];
        let backend = FakeBackend::answering(vec![
            answer("1"),
            Err(ApiError::Network("Network Error".into())),
            answer("3"),
        ]);
        let mut session = ChatSession::<String>::new();

        for (i, q) in questions.iter().enumerate() {
            session.set_draft(*q);
            block_on(session.send_question(&backend));
            assert_eq!(session.transcript().len(), 2 * (i + 1));
            assert!(!session.is_loading());
        }

        let roles: Vec<ChatRole> = session.transcript().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant,
            ]
        );
        // the draft is stored and sent untrimmed
        assert_eq!(session.transcript()[2].content, "  dos  ");
        assert_eq!(backend.queries.borrow()[1].question, "  dos  ");
    }

    #[test]
    fn test_begin_send_clears_draft_before_answer() {
        let mut session = ChatSession::<String>::new().with_top_k(Some(3));
        session.set_draft("pregunta");

        let request = session.begin_send().unwrap();

        assert_eq!(request, QueryRequest::new("pregunta").with_top_k(Some(3)));
        assert_eq!(session.draft(), "");
        assert!(session.is_loading());
        assert_eq!(session.transcript().len(), 1);
        assert!(!session.can_send());
    }

    #[test]
    fn test_no_second_request_while_loading() {
        let mut session = ChatSession::<String>::new();
        session.select_files(files(&["a.pdf"]));
        session.set_draft("primera");
        assert!(session.begin_send().is_some());

        session.set_draft("segunda");
        assert!(session.begin_send().is_none());
        assert!(session.begin_upload().is_none());
        assert!(!session.can_upload());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.draft(), "segunda");

        session.finish_send(answer("ok"));
        assert!(session.can_send());
        assert!(session.can_upload());
    }

    #[test]
    fn test_upload_success_clears_selection() {
        let backend = FakeBackend::uploading(vec![Ok(UploadResponse::default())]);
        let mut session = ChatSession::new();
        session.select_files(files(&["contrato.pdf", "vacaciones.docx"]));

        let notice = block_on(session.upload_files(&backend));

        assert_eq!(notice, Some(UploadNotice::Uploaded));
        assert_eq!(notice.unwrap().message(), "Archivos subidos correctamente");
        assert!(session.pending_upload().is_empty());
        assert!(!session.is_loading());
        assert_eq!(
            *backend.uploads.borrow(),
            vec![files(&["contrato.pdf", "vacaciones.docx"])]
        );
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_upload_failure_keeps_selection() {
        let backend = FakeBackend::uploading(vec![Err(ApiError::Status(413))]);
        let mut session = ChatSession::new();
        session.select_files(files(&["grande.pdf"]));

        let notice = block_on(session.upload_files(&backend)).unwrap();

        assert_eq!(
            notice.message(),
            "Error al subir archivos: Request failed with status code 413"
        );
        assert_eq!(session.pending_upload(), &files(&["grande.pdf"])[..]);
        assert!(!session.is_loading());
        assert!(session.can_upload());
    }

    #[test]
    fn test_upload_with_empty_selection_is_ignored() {
        let backend = FakeBackend::default();
        let mut session = ChatSession::<String>::new();

        assert_eq!(block_on(session.upload_files(&backend)), None);

        session.select_files(Vec::new());
        assert_eq!(block_on(session.upload_files(&backend)), None);

        assert!(backend.uploads.borrow().is_empty());
        assert!(session.pending_upload().is_empty());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_select_files_replaces_selection() {
        let mut session = ChatSession::new();
        session.select_files(files(&["a.pdf", "b.pdf"]));
        session.select_files(files(&["c.pdf"]));
        assert_eq!(session.pending_upload(), &files(&["c.pdf"])[..]);
    }

    #[test]
    fn test_sources_caption() {
        let msg = ChatMessage::assistant("x").with_sources(Some(vec![
            Source::new("a.pdf"),
            Source::new("b.txt"),
        ]));
        assert_eq!(sources_caption(&msg).as_deref(), Some("Fuentes: a.pdf, b.txt"));

        let empty = ChatMessage::assistant("x").with_sources(Some(Vec::new()));
        assert_eq!(sources_caption(&empty), None);
        assert_eq!(sources_caption(&ChatMessage::assistant("x")), None);
    }
}
