pub mod question;
pub mod request;

pub use question::{BlockKind, ExamInfo, McqRecord, QuestionSet, RawBlock};
pub use request::{GenerateRequest, GenerateResponse, UploadedFile};
