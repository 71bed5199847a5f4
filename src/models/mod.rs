pub mod attachment;
pub mod exam;
pub mod loaders;
pub mod question;

pub use attachment::Attachment;
pub use exam::{Exam, ExportMode};
pub use loaders::{load_exam, save_exam};
pub use question::{ExamRequest, Question};
