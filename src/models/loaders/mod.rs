pub mod exam_store;

pub use exam_store::{load_exam, save_exam};
