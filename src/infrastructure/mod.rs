pub mod pdf_converter;

pub use pdf_converter::PdfConverter;
