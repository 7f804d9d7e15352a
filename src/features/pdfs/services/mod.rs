mod pdf_service;

pub use pdf_service::PdfService;
