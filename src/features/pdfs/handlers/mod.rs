pub mod pdf_handler;

pub use pdf_handler::*;
