mod pdf_dto;

pub use pdf_dto::*;
