pub mod pdfs;
