mod loader;

pub use loader::{number_pages, DocumentError, PdfLoader};
