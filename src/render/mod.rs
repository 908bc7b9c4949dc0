//! Printable documents (SVG) and outbound mail bodies (HTML).

pub mod email;
pub mod format;
pub mod general_invoice;
pub mod invoice;
pub mod statement;
pub mod svg;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

/// A rendered document plus the name it should be saved under.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_stem: String,
    pub body: String,
}

impl Document {
    pub fn svg(file_stem: String, body: String) -> Self {
        Self { file_stem, body }
    }

    pub fn file_name(&self) -> String {
        format!("{}.svg", self.file_stem)
    }
}

impl IntoResponse for Document {
    fn into_response(self) -> Response {
        let disposition = format!(r#"inline; filename="{}""#, self.file_name());
        (
            [
                (CONTENT_TYPE, "image/svg+xml; charset=utf-8".to_string()),
                (CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}
