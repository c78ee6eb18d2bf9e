//! DocSplit HTTP surface: upload a document, get back its text or its chunks.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
