mod admin;
pub mod content;
pub mod dto;
pub mod response;
mod router;
pub mod user;

pub use admin::admin_router;
pub use content::content_router;
pub use router::{AppState, create_router};
pub use user::user_router;
