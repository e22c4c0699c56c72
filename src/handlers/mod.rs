// handlers/mod.rs - HTTP endpoints under /api/v1
//
// Handlers are thin: extract identity, path, query and body, call the
// resource service, and wrap the result in an ApiResponse.

pub mod comments;
pub mod follow;
pub mod groups;
pub mod jwt;
pub mod posts;
pub mod system;
