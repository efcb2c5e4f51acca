// handlers/protected - everything under /api. The JWT layer runs before these
// handlers, so `AuthUser` is always present in the extensions.
pub mod board;
pub mod comment;
pub mod participant;
pub mod project;
pub mod project_join_request;
pub mod project_member;
pub mod taxonomy;
pub mod workspace;
