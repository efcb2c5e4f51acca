//! Business rules. Services take the authenticated caller, run membership
//! and role checks against the repositories and return response DTOs.

pub mod access;
pub mod board;
pub mod comment;
pub mod enrichment;
pub mod participant;
pub mod project;
pub mod project_join_request;
pub mod project_member;
pub mod taxonomy;
pub mod workspace;

pub use board::BoardService;
pub use comment::CommentService;
pub use enrichment::ProfileDirectory;
pub use participant::ParticipantService;
pub use project::ProjectService;
pub use project_join_request::ProjectJoinRequestService;
pub use project_member::ProjectMemberService;
pub use taxonomy::TaxonomyService;
pub use workspace::WorkspaceService;
