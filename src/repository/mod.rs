//! Persistence façades, one per aggregate.
//!
//! Each trait is the capability boundary the services depend on; the `Pg*`
//! types are the PostgreSQL implementations. Lookups that may legitimately
//! miss return `Option` and the service decides which error that becomes.

pub mod board;
pub mod comment;
pub mod participant;
pub mod project;
pub mod taxonomy;
pub mod workspace;

pub use board::{BoardRepository, PgBoardRepository};
pub use comment::{CommentRepository, PgCommentRepository};
pub use participant::{ParticipantRepository, PgParticipantRepository};
pub use project::{PgProjectRepository, ProjectRepository};
pub use taxonomy::{PgTaxonomyRepository, TaxonomyRepository};
pub use workspace::{PgWorkspaceRepository, WorkspaceRepository};

/// Escape LIKE metacharacters and wrap the term for a contains match
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
