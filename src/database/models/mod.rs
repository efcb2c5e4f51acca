pub mod board;
pub mod comment;
pub mod participant;
pub mod project;
pub mod taxonomy;
pub mod workspace;

pub use board::{Board, BoardFilter, NewBoard};
pub use comment::Comment;
pub use participant::Participant;
pub use project::{NewProject, Project, ProjectJoinRequest, ProjectMember};
pub use taxonomy::TaxonomyItem;
pub use workspace::{NewWorkspace, Workspace, WorkspaceJoinRequest, WorkspaceMember};

/// One page of rows plus the total matching count
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}
