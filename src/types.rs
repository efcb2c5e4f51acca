/// Shared domain vocabulary used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raised when a stored or submitted value is outside an enum's vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Generates `as_str`, `FromStr`, `TryFrom<String>` and `Display` for a
/// unit-only enum stored as text.
macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Role of a user inside a workspace or project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

text_enum!(MemberRole, "role", {
    Owner => "OWNER",
    Admin => "ADMIN",
    Member => "MEMBER",
});

impl MemberRole {
    /// OWNER and ADMIN may manage members and join requests
    pub fn can_manage(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, MemberRole::Owner)
    }
}

/// Lifecycle of a join request. PENDING is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(JoinRequestStatus, "status", {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

impl JoinRequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JoinRequestStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardStage {
    InProgress,
    Pending,
    Approved,
    Review,
}

text_enum!(BoardStage, "stage", {
    InProgress => "in_progress",
    Pending => "pending",
    Approved => "approved",
    Review => "review",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardImportance {
    Urgent,
    Normal,
}

text_enum!(BoardImportance, "importance", {
    Urgent => "urgent",
    Normal => "normal",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardRole {
    Developer,
    Planner,
}

text_enum!(BoardRole, "board role", {
    Developer => "developer",
    Planner => "planner",
});

/// Single classification field addressable through the board field endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardField {
    Stage,
    Importance,
    Role,
}

text_enum!(BoardField, "field", {
    Stage => "stage",
    Importance => "importance",
    Role => "role",
});

/// Project-scoped customizable taxonomy families. Each maps to its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Stage,
    Role,
    Importance,
}

text_enum!(TaxonomyKind, "taxonomy", {
    Stage => "stage",
    Role => "role",
    Importance => "importance",
});

impl TaxonomyKind {
    pub fn table(&self) -> &'static str {
        match self {
            TaxonomyKind::Stage => "custom_stages",
            TaxonomyKind::Role => "custom_roles",
            TaxonomyKind::Importance => "custom_importance",
        }
    }

    /// Label used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            TaxonomyKind::Stage => "Custom stage",
            TaxonomyKind::Role => "Custom role",
            TaxonomyKind::Importance => "Custom importance",
        }
    }
}
