//! Relationships between entities.
//!
//! Each kind carries exactly the fields it needs. The field `key` is the name
//! used on the source entity; it equals the alias once the registry has applied
//! its defaults.

use std::fmt;

/// Discriminant of an [`Association`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    BelongsTo,
    HasMany,
    BelongsToMany,
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelongsTo => write!(f, "BelongsTo"),
            Self::HasMany => write!(f, "HasMany"),
            Self::BelongsToMany => write!(f, "BelongsToMany"),
        }
    }
}

/// A directed relationship from the entity that declares it to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    /// The source row holds `foreign_key` pointing at the target's primary key.
    BelongsTo {
        key: String,
        target: String,
        foreign_key: String,
        alias: String,
    },
    /// Target rows hold `foreign_key` pointing at the source's primary key.
    HasMany {
        key: String,
        target: String,
        foreign_key: String,
        alias: String,
    },
    /// Rows of the `through` entity pair the source (`foreign_key`) with the
    /// target (`other_key`).
    BelongsToMany {
        key: String,
        target: String,
        through: String,
        foreign_key: String,
        other_key: String,
        alias: String,
    },
}

impl Association {
    pub fn kind(&self) -> AssociationKind {
        match self {
            Self::BelongsTo { .. } => AssociationKind::BelongsTo,
            Self::HasMany { .. } => AssociationKind::HasMany,
            Self::BelongsToMany { .. } => AssociationKind::BelongsToMany,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::BelongsTo { key, .. }
            | Self::HasMany { key, .. }
            | Self::BelongsToMany { key, .. } => key,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::BelongsTo { target, .. }
            | Self::HasMany { target, .. }
            | Self::BelongsToMany { target, .. } => target,
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            Self::BelongsTo { alias, .. }
            | Self::HasMany { alias, .. }
            | Self::BelongsToMany { alias, .. } => alias,
        }
    }

    pub fn foreign_key(&self) -> &str {
        match self {
            Self::BelongsTo { foreign_key, .. }
            | Self::HasMany { foreign_key, .. }
            | Self::BelongsToMany { foreign_key, .. } => foreign_key,
        }
    }

    /// Join entity of a many-to-many association.
    pub fn through(&self) -> Option<&str> {
        match self {
            Self::BelongsToMany { through, .. } => Some(through),
            _ => None,
        }
    }

    /// Whether this association is exposed as a paginated connection.
    pub fn is_connection(&self) -> bool {
        !matches!(self, Self::BelongsTo { .. })
    }
}

/// Options for `belongs_to` and `has_many` declarations.
#[derive(Debug, Clone, Default)]
pub struct AssociationOptions {
    pub alias: Option<String>,
    pub foreign_key: Option<String>,
}

impl AssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the association field (`as`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }
}

/// Options for `belongs_to_many` declarations.
#[derive(Debug, Clone)]
pub struct ThroughOptions {
    pub through: String,
    pub alias: Option<String>,
    pub foreign_key: Option<String>,
    pub other_key: Option<String>,
}

impl ThroughOptions {
    pub fn new(through: impl Into<String>) -> Self {
        Self {
            through: through.into(),
            alias: None,
            foreign_key: None,
            other_key: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Join attribute pointing at the declaring entity.
    pub fn foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    /// Join attribute pointing at the target entity.
    pub fn other_key(mut self, other_key: impl Into<String>) -> Self {
        self.other_key = Some(other_key.into());
        self
    }
}
