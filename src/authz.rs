//! Tag-based authorization.
//!
//! A user's hierarchy level is the highest level among their recognized tags.
//! Most capability flags are level comparisons; a few gates are tag-identity
//! checks that higher ranks do not inherit.

use std::collections::BTreeSet;

use crate::types::Tag;
use crate::user::User;

pub const SPOTTER_CXJ: &str = "spotter_cxj";
pub const AVALIADOR: &str = "avaliador";
pub const JORNALISTA: &str = "jornalista";
pub const DIRETOR_AEROPORTO: &str = "diretor_aeroporto";
pub const COLABORADOR: &str = "colaborador";
pub const PRODUTOR: &str = "produtor";
pub const GESTAO: &str = "gestao";
pub const ADMIN: &str = "admin";
pub const LIDER: &str = "lider";

const CANONICAL_TIERS: &[(&str, u8)] = &[
    (SPOTTER_CXJ, 1),
    (AVALIADOR, 2),
    (COLABORADOR, 3),
    (PRODUTOR, 4),
    (GESTAO, 5),
    (ADMIN, 6),
    (LIDER, 7),
];

const EXTENDED_TIERS: &[(&str, u8)] = &[
    (SPOTTER_CXJ, 1),
    (AVALIADOR, 2),
    (JORNALISTA, 2),
    (DIRETOR_AEROPORTO, 2),
    (COLABORADOR, 3),
    (PRODUTOR, 4),
    (GESTAO, 5),
    (ADMIN, 6),
    (LIDER, 7),
];

/// Static mapping from tag name to hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyTable {
    tiers: &'static [(&'static str, u8)],
}

impl HierarchyTable {
    /// The seven-tier table, `spotter_cxj` = 1 up to `lider` = 7.
    #[must_use]
    pub const fn canonical() -> Self {
        Self {
            tiers: CANONICAL_TIERS,
        }
    }

    /// The canonical table plus `jornalista` and `diretor_aeroporto`, both at
    /// the `avaliador` level.
    #[must_use]
    pub const fn extended() -> Self {
        Self {
            tiers: EXTENDED_TIERS,
        }
    }

    /// Level of a single tag, `None` if the tag is not in the table.
    #[must_use]
    pub fn level_of(&self, tag: &str) -> Option<u8> {
        self.tiers
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, level)| *level)
    }

    /// Highest level among `tags`; 0 when none is recognized.
    #[must_use]
    pub fn level<'a, I>(&self, tags: I) -> u8
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        tags.into_iter()
            .filter_map(|t| self.level_of(t.as_str()))
            .max()
            .unwrap_or(0)
    }

    fn threshold(&self, tag: &str) -> u8 {
        // Every threshold tag is present in both tables.
        self.level_of(tag).unwrap_or(u8::MAX)
    }
}

impl Default for HierarchyTable {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Capability view over a user's tags.
///
/// Holds the raw tag set and recomputes every flag on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    table: HierarchyTable,
    tags: BTreeSet<Tag>,
    is_vip: bool,
    approved: bool,
}

impl Capabilities {
    /// Capabilities of `user`, or of an anonymous visitor when `None`.
    #[must_use]
    pub fn for_user(user: Option<&User>, table: HierarchyTable) -> Self {
        match user {
            Some(u) => Self {
                table,
                tags: u.tags.clone(),
                is_vip: u.is_vip,
                approved: u.approved,
            },
            None => Self::anonymous(table),
        }
    }

    #[must_use]
    pub fn anonymous(table: HierarchyTable) -> Self {
        Self {
            table,
            tags: BTreeSet::new(),
            is_vip: false,
            approved: false,
        }
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.table.level(&self.tags)
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.as_str() == tag)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.at_least(ADMIN)
    }

    /// Holds the `lider` tag itself. Not a level comparison.
    #[must_use]
    pub fn is_admin_principal(&self) -> bool {
        self.has_tag(LIDER)
    }

    #[must_use]
    pub fn is_gestao(&self) -> bool {
        self.at_least(GESTAO)
    }

    #[must_use]
    pub fn is_avaliador(&self) -> bool {
        self.at_least(AVALIADOR)
    }

    /// Level-based, or unlocked by the VIP flag regardless of tags.
    #[must_use]
    pub fn is_colaborador(&self) -> bool {
        self.is_vip || self.at_least(COLABORADOR)
    }

    /// Evaluation-queue gate: requires the `avaliador` tag itself.
    #[must_use]
    pub fn can_evaluate(&self) -> bool {
        self.has_tag(AVALIADOR)
    }

    /// Contribution features (uploads) follow the approval flag only.
    #[must_use]
    pub fn can_contribute(&self) -> bool {
        self.approved
    }

    #[must_use]
    pub fn is_vip(&self) -> bool {
        self.is_vip
    }

    fn at_least(&self, tag: &str) -> bool {
        let level = self.level();
        level > 0 && level >= self.table.threshold(tag)
    }
}
