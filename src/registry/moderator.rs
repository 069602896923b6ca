//! Moderator predicate used when assigning roles at join time

use std::collections::HashSet;

use crate::types::Node;

/// Decides whether a joining node becomes a moderator
pub trait ModeratorCheck: Send + Sync {
    fn is_moderator(&self, node: &Node) -> bool;
}

/// Moderators listed by base name
#[derive(Debug, Clone, Default)]
pub struct ModeratorList {
    names: HashSet<String>,
}

impl ModeratorList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ModeratorCheck for ModeratorList {
    fn is_moderator(&self, node: &Node) -> bool {
        self.names.contains(node.base_name())
    }
}
