use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::graph::NodeId;

/// A person highlighted on every graph they appear in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotablePerson {
    pub id: NodeId,
    #[serde(default)]
    pub fields: bool,
    #[serde(default)]
    pub abel: bool,
    #[serde(default)]
    pub note: String,
}

#[derive(Clone, Debug, Default)]
pub struct Notables {
    by_id: HashMap<NodeId, NotablePerson>,
}

impl Notables {
    pub fn new(people: impl IntoIterator<Item = NotablePerson>) -> Self {
        Self {
            by_id: people.into_iter().map(|person| (person.id, person)).collect(),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&NotablePerson> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
