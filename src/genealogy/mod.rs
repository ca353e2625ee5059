//! Input data model: genealogy graph snapshots as delivered by the data
//! service, plus the notable-person list and preset catalogue.

mod graph;
mod load;
mod notable;
mod preset;

pub use graph::{
    GenealogyAdvisor, GenealogyEdge, GenealogyNode, GenealogyNodeDissertation,
    GenealogyNodeStudent, Graph, NodeId,
};
pub use load::{load_graph, load_notables, parse_graph};
pub use notable::{NotablePerson, Notables};
pub use preset::Preset;
