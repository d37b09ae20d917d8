pub mod cluster;
pub mod command;
pub mod common;
pub mod fileformat;
pub mod runtime;

pub use cluster::{
    connected_components_by_offset, ComponentByOffsets, ConsistencyClusterer, ConsistentComponent,
    NucleotideTally,
};
pub use common::{AlignedRead, SignificantRead};
