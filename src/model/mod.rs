//! Domain model - edge nodes, compliance metrics and the system snapshot

mod inference;
mod node;
mod state;

pub use inference::{Activation, InferenceModel, Layer, Shape};
pub use node::{ComplianceMetric, ComplianceStatus, EdgeNode, Location, NodeStatus, NodeUpdate, Trend};
pub use state::{NemiState, TemporalScale, MAX_ACCURACY};
