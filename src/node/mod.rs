//! Protocol node state machines.
//!
//! Every node implements [`GossipNode`]: a round tick against the sampled
//! contact produces messages, and receiving a message mutates the node and
//! may produce a reply. Rumor-spreading nodes add [`EpidemicNode`], averaging
//! nodes add [`AveragingNode`].

pub mod types;
pub mod si;
pub mod sir;
pub mod averaging;

pub use types::{AveragingNode, EpidemicNode, GossipNode, NodeState};
pub use si::SiNode;
pub use sir::SirNode;
pub use averaging::{PushFlowNode, PushSumNode};
