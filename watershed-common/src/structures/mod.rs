// private sub-module defined in other files
mod drainage_network;

// exports identifiers from private sub-modules in the current module namespace
pub use self::drainage_network::ContributingStream;
pub use self::drainage_network::OUTLET_NODE_TYPE;
pub use self::drainage_network::DrainageNetwork;
pub use self::drainage_network::DrainageSource;
pub use self::drainage_network::Reach;
pub use self::drainage_network::StreamId;
pub use self::drainage_network::StreamNode;
pub use self::drainage_network::TopologyError;
