pub mod circularity;
pub mod edge;
pub mod flow_network;
