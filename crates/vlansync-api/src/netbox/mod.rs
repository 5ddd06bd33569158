// NetBox REST API
//
// `client` owns transport mechanics (auth header, pagination, error
// mapping); endpoint groups are inherent methods in sibling modules.

pub mod client;
pub mod devices;
pub mod models;
