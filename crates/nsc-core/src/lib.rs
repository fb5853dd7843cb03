//! NoSQL Console Core
//!
//! Value model, error taxonomy, configuration, result rendering and the
//! page controller shared by the store adapters and the web server.

pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod render;
pub mod session;
pub mod value;

pub use config::{AppConfig, ConnectionConfig, PolicyConfig};
pub use document::{Namespace, OperationKind, QueryOutcome, QuerySpec};
pub use error::{ConsoleError, ConsoleResult, ErrorKind};
pub use graph::{
    CypherQuery, GraphNode, GraphPath, GraphRelationship, GraphStatistics, NodeId,
    RelationshipId,
};
pub use session::{Panel, SessionContext};
pub use value::{FieldValue, Record};
