//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `Connector` - Opens and checks the backend handles the pool lends out
//! - `QuestionnaireGateway` - Categories, questions, options, outcomes, users, answers
//! - `SessionStateStore` - Transient per-session progress

mod connector;
mod questionnaire_gateway;
mod session_state_store;

pub use connector::{Connector, ConnectorError};
pub use questionnaire_gateway::{recover, GatewayError, QuestionnaireGateway};
pub use session_state_store::SessionStateStore;
