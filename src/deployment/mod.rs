pub mod error;
pub mod extractor;
pub mod orchestrator;
pub mod state;
pub mod validator;

pub use error::DeployError;
pub use extractor::extract_token_address;
pub use orchestrator::{
    DeploymentOrchestrator, DeploymentSettings, DeploymentStatus, PreparedDeployment, TrackingRun,
};
pub use state::{
    DeployedToken, DeploymentState, DeploymentStore, MemoryDeploymentStore, PendingDeployment,
};
pub use validator::{validate_request, TokenCreationRequest, ValidatedRequest, ValidationError};
