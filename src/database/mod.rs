pub mod models;
pub mod mongodb;
pub mod repositories;

pub use mongodb::MongoDbClient;
pub use repositories::DeploymentRepository;
