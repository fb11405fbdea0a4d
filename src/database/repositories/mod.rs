pub mod deployment;

pub use deployment::DeploymentRepository;
