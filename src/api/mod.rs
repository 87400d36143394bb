//! Typed clients for the vendor dashboard API and for deployments.

mod dashboard;
mod deployment;
pub mod http;
pub mod types;

pub use dashboard::DashboardClient;
pub use deployment::DeploymentClient;
pub use types::{
    Deployment, DeploymentCredentials, DeploymentType, DocumentPage, FunctionKind,
    FunctionOutcome, Project, Team,
};
