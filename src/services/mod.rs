pub mod credentials;

pub use credentials::{CloudCredentials, CredentialError, CredentialService};
