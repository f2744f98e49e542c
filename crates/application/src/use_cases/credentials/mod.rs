mod add_credential;
mod list_credentials;
mod remove_credential;

pub use add_credential::AddCredentialUseCase;
pub use list_credentials::ListCredentialsUseCase;
pub use remove_credential::RemoveCredentialUseCase;
