pub mod credentials;
pub mod records;

pub use credentials::{AddCredentialUseCase, ListCredentialsUseCase, RemoveCredentialUseCase};
pub use records::{
    CreateRecordUseCase, DeleteRecordUseCase, GetRecordsUseCase, RecordPolicy,
    UpdateRecordUseCase, UpsertRecordUseCase,
};
