
pub use mock_repositories::*;
