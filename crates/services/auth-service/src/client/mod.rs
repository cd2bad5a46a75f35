//! Access to the user accounts the auth service works on.

mod user_directory;

pub use user_directory::{RepositoryDirectory, UserDirectory};

#[cfg(any(test, feature = "test-utils"))]
pub use user_directory::MockUserDirectory;
