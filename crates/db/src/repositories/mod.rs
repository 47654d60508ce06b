pub mod list_repo;
pub mod task_repo;

pub use list_repo::ListRepo;
pub use task_repo::TaskRepo;
