pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;

pub use repository::MediaRepository;
pub use repository_pg::MediaRepositoryPg;
pub use schema::MediaEntity;
pub use service::MediaService;
