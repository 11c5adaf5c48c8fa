mod follow_repository;

pub use follow_repository::FollowRepository;
