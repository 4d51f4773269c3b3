pub mod analytics_dto;
pub mod health_dto;
pub mod metadata_dto;
pub mod provider_dto;
