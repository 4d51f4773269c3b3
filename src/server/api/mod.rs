pub mod analytics_controller;
pub mod embed_controller;
pub mod health_controller;
pub mod metadata_controller;
pub mod provider_controller;
