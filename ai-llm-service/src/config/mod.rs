pub mod default_config;
pub mod llm_model;
pub mod llm_model_config;
