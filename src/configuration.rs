pub mod file_configuration;
pub mod main_configuration;
