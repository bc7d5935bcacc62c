pub mod moisture_sensor;
pub mod resistance_sensor;
pub mod sensor;
pub mod stream_parser;
pub mod temperature_sensor;
