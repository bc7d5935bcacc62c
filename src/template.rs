use pad::{Alignment, PadStr};

use crate::{
    configuration::{file_configuration::FileConfiguration, main_configuration},
    link::ConnectionStatus,
    record::SoilObservationRecord,
    snapshot::SensorSnapshot,
};

const SNAPSHOT_TXT: &str = include_str!("templates/snapshot.txt");
const RECORD_TXT: &str = include_str!("templates/record.txt");
const CONFIGURATION_TXT: &str = include_str!("templates/configuration.txt");

const RECORD_DATE_FORMAT: &str = "%b %-d, %Y, %I:%M %p";
const SITE_WIDTH: usize = 24;
const SETTING_WIDTH: usize = 16;

pub fn render_snapshot(
    snapshot: &SensorSnapshot,
    connection: ConnectionStatus,
    device: &str,
) -> String {
    let mut template = SNAPSHOT_TXT.to_string();

    template = template.replace("{DEVICE}", device);
    template = template.replace("{CONNECTION}", connection.as_str());
    template = template.replace("{DATE}", &snapshot.date_display());
    template = template.replace("{MOISTURE}", &snapshot.moisture_display());
    template = template.replace("{RESISTANCE}", &snapshot.resistance_display());
    template = template.replace("{TEMPERATURE}", &snapshot.temperature_display());
    template = template.replace("{TEMPERATURE_C}", &snapshot.temperature_celsius_display());

    template
}

pub fn render_record(record: &SoilObservationRecord) -> String {
    let mut template = RECORD_TXT.to_string();

    let site = record
        .site_name()
        .pad(SITE_WIDTH, ' ', Alignment::Left, true);

    let mut extra = String::new();
    if let Some(coordinates) = record.coordinates() {
        extra.push_str(&format!(
            "  ({:.5}, {:.5})",
            coordinates.latitude, coordinates.longitude
        ));
    }
    if let Some(photo) = record.photo() {
        extra.push_str(&format!("  [{}]", photo));
    }

    template = template.replace("{SITE}", &site);
    template = template.replace(
        "{DATE}",
        &record.timestamp().format(RECORD_DATE_FORMAT).to_string(),
    );
    template = template.replace("{MOISTURE}", record.moisture());
    template = template.replace("{EXTRA}", &extra);

    template
}

pub fn render_configuration(config: &FileConfiguration) -> String {
    let mut template = CONFIGURATION_TXT.to_string();

    let settings: Vec<String> = main_configuration::MAP_CONFIG_FORM
        .iter()
        .map(|elem| {
            format!(
                "  {} {}",
                elem.form_name.pad_to_width(SETTING_WIDTH),
                main_configuration::display_value(config, elem)
            )
        })
        .collect();

    template = template.replace("{PATH}", &config.path().display().to_string());
    template = template.replace("{SETTINGS}", &settings.join("\n"));

    template
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::record::Coordinates;
    use crate::sensors::{
        resistance_sensor::ResistanceState, temperature_sensor::TemperatureState,
    };

    #[test]
    fn test_render_snapshot() {
        let snapshot = SensorSnapshot {
            date_observed: None,
            resistance: ResistanceState::Valid(1000.0),
            temperature: TemperatureState::Valid(70.0),
            moisture_percent: Some(99.173),
        };

        let text = render_snapshot(&snapshot, ConnectionStatus::Connected, "JPLSoil");

        assert!(text.starts_with("JPLSoil (connected) - -------"));
        assert!(text.contains("Moisture     99.2%"));
        assert!(text.contains("Resistance   1.0 kΩ"));
        assert!(text.contains("Temperature  70.0℉ / 21.1℃"));
    }

    #[test]
    fn test_render_record() {
        let record = SoilObservationRecord::new(
            "Arroyo",
            Utc.with_ymd_and_hms(2017, 3, 13, 15, 4, 0).unwrap(),
            "12.5%",
        )
        .with_coordinates(Coordinates {
            latitude: 34.2,
            longitude: -118.17,
        });

        assert_eq!(
            render_record(&record).trim_end(),
            "Arroyo                    Mar 13, 2017, 03:04 PM  12.5%  (34.20000, -118.17000)"
        );
    }

    #[test]
    fn test_render_record_truncates_site() {
        let record = SoilObservationRecord::new(
            "A very long site name that overflows",
            Utc.with_ymd_and_hms(2017, 3, 13, 15, 4, 0).unwrap(),
            "0%",
        );

        assert!(render_record(&record).starts_with("A very long site name th  Mar"));
    }

    #[test]
    fn test_render_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfiguration::open(dir.path().join("config.json")).unwrap();

        let text = render_configuration(&config);
        assert!(text.contains("  device           JPLSoil"));
        assert!(text.contains("  beta             0.1562"));
    }
}
