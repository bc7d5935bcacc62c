//! Host side reader for the soil moisture probe.
//!
//! Reads the probe's text stream from a capture file or stdin (e.g. piped
//! from a BLE UART bridge), prints the final readings and optionally saves
//! an observation record.
//!
//! ```bash
//! ble-uart-bridge JPLSoil | soil-moisture-probe --site "North bed" --save
//! soil-moisture-probe --input capture.txt --json
//! soil-moisture-probe --input capture.txt --ambient 68 --lat 34.2 --lon -118.17 --save
//! soil-moisture-probe --set alpha=0.0012 --set name="North bed" --show-config
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use log::{debug, info, warn};

use soil_moisture_probe::{
    configuration::{file_configuration::FileConfiguration, main_configuration},
    link::LineSource,
    template, Coordinates, JsonLinesRecordStore, LinkEvent, ReadingAggregator, RecordStore,
};

const DEFAULT_CONFIG: &str = "soil_probe.json";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    site: Option<String>,
    ambient: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    photo: Option<String>,
    settings: Vec<(String, String)>,
    save: bool,
    json: bool,
    show_config: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("Missing value for {}", name))
        };

        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value(arg)?)),
            "--input" => parsed.input = Some(PathBuf::from(value(arg)?)),
            "--site" => parsed.site = Some(value(arg)?),
            "--photo" => parsed.photo = Some(value(arg)?),
            "--ambient" => parsed.ambient = Some(parse_number(arg, &value(arg)?)?),
            "--lat" => parsed.latitude = Some(parse_number(arg, &value(arg)?)?),
            "--lon" => parsed.longitude = Some(parse_number(arg, &value(arg)?)?),
            "--set" => {
                let setting = value(arg)?;
                let (key, val) = setting
                    .split_once('=')
                    .with_context(|| format!("Expected name=value, got '{}'", setting))?;
                parsed.settings.push((key.to_string(), val.to_string()));
            }
            "--save" => parsed.save = true,
            "--json" => parsed.json = true,
            "--show-config" => parsed.show_config = true,
            other => bail!("Unknown argument '{}'", other),
        }
    }

    Ok(parsed)
}

fn parse_number(name: &str, value: &str) -> anyhow::Result<f64> {
    value
        .parse::<f64>()
        .with_context(|| format!("Invalid number for {}: '{}'", name, value))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut main_config = FileConfiguration::open(&config_path)?;

    if !args.settings.is_empty() {
        for (key, value) in &args.settings {
            main_configuration::apply_setting(&mut main_config, key, value)?;
        }
        main_config.save()?;
        info!("Configuration saved to {}", main_config.path().display());
    }

    if args.show_config {
        println!("{}", template::render_configuration(&main_config));
        return Ok(());
    }

    if !args.settings.is_empty() && args.input.is_none() {
        return Ok(());
    }

    main_sensor(args, main_config)
}

fn main_sensor(args: Args, main_config: FileConfiguration) -> anyhow::Result<()> {
    let coordinates = match (args.latitude, args.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        (None, None) => None,
        _ => bail!("--lat and --lon must be given together"),
    };

    let mut aggregator = ReadingAggregator::new(main_config.calibration_constants());

    if let Some(ambient) = args.ambient.or(main_config.get_ambient_temperature()) {
        aggregator.supply_ambient_temperature(ambient);
    }

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let device = main_config.get_device();
    info!("Reading probe '{}'", device);
    aggregator.dispatch(LinkEvent::Connected);

    for event in LineSource::new(reader) {
        aggregator.dispatch(event.context("Sensor link read failed")?);
        debug!("{}", aggregator.snapshot().pretty_print());
    }

    if args.json {
        println!("{}", aggregator.snapshot().to_json());
    } else {
        println!(
            "{}",
            template::render_snapshot(
                aggregator.snapshot(),
                aggregator.connection_status(),
                &device,
            )
        );
    }

    if args.save {
        let site = args.site.unwrap_or_else(|| main_config.get_name());
        if site.is_empty() {
            warn!("Saving record without a site name");
        }

        let mut record = aggregator.finalize(&site, Utc::now());
        if let Some(coordinates) = coordinates {
            record = record.with_coordinates(coordinates);
        }
        if let Some(photo) = &args.photo {
            record = record.with_photo(photo);
        }

        let mut store = JsonLinesRecordStore::open(main_config.get_records_path())?;
        store.append(&record)?;

        println!("{}", template::render_record(&record));
    }

    info!("Probe '{}' stream ended", device);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args(&strings(&[
            "--input", "capture.txt", "--site", "Arroyo", "--ambient", "68", "--lat", "34.2",
            "--lon", "-118.17", "--set", "alpha=0.002", "--save", "--json",
        ]))
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("capture.txt")));
        assert_eq!(args.site.as_deref(), Some("Arroyo"));
        assert_eq!(args.ambient, Some(68.0));
        assert_eq!(args.longitude, Some(-118.17));
        assert_eq!(
            args.settings,
            vec![("alpha".to_string(), "0.002".to_string())]
        );
        assert!(args.save);
        assert!(args.json);
        assert!(!args.show_config);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&strings(&["--site"])).is_err());
        assert!(parse_args(&strings(&["--ambient", "warm"])).is_err());
        assert!(parse_args(&strings(&["--set", "alpha"])).is_err());
        assert!(parse_args(&strings(&["--verbose"])).is_err());
    }
}
