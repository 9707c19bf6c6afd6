use anyhow::Result;
use std::env::temp_dir;
use std::fs;

use batch_json_writer::{
    ExecutionContext, ItemStream, ItemWriter, item::json::JsonFileItemWriterBuilder,
};
use serde::Serialize;

#[derive(Serialize, Clone)]
struct Measurement {
    sensor: String,
    value: f64,
}

fn measurement(sensor: &str, value: f64) -> Measurement {
    Measurement {
        sensor: sensor.to_string(),
        value,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let path = temp_dir().join("measurements.json");
    let measurements = vec![
        measurement("boiler-1", 21.5),
        measurement("boiler-2", 19.8),
        measurement("boiler-1", 22.1),
        measurement("boiler-2", 20.0),
        measurement("boiler-1", 22.7),
        measurement("boiler-2", 20.4),
    ];

    // The driver would persist this context between job attempts.
    let mut ctx = ExecutionContext::new();

    // First attempt: two chunks get committed, then the process dies before
    // the last chunk reaches a checkpoint.
    let writer = JsonFileItemWriterBuilder::new()
        .name("measurement_writer")
        .resource(&path)
        .build();
    writer.open(&ctx)?;
    writer.write(&measurements[..2])?;
    writer.update(&mut ctx)?;
    writer.write(&measurements[2..4])?;
    writer.update(&mut ctx)?;
    writer.write(&measurements[4..])?;
    drop(writer);

    println!("after crash:  {}", fs::read_to_string(&path)?);

    // Second attempt: open with the persisted context. The uncheckpointed
    // tail is truncated away and the driver re-delivers the lost chunk.
    let writer = JsonFileItemWriterBuilder::new()
        .name("measurement_writer")
        .resource(&path)
        .build();
    writer.open(&ctx)?;
    writer.write(&measurements[4..])?;
    writer.update(&mut ctx)?;
    writer.close()?;

    println!("after resume: {}", fs::read_to_string(&path)?);

    Ok(())
}
