use anyhow::Result;
use std::env::temp_dir;
use std::fs;

use batch_json_writer::{
    ExecutionContext, ItemStream, ItemWriter, item::json::JsonFileItemWriterBuilder,
};
use serde::Serialize;

#[derive(Serialize)]
struct Person {
    first_name: String,
    last_name: String,
}

fn person(first_name: &str, last_name: &str) -> Person {
    Person {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    }
}

fn main() -> Result<()> {
    let path = temp_dir().join("persons.json");

    let writer = JsonFileItemWriterBuilder::new()
        .resource(&path)
        .root_node("Persons")
        .header_line_separator(false)
        .build();

    writer.open(&ExecutionContext::new())?;
    writer.write(&[person("Alice", "Martin"), person("Bob", "Durand")])?;
    writer.write(&[person("Carla", "Moreau")])?;
    writer.close()?;

    println!("{}", fs::read_to_string(&path)?);

    Ok(())
}
