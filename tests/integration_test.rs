use std::{
    env::temp_dir,
    fs,
    path::{Path, PathBuf},
};

use ::serde::{Serialize, ser::Error};
use rand::distr::{Alphanumeric, SampleString};
use serde::Serializer;
use serde_json::Value;

use batch_json_writer::{
    ExecutionContext, ItemStream, ItemWriter, item::json::JsonFileItemWriterBuilder,
};
use time::{Date, Month, format_description};

fn date_serializer<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let result = format_description::parse("[year]-[month]-[day]");

    match result {
        Ok(format) => {
            let s = date.format(&format).unwrap();
            serializer.serialize_str(&s)
        }
        Err(error) => Err(Error::custom(error.to_string())),
    }
}

#[derive(Serialize, Clone)]
pub struct Person {
    first_name: String,
    last_name: String,
    title: String,
    email: String,
    #[serde(serialize_with = "date_serializer")]
    birth_date: Date,
}

fn person_fixtures() -> Vec<Person> {
    vec![
        Person {
            first_name: "Alice".to_string(),
            last_name: "Martin".to_string(),
            title: "Ms".to_string(),
            email: "alice.martin@example.org".to_string(),
            birth_date: Date::from_calendar_date(1990, Month::January, 15).unwrap(),
        },
        Person {
            first_name: "Bob".to_string(),
            last_name: "Durand".to_string(),
            title: "Mr".to_string(),
            email: "bob.durand@example.org".to_string(),
            birth_date: Date::from_calendar_date(1985, Month::June, 2).unwrap(),
        },
        Person {
            first_name: "Carla".to_string(),
            last_name: "Moreau".to_string(),
            title: "Dr".to_string(),
            email: "carla.moreau@example.org".to_string(),
            birth_date: Date::from_calendar_date(1978, Month::November, 30).unwrap(),
        },
    ]
}

#[derive(Serialize, Debug, Clone)]
struct Car {
    year: u16,
    make: String,
    model: String,
}

fn car(year: u16, make: &str, model: &str) -> Car {
    Car {
        year,
        make: make.to_string(),
        model: model.to_string(),
    }
}

fn car_fixtures() -> Vec<Car> {
    vec![
        car(1948, "Porsche", "356"),
        car(1995, "Peugeot", "205"),
        car(2012, "Citroën", "C4 Picasso"),
        car(2021, "Mazda", "CX-30"),
        car(1967, "Ford", "Mustang fastback 1967"),
    ]
}

fn random_output_path() -> PathBuf {
    let file_name = Alphanumeric.sample_string(&mut rand::rng(), 16);
    temp_dir().join(format!("{}.json", file_name))
}

/// Runs one complete writer session over the given chunk partition and
/// returns the bytes of the closed document.
fn write_in_chunks(path: &Path, chunks: &[&[Car]]) -> String {
    let writer = JsonFileItemWriterBuilder::new().resource(path).build();

    writer.open(&ExecutionContext::new()).unwrap();
    for chunk in chunks {
        writer.write(chunk).unwrap();
    }
    writer.close().unwrap();

    fs::read_to_string(path).expect("Should have been able to read the file")
}

#[test]
fn write_cars_to_bare_array_document() {
    let path = random_output_path();
    let writer = JsonFileItemWriterBuilder::new().resource(&path).build();

    writer.open(&ExecutionContext::new()).unwrap();
    writer
        .write(&[car(1948, "Porsche", "356"), car(1995, "Peugeot", "205")])
        .unwrap();
    writer.close().unwrap();

    let file_content =
        fs::read_to_string(&path).expect("Should have been able to read the file");

    assert_eq!(
        file_content,
        r#"[
{"year":1948,"make":"Porsche","model":"356"},{"year":1995,"make":"Peugeot","model":"205"}]"#
    );
}

#[test]
fn write_persons_under_root_node() {
    let path = random_output_path();
    let persons = person_fixtures();

    let writer = JsonFileItemWriterBuilder::new()
        .resource(&path)
        .root_node("Persons")
        .header_line_separator(false)
        .build();

    writer.open(&ExecutionContext::new()).unwrap();
    writer.write(&persons[..2]).unwrap();
    writer.write(&persons[2..]).unwrap();
    writer.close().unwrap();

    let file_content =
        fs::read_to_string(&path).expect("Should have been able to read the file");

    let expected = format!(
        r#"{{"Persons":[{},{},{}]}}"#,
        serde_json::to_string(&persons[0]).unwrap(),
        serde_json::to_string(&persons[1]).unwrap(),
        serde_json::to_string(&persons[2]).unwrap()
    );
    assert_eq!(file_content, expected);
}

#[test]
fn chunk_partitioning_does_not_change_the_document() {
    let cars = car_fixtures();
    let empty: &[Car] = &[];

    let whole = write_in_chunks(&random_output_path(), &[&cars[..]]);
    let split = write_in_chunks(&random_output_path(), &[&cars[..2], &cars[2..]]);
    let singles = write_in_chunks(
        &random_output_path(),
        &[&cars[..1], &cars[1..2], &cars[2..3], &cars[3..4], &cars[4..]],
    );
    let padded = write_in_chunks(
        &random_output_path(),
        &[empty, &cars[..2], empty, &cars[2..], empty],
    );

    assert_eq!(split, whole);
    assert_eq!(singles, whole);
    assert_eq!(padded, whole);

    // The closed document parses and yields the records in original order.
    let document: Value = serde_json::from_str(&whole).unwrap();
    let records = document.as_array().unwrap();
    assert_eq!(records.len(), cars.len());
    assert_eq!(records[0]["make"], "Porsche");
    assert_eq!(records[4]["model"], "Mustang fastback 1967");
}

#[test]
fn leading_empty_chunk_produces_a_single_record_document() {
    let path = random_output_path();
    let writer = JsonFileItemWriterBuilder::new()
        .resource(&path)
        .header_line_separator(false)
        .build();

    writer.open(&ExecutionContext::new()).unwrap();
    writer.write(&[]).unwrap();
    writer.write(&[car(2021, "Mazda", "CX-30")]).unwrap();
    writer.close().unwrap();

    let file_content =
        fs::read_to_string(&path).expect("Should have been able to read the file");

    assert_eq!(
        file_content,
        r#"[{"year":2021,"make":"Mazda","model":"CX-30"}]"#
    );
}

#[test]
fn pretty_formatter_writes_indented_items() {
    let path = random_output_path();
    let writer = JsonFileItemWriterBuilder::new()
        .resource(&path)
        .pretty_formatter(true)
        .build();

    let item = car(1948, "Porsche", "356");
    writer.open(&ExecutionContext::new()).unwrap();
    writer.write(std::slice::from_ref(&item)).unwrap();
    writer.close().unwrap();

    let file_content =
        fs::read_to_string(&path).expect("Should have been able to read the file");

    let expected = format!("[\n{}]", serde_json::to_string_pretty(&item).unwrap());
    assert_eq!(file_content, expected);
}

#[test]
fn writer_is_usable_behind_trait_objects() {
    let path = random_output_path();
    let writer = JsonFileItemWriterBuilder::new()
        .resource(&path)
        .header_line_separator(false)
        .build();

    let stream: &dyn ItemStream = &writer;
    let sink: &dyn ItemWriter<Car> = &writer;

    stream.open(&ExecutionContext::new()).unwrap();
    sink.write(&[car(1995, "Peugeot", "205")]).unwrap();
    stream.close().unwrap();

    let file_content =
        fs::read_to_string(&path).expect("Should have been able to read the file");
    assert_eq!(
        file_content,
        r#"[{"year":1995,"make":"Peugeot","model":"205"}]"#
    );
}
