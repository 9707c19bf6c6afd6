#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 <div align="center">
   <h1>Batch JSON Writer</h1>
   <h3>A restartable, checkpointed JSON file writer for enterprise batch applications</h3>

   [![crate](https://img.shields.io/crates/v/batch-json-writer.svg)](https://crates.io/crates/batch-json-writer)
   [![docs](https://docs.rs/batch-json-writer/badge.svg)](https://docs.rs/batch-json-writer)
   ![license](https://shields.io/badge/license-MIT%2FApache--2.0-blue)

  </div>

 # Batch JSON Writer

 Long-running batch jobs deliver their output in chunks, commit after every chunk, and must survive a crash without corrupting what was already written. **Batch JSON Writer** provides an item writer that streams those chunks into a single, syntactically valid JSON document and resumes a partially written file from the last committed byte offset, truncating away whatever a dying process left behind.

 ## Core Concepts

Understanding these core components will help you get started:

- **ItemWriter:** An abstraction that represents the output of a batch step, one chunk of items at a time.
- **ItemStream:** The lifecycle contract of restartable components: `open` once per job attempt, `update` after every committed chunk, `close` at the end.
- **ExecutionContext:** A string-keyed map of counters. The writer publishes its restart state into it; the driver persists it between job attempts and hands it back at the next `open`.
- **Checkpoint:** A byte offset plus an item counter. The offset always equals the file size right after a completed chunk, so it never points into the middle of an item.

 ## Configuration

The writer is created through a builder with the following options:

| **Option**            | **Description**                                                  |
|-----------------------|------------------------------------------------------------------|
| resource              | Path of the output file (mandatory)                              |
| name                  | Component name, prefixes the checkpoint keys                     |
| root_node             | Wrap the array in one named field instead of a bare array        |
| append                | Attach to existing content rather than recreate the file         |
| delete_if_exists      | Remove a stale output file before a fresh run (default on)       |
| delete_if_empty       | Remove the output file at close when zero items were written     |
| force_sync            | Force the storage device to persist the data on every flush      |
| pretty_formatter      | Pretty-print each item instead of the compact form               |
| header_line_separator | Flush a line separator right after the document prefix           |
| save_state            | Publish restart state through `update` (default on)              |

 ## Roadmap

- [ ] Streaming JSON item reader counterpart
- [ ] Transaction-aware buffering that defers writes until a driver commit
- [ ] Partitioned output across multiple files

 ## Getting Started

```toml
[dependencies]
batch-json-writer = "<version>"
```

Then, on your main.rs:

```rust
# use batch_json_writer::{
#     error::BatchError,
#     item::json::JsonFileItemWriterBuilder,
#     ExecutionContext, ItemStream, ItemWriter,
# };
# use serde::Serialize;
# use tempfile::tempdir;
# #[derive(Serialize, Debug, Clone)]
# struct Car {
#     year: u16,
#     make: String,
#     model: String,
# }
fn main() -> Result<(), BatchError> {
    let cars = vec![
        Car { year: 1948, make: "Porsche".into(), model: "356".into() },
        Car { year: 1995, make: "Peugeot".into(), model: "205".into() },
        Car { year: 2021, make: "Mazda".into(), model: "CX-30".into() },
    ];

    let dir = tempdir().unwrap();
    let writer = JsonFileItemWriterBuilder::new()
        .name("car_writer")
        .resource(dir.path().join("cars.json"))
        .build();

    // The driver persists the context between job attempts; a later attempt
    // that passes it back to `open` resumes where the last chunk ended.
    let mut ctx = ExecutionContext::new();

    writer.open(&ctx)?;
    for chunk in cars.chunks(2) {
        writer.write(chunk)?;
        writer.update(&mut ctx)?;
    }
    writer.close()?;

    assert_eq!(ctx.get("car_writer.items.written"), Some(3));

    Ok(())
}
```

## Examples

+ [Restartable run resuming from a crash](demos/restartable_run.rs)
+ [Document wrapped in a named root node](demos/root_node_document.rs)

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 ## Contribution
 Unless you explicitly state otherwise, any contribution intentionally submitted
 for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
 dual licensed as above, without any additional terms or conditions

 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of item writers (for example: the restartable JSON document writer)
pub mod item;

pub use crate::core::item::{ItemWriter, ItemWriterResult};
pub use crate::core::stream::{Checkpoint, ExecutionContext, ItemStream, ItemStreamResult};
