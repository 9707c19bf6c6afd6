//! Mock version of the JSON item encoder;
use mockall::mock;

use batch_json_writer::error::BatchError;
use batch_json_writer::item::json::JsonItemEncoder;
use serde_json::Value;

mock! {
    pub Encoder {}
    impl JsonItemEncoder<Value> for Encoder {
        fn encode(&self, item: &Value) -> Result<String, BatchError>;
    }
}
