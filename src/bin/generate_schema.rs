//! Generate JSON Schema for the add-to-search configuration
//!
//! Usage:
//!   cargo run --features dev-bins --bin generate_schema > config-schema.json

use add_to_search::config::Config;
use schemars::schema_for;

fn main() {
    let schema = schema_for!(Config);
    let output = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema");
    println!("{}", output);
}
