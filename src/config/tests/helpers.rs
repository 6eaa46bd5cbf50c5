//! Layer composition shared by the configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::TallymanConfig;

/// One configuration source, lowest precedence first.
#[derive(Debug, Clone)]
pub enum Layer {
    Defaults(Value),
    File(Value),
    Environment(Value),
    Cli(Value),
}

/// Merges `layers` in order, as `TallymanConfig::load` would.
pub fn merge(layers: impl IntoIterator<Item = Layer>) -> TallymanConfig {
    let mut composer = MergeComposer::new();
    for layer in layers {
        match layer {
            Layer::Defaults(value) => composer.push_defaults(value),
            Layer::File(value) => composer.push_file(value, None),
            Layer::Environment(value) => composer.push_environment(value),
            Layer::Cli(value) => composer.push_cli(value),
        }
    }
    TallymanConfig::merge_from_layers(composer.layers()).expect("layers should merge")
}
