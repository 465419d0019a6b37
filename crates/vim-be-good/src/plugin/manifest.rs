//! What the plugin declares to the host.

use nvim_rs::Value;

use vim_be_good_core::PluginOptions;

/// The one command this plugin registers.
pub const COMMAND: &str = "VimBeGood2";

/// Answer to the remote plugin `specs` request.
pub fn specs() -> Value {
    Value::Array(vec![Value::Map(vec![
        (Value::from("type"), Value::from("command")),
        (Value::from("name"), Value::from(COMMAND)),
        (Value::from("sync"), Value::from(false)),
        (
            Value::from("opts"),
            Value::Map(vec![(Value::from("nargs"), Value::from("*"))]),
        ),
    ])])
}

/// Answer to the `options` request.
pub fn options(options: &PluginOptions) -> Value {
    Value::Map(vec![
        (Value::from("dev"), Value::from(options.dev)),
        (Value::from("alwaysInit"), Value::from(options.always_init)),
    ])
}
