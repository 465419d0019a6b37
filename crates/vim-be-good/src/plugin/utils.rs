//! Helpers for picking apart RPC arguments.

use nvim_rs::Value;

use vim_be_good_core::LineEvent;

/// Identifies a buffer across RPC messages.
///
/// Neovim sends buffer handles as msgpack ext values; the raw ext payload
/// is stable for the lifetime of the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferKey(i8, Vec<u8>);

pub fn buffer_key(value: &Value) -> Option<BufferKey> {
    match value {
        Value::Ext(kind, data) => Some(BufferKey(*kind, data.clone())),
        _ => None,
    }
}

/// Flatten command arguments into strings.
///
/// The runtime file sends `opts.fargs` as a single array argument; plain
/// string arguments are accepted too.
pub fn command_args(args: &[Value]) -> Vec<String> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            Value::Array(items) => {
                out.extend(items.iter().filter_map(|v| v.as_str().map(str::to_string)))
            }
            other => {
                if let Some(s) = other.as_str() {
                    out.push(s.to_string());
                }
            }
        }
    }
    out
}

/// Decode `nvim_buf_lines_event` arguments:
/// `[buf, changedtick, firstline, lastline, linedata, more]`.
pub fn line_event(args: &[Value]) -> Option<(BufferKey, LineEvent)> {
    let key = buffer_key(args.first()?)?;
    let tick = args.get(1).and_then(Value::as_u64);
    Some((key, LineEvent { tick }))
}
