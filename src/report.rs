//! Link report writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::message::Message;

/// Public link to a channel post.
pub fn message_link(host: &str, channel: &str, id: i32) -> String {
    format!("https://{}/{}/{}", host, channel, id)
}

/// Write one link per message, in the given order.
pub fn write_links<W: Write>(
    writer: &mut W,
    host: &str,
    channel: &str,
    messages: &[Message],
) -> std::io::Result<()> {
    for msg in messages {
        writeln!(writer, "{}", message_link(host, channel, msg.id))?;
    }
    writer.flush()
}

/// Create (or truncate) `path` and write the links into it.
///
/// On failure whatever was already flushed stays on disk.
pub fn write_report(path: &Path, host: &str, channel: &str, messages: &[Message]) -> Result<()> {
    let output_error = |source| Error::Output {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    write_links(&mut writer, host, channel, messages).map_err(output_error)
}
