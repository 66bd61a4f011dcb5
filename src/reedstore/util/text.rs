// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Text Output Helpers
//!
//! Small formatting helpers for the debug-printing paths.

use crate::reedstore::reedstream::ReedResult;
use std::io::Write;

/// Writes one line of text prefixed by the given number of tabs.
///
/// ## Input
/// - `writer`: The output stream
/// - `tab_count`: Number of tabs to indent by
/// - `text`: The text to write (a newline is appended)
///
/// ## Error Conditions
/// - `ReedError::IoError` if the stream write fails
pub fn write_tabbed_text<W: Write>(
    writer: &mut W,
    tab_count: usize,
    text: &str,
) -> ReedResult<()> {
    for _ in 0..tab_count {
        write!(writer, "\t")?;
    }
    writeln!(writer, "{}", text)?;
    Ok(())
}
