// SPDX-License-Identifier: PMPL-1.0-or-later

//! Render a table image as Rust statics for the firmware build.
//!
//! The output is a self-contained module: the bucket and record arrays, one
//! offset array and byte blob per language, and a `register_all` function
//! that registers every language in image order. Firmware declares it with
//! `mod lang_tables;` and calls `lang_tables::register_all(&mut builder)`
//! during startup.

use crate::image::TableImage;
use anyhow::Result;
use std::fmt::{self, Write};

/// Array elements per line in offset tables.
const OFFSETS_PER_LINE: usize = 12;

pub fn render_rust(image: &TableImage) -> Result<String> {
    let mut out = String::new();
    write_rust(&mut out, image)?;
    Ok(out)
}

pub fn write_rust(out: &mut impl Write, image: &TableImage) -> fmt::Result {
    writeln!(
        out,
        "// @generated by flashlang {}. Do not edit.",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "use ::flashlang::{{BucketRange, HashIndex, LangCode, Provider, Record, RegistryBuilder, RegistryError, StringBlob}};"
    )?;
    writeln!(out)?;
    writeln!(out, "pub const INDEX_DIGEST: &str = {:?};", image.index_digest)?;
    writeln!(out)?;

    writeln!(
        out,
        "pub static BUCKETS: [BucketRange; {}] = [",
        image.buckets.len()
    )?;
    for bucket in &image.buckets {
        writeln!(
            out,
            "    BucketRange::new({}, {}),",
            bucket.start(),
            bucket.count()
        )?;
    }
    writeln!(out, "];")?;
    writeln!(out)?;

    writeln!(
        out,
        "pub static RECORDS: [Record; {}] = [",
        image.records.len()
    )?;
    for record in &image.records {
        write!(
            out,
            "    Record::new({:#010x}, {}),",
            record.hash(),
            record.string_index()
        )?;
        match image.source(record.string_index()) {
            Some(source) => writeln!(out, " // {source:?}")?,
            None => writeln!(out)?,
        }
    }
    writeln!(out, "];")?;
    writeln!(out)?;
    writeln!(
        out,
        "pub static INDEX: HashIndex<'static> = HashIndex::new(&BUCKETS, &RECORDS);"
    )?;

    for language in &image.languages {
        let name = language.code.as_str().to_ascii_uppercase();
        writeln!(out)?;
        writeln!(
            out,
            "pub static OFFSETS_{name}: [u16; {}] = [",
            language.offsets.len()
        )?;
        for chunk in language.offsets.chunks(OFFSETS_PER_LINE) {
            let line: Vec<String> = chunk.iter().map(u16::to_string).collect();
            writeln!(out, "    {},", line.join(", "))?;
        }
        writeln!(out, "];")?;
        writeln!(out, "pub static RAW_{name}: &[u8] = b\"\\")?;
        write!(out, "    ")?;
        write_byte_string(out, &language.raw)?;
        writeln!(out, "\";")?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "pub fn register_all(builder: &mut RegistryBuilder<'static>) -> Result<(), RegistryError> {{"
    )?;
    for language in &image.languages {
        let name = language.code.as_str().to_ascii_uppercase();
        writeln!(
            out,
            "    builder.register(Provider::new(LangCode::literal({:?}), INDEX, StringBlob::new(&OFFSETS_{name}, RAW_{name})))?;",
            language.code.as_str()
        )?;
    }
    writeln!(out, "    Ok(())")?;
    writeln!(out, "}}")
}

/// Body of a `b"..."` literal, one string per source line.
///
/// Lines are joined with `\`-newline continuations, which swallow leading
/// whitespace on the next line, so a blank at the start of a line is escaped.
fn write_byte_string(out: &mut impl Write, bytes: &[u8]) -> fmt::Result {
    let mut line_start = true;
    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            0 => out.write_str("\\0")?,
            b'\\' => out.write_str("\\\\")?,
            b'"' => out.write_str("\\\"")?,
            b'\n' => out.write_str("\\n")?,
            b'\r' => out.write_str("\\r")?,
            b'\t' => out.write_str("\\t")?,
            b' ' if line_start => out.write_str("\\x20")?,
            0x20..=0x7e => out.write_char(byte as char)?,
            _ => write!(out, "\\x{byte:02x}")?,
        }
        line_start = false;
        if byte == 0 && i + 1 < bytes.len() {
            out.write_str("\\\n    ")?;
            line_start = true;
        }
    }
    Ok(())
}
