//! The line oriented rename configuration format.
//!
//! ```text
//! # comment
//! [types]
//! old::module::OldName = new::module::NewName
//! [enums]
//! OLD_VARIANT = new::module::EnumType::NewVariant
//! ```

/// A section of a rename configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Types,
    Enums,
}

/// One meaningful line of a rename configuration.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Header(Section),
    Type {
        old: &'a str,
        current: &'a str,
    },
    Enum {
        old: &'a str,
        enum_path: &'a str,
        variant: &'a str,
    },
}

/// Splits `text` into numbered lines, skipping blanks and comments.
///
/// Each entry is parsed against the section open at that point; malformed
/// entries are returned as errors so the caller can skip them.
pub(crate) fn parse(text: &str) -> impl Iterator<Item = (usize, Result<Line<'_>, String>)> {
    let mut section = None;
    text.lines()
        .enumerate()
        .filter_map(move |(index, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let parsed = parse_line(line, section);
            match parsed {
                Ok(Line::Header(next)) => section = Some(next),
                // Entries under an unknown header are skipped too.
                Err(_) if line.starts_with('[') => section = None,
                _ => {}
            }
            Some((index + 1, parsed))
        })
}

fn parse_line(line: &str, section: Option<Section>) -> Result<Line<'_>, String> {
    if let Some(header) = line.strip_prefix('[') {
        let name = header
            .strip_suffix(']')
            .ok_or_else(|| format!("unterminated section header `{line}`"))?;
        return match name.trim() {
            "types" => Ok(Line::Header(Section::Types)),
            "enums" => Ok(Line::Header(Section::Enums)),
            other => Err(format!("unknown section `[{other}]`")),
        };
    }
    let section = section.ok_or_else(|| format!("entry `{line}` outside of any section"))?;
    let (old, current) = line
        .split_once('=')
        .ok_or_else(|| format!("expected `old = new`, found `{line}`"))?;
    let (old, current) = (old.trim(), current.trim());
    if old.is_empty() || current.is_empty() {
        return Err(format!("empty name in `{line}`"));
    }
    match section {
        Section::Types => Ok(Line::Type { old, current }),
        Section::Enums => {
            let (enum_path, variant) = current
                .rsplit_once("::")
                .ok_or_else(|| format!("expected `path::Enum::Variant`, found `{current}`"))?;
            if enum_path.is_empty() || variant.is_empty() {
                return Err(format!("expected `path::Enum::Variant`, found `{current}`"));
            }
            Ok(Line::Enum {
                old,
                enum_path,
                variant,
            })
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
