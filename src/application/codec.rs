//! Line codec for persisted records.
//!
//! Items are stored as `title|author|identifier|flag` where flag `1` means
//! available and `0` means borrowed. Borrowers are stored as
//! `identifier|name|id1,id2,...`. Neither format escapes separators, so
//! values containing them are rejected on the way in.

use std::collections::HashSet;

use crate::domain::{AppError, Borrower, Item, RecordKind, Result};

const FIELD_SEP: char = '|';
const LIST_SEP: char = ',';

const AVAILABLE_FLAG: &str = "1";
const HELD_FLAG: &str = "0";

/// Checks a free-text field (title, author, name) for characters the
/// format cannot carry.
///
/// # Errors
/// Returns `InvalidField` if the value contains `|` or a line break.
pub fn validate_text(field: &'static str, value: &str) -> Result<()> {
    if value.contains(FIELD_SEP) {
        return Err(AppError::InvalidField {
            field,
            reason: format!("'{FIELD_SEP}' is not allowed"),
        });
    }
    if value.contains(['\n', '\r']) {
        return Err(AppError::InvalidField {
            field,
            reason: "line breaks are not allowed".into(),
        });
    }
    Ok(())
}

/// Checks an item identifier. Item identifiers also appear inside
/// borrower held lists, so `,` is rejected too.
///
/// # Errors
/// Returns `InvalidField` if the identifier cannot be stored.
pub fn validate_item_id(field: &'static str, value: &str) -> Result<()> {
    validate_text(field, value)?;
    if value.contains(LIST_SEP) {
        return Err(AppError::InvalidField {
            field,
            reason: format!("'{LIST_SEP}' is not allowed"),
        });
    }
    Ok(())
}

/// Encodes an item as one line (without terminator).
///
/// # Errors
/// Returns `InvalidField` if a field contains a separator.
pub fn encode_item(item: &Item) -> Result<String> {
    validate_text("title", &item.title)?;
    validate_text("author", &item.author)?;
    validate_item_id("item identifier", &item.identifier)?;

    let flag = if item.held { HELD_FLAG } else { AVAILABLE_FLAG };
    Ok(format!(
        "{}{FIELD_SEP}{}{FIELD_SEP}{}{FIELD_SEP}{flag}",
        item.title, item.author, item.identifier
    ))
}

/// Decodes one item line.
///
/// # Errors
/// Returns `MalformedRecord` if the line has fewer than four fields, an
/// unknown availability flag, or a field [`encode_item`] would refuse.
pub fn decode_item(line: &str) -> Result<Item> {
    let line = strip_cr(line);
    let mut parts = line.splitn(4, FIELD_SEP);

    let (Some(title), Some(author), Some(identifier), Some(flag)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed(RecordKind::Item, "expected 4 '|'-separated fields"));
    };

    let held = match flag {
        AVAILABLE_FLAG => false,
        HELD_FLAG => true,
        other => {
            return Err(malformed(
                RecordKind::Item,
                format!("availability flag must be 0 or 1, got '{other}'"),
            ))
        }
    };

    storable(RecordKind::Item, validate_text("title", title))?;
    storable(RecordKind::Item, validate_text("author", author))?;
    storable(RecordKind::Item, validate_item_id("item identifier", identifier))?;

    Ok(Item {
        title: title.to_string(),
        author: author.to_string(),
        identifier: identifier.to_string(),
        held,
    })
}

/// Encodes a borrower as one line (without terminator).
///
/// # Errors
/// Returns `InvalidField` if a field contains a separator.
pub fn encode_borrower(borrower: &Borrower) -> Result<String> {
    validate_text("borrower identifier", &borrower.identifier)?;
    validate_text("name", &borrower.name)?;
    for id in &borrower.held_items {
        validate_item_id("held item identifier", id)?;
    }

    Ok(format!(
        "{}{FIELD_SEP}{}{FIELD_SEP}{}",
        borrower.identifier,
        borrower.name,
        borrower.held_items.join(",")
    ))
}

/// Decodes one borrower line.
///
/// # Errors
/// Returns `MalformedRecord` if the line has fewer than three fields or a
/// field [`encode_borrower`] would refuse.
pub fn decode_borrower(line: &str) -> Result<Borrower> {
    let line = strip_cr(line);
    let mut parts = line.splitn(3, FIELD_SEP);

    let (Some(identifier), Some(name), Some(held)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed(RecordKind::Borrower, "expected 3 '|'-separated fields"));
    };

    if held.contains(FIELD_SEP) {
        return Err(malformed(RecordKind::Borrower, "unexpected '|' in held item list"));
    }

    storable(RecordKind::Borrower, validate_text("borrower identifier", identifier))?;
    storable(RecordKind::Borrower, validate_text("name", name))?;

    let held_items: Vec<String> = if held.is_empty() {
        Vec::new()
    } else {
        held.split(LIST_SEP).map(str::to_string).collect()
    };
    for id in &held_items {
        storable(RecordKind::Borrower, validate_item_id("held item identifier", id))?;
    }

    Ok(Borrower {
        identifier: identifier.to_string(),
        name: name.to_string(),
        held_items,
    })
}

/// Decodes every non-blank line of an item file.
///
/// # Errors
/// Returns the first `MalformedRecord`, numbered from 1. A repeated
/// identifier counts as malformed.
pub fn decode_item_lines(lines: &[String]) -> Result<Vec<Item>> {
    decode_lines(lines, RecordKind::Item, decode_item, |item| item.identifier.as_str())
}

/// Decodes every non-blank line of a borrower file.
///
/// # Errors
/// Returns the first `MalformedRecord`, numbered from 1. A repeated
/// identifier counts as malformed.
pub fn decode_borrower_lines(lines: &[String]) -> Result<Vec<Borrower>> {
    decode_lines(lines, RecordKind::Borrower, decode_borrower, |b| b.identifier.as_str())
}

fn decode_lines<T>(
    lines: &[String],
    kind: RecordKind,
    decode: fn(&str) -> Result<T>,
    key: fn(&T) -> &str,
) -> Result<Vec<T>> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = decode(line).map_err(|e| at_line(e, i + 1))?;
        if !seen.insert(key(&record).to_string()) {
            return Err(at_line(
                malformed(kind, format!("duplicate identifier '{}'", key(&record))),
                i + 1,
            ));
        }
        records.push(record);
    }

    Ok(records)
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Single-line decodes report line 1.
fn malformed(kind: RecordKind, reason: impl Into<String>) -> AppError {
    AppError::MalformedRecord {
        kind,
        line: 1,
        reason: reason.into(),
    }
}

/// A decoded record must survive re-encoding.
fn storable(kind: RecordKind, check: Result<()>) -> Result<()> {
    check.map_err(|e| match e {
        AppError::InvalidField { field, reason } => malformed(kind, format!("{field}: {reason}")),
        other => other,
    })
}

fn at_line(err: AppError, line: usize) -> AppError {
    match err {
        AppError::MalformedRecord { kind, reason, .. } => {
            AppError::MalformedRecord { kind, line, reason }
        }
        other => other,
    }
}
