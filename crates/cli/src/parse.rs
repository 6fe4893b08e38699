//! Line-oriented parsing of the instruction script (§6, §4.5).
//!
//! Hand-written recursive-descent scanning rather than a parser-combinator
//! or regex dependency: the grammar is seven small, regular forms, and a
//! scanner reads more plainly than a combinator chain would for something
//! this size.

use ssi_sim_core::{Instruction, SiteId, TxnId, VarId, NUM_SITES, NUM_VARS};
use thiserror::Error;

/// A line that didn't match any instruction form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed instruction: {0:?}")]
pub struct ParseError(pub String);

/// Parse one line of script. Returns `Ok(None)` for a blank or
/// comment-only line, `Ok(Some(instruction))` for a recognized one, and
/// `Err` for anything else — the caller decides how to report that (§7:
/// `tracing::warn!`, not a hard failure).
pub fn parse_line(raw: &str) -> Result<Option<Instruction>, ParseError> {
    let line = strip_comment(raw).trim();
    if line.is_empty() {
        return Ok(None);
    }

    let malformed = || ParseError(line.to_string());

    if let Some(inner) = strip_call(line, "begin") {
        return Ok(Some(Instruction::Begin(parse_txn(inner.trim()).ok_or_else(malformed)?)));
    }
    if let Some(inner) = strip_call(line, "end") {
        return Ok(Some(Instruction::End(parse_txn(inner.trim()).ok_or_else(malformed)?)));
    }
    if let Some(inner) = strip_call(line, "fail") {
        return Ok(Some(Instruction::Fail(parse_site(inner.trim()).ok_or_else(malformed)?)));
    }
    if let Some(inner) = strip_call(line, "recover") {
        return Ok(Some(Instruction::Recover(parse_site(inner.trim()).ok_or_else(malformed)?)));
    }
    if let Some(inner) = strip_call(line, "dump") {
        if !inner.trim().is_empty() {
            return Err(malformed());
        }
        return Ok(Some(Instruction::Dump));
    }
    if let Some(inner) = strip_call(line, "R") {
        let mut parts = inner.splitn(2, ',');
        let txn = parse_txn(parts.next().unwrap_or("").trim()).ok_or_else(malformed)?;
        let var = parse_var(parts.next().ok_or_else(malformed)?.trim()).ok_or_else(malformed)?;
        return Ok(Some(Instruction::Read(txn, var)));
    }
    if let Some(inner) = strip_call(line, "W") {
        let mut parts = inner.splitn(3, ',');
        let txn = parse_txn(parts.next().unwrap_or("").trim()).ok_or_else(malformed)?;
        let var = parse_var(parts.next().ok_or_else(malformed)?.trim()).ok_or_else(malformed)?;
        let value: i64 = parts
            .next()
            .ok_or_else(malformed)?
            .trim()
            .parse()
            .map_err(|_| malformed())?;
        return Ok(Some(Instruction::Write(txn, var, value)));
    }

    Err(malformed())
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// If `line` is `name(...)`, return the text between the parens.
fn strip_call<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?;
    let rest = rest.trim_start();
    rest.strip_prefix('(')?.strip_suffix(')')
}

fn parse_txn(s: &str) -> Option<TxnId> {
    let n: u32 = s.strip_prefix('T')?.parse().ok()?;
    Some(TxnId::new(n))
}

fn parse_var(s: &str) -> Option<VarId> {
    let n: u8 = s.strip_prefix('x')?.parse().ok()?;
    if n < 1 || n > NUM_VARS {
        return None;
    }
    Some(VarId::new(n))
}

fn parse_site(s: &str) -> Option<SiteId> {
    let n: u8 = s.parse().ok()?;
    if n < 1 || n > NUM_SITES {
        return None;
    }
    Some(SiteId::new(n))
}
