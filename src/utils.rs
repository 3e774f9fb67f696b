//! Parsing helpers for id lists typed on the command line

use crate::core::error::{ImpactError, ImpactResult};
use std::collections::BTreeSet;

/// Parse ids from one or more values ("1, 2,3" "4 5").
///
/// Blank tokens are skipped; anything else that is not an unsigned integer
/// is an error naming the offending token.
pub fn parse_id_list(values: &[String], what: &str) -> ImpactResult<BTreeSet<u64>> {
  let mut ids = BTreeSet::new();

  for token in values.iter().flat_map(|v| split_input_line(v)) {
    let id = token.parse::<u64>().map_err(|_| {
      ImpactError::with_help(
        format!("'{}' is not a valid {} id", token, what),
        "Ids are unsigned integers, separated by commas or spaces.",
      )
    })?;
    ids.insert(id);
  }

  Ok(ids)
}

/// Split one line of interactive input into raw values.
pub fn split_input_line(line: &str) -> Vec<String> {
  line
    .split(|c: char| c == ',' || c.is_whitespace())
    .filter(|t| !t.is_empty())
    .map(String::from)
    .collect()
}
