use serde_yaml::Value;

use crate::error::StatblockError;
use crate::fetch::Fetch;
use crate::record::StatblockRecord;

const OPEN_FENCE: &str = "```statblock";
const CLOSE_FENCE: &str = "```";

/// A parsed statblock. The trimmed source text is kept next to the tree so an
/// edit starts from what the author wrote rather than from a re-dump.
#[derive(Debug, Clone, PartialEq)]
pub struct Statblock {
    source: String,
    tree: Value,
    record: StatblockRecord,
}

impl Statblock {
    /// Parse inner statblock YAML (no fence). Any well-formed document with a
    /// mapping at the top level is accepted; no field is required.
    pub fn parse(text: &str) -> Result<Self, StatblockError> {
        let source = text.trim();
        let tree: Value = serde_yaml::from_str(source)?;
        if !tree.is_mapping() {
            return Err(StatblockError::InvalidFormat(format!(
                "expected a mapping of statblock fields, found {}",
                kind_of(&tree)
            )));
        }
        let record = StatblockRecord::from_value(&tree);
        tracing::debug!(name = record.display_name(), "parsed statblock");
        Ok(Self {
            source: source.to_string(),
            tree,
            record,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn record(&self) -> &StatblockRecord {
        &self.record
    }

    pub fn name(&self) -> &str {
        self.record.display_name()
    }

    /// The source wrapped back into a fenced block, as documents carry it.
    pub fn to_fenced(&self) -> String {
        format!("{}\n{}\n{}\n", OPEN_FENCE, self.source, CLOSE_FENCE)
    }
}

/// Interior of the first ```` ```statblock ```` fence, up to the next ```` ``` ````.
pub fn extract_block(raw: &str) -> Option<&str> {
    let start = raw.find(OPEN_FENCE)?;
    let after_tag = &raw[start + OPEN_FENCE.len()..];
    let body = after_tag
        .strip_prefix('\n')
        .or_else(|| after_tag.strip_prefix("\r\n"))?;
    let end = body.find(CLOSE_FENCE)?;
    Some(&body[..end])
}

/// Extract the fenced block from a fetched document and parse it.
pub fn ingest(raw: &str) -> Result<Statblock, StatblockError> {
    let block = extract_block(raw).ok_or(StatblockError::NoStatblockBlockFound)?;
    Statblock::parse(block)
}

/// Pasted text may carry the whole fence, only one half of it, or none.
pub fn ingest_custom(raw: &str) -> Result<Statblock, StatblockError> {
    match extract_block(raw) {
        Some(block) => Statblock::parse(block),
        None => Statblock::parse(strip_partial_fence(raw)),
    }
}

/// Drop a leading opening marker and a trailing closing fence, independently.
fn strip_partial_fence(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix(OPEN_FENCE)
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
        .unwrap_or(text);
    text.strip_suffix(CLOSE_FENCE).unwrap_or(text)
}

/// Validate replacement text for an existing card. The edit surface only
/// shows inner content, so no fence is required.
pub fn apply_edit(new_text: &str) -> Result<Statblock, StatblockError> {
    Statblock::parse(new_text)
}

pub fn fetch_statblock(fetcher: &impl Fetch, url: &str) -> Result<Statblock, StatblockError> {
    let body = fetcher
        .get_text(url)
        .map_err(|e| StatblockError::MonsterFetchFailed(format!("{:#}", e)))?;
    ingest(&body)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
