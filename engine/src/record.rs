//! Typed, optional-field view over a parsed statblock tree.
//!
//! Statblock schemas drifted between sources, so every field is read
//! leniently: a missing or oddly-shaped field becomes `None` or empty and the
//! rest of the record still renders.

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::Ability;

/// A combat basic (`ac`, `hp`, `speed`): either a display string or a
/// `{value, info|formula}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BasicValue {
    Plain(String),
    Structured { value: String, note: Option<String> },
}

impl BasicValue {
    pub fn text(&self) -> String {
        match self {
            BasicValue::Plain(s) => s.clone(),
            BasicValue::Structured { value, note: Some(note) } => format!("{} ({})", value, note),
            BasicValue::Structured { value, note: None } => value.clone(),
        }
    }
}

/// One `{name, desc}` item of traits, actions, legendary actions or spells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatblockRecord {
    pub name: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub creature_type: Option<String>,
    pub alignment: Option<String>,
    pub ac: Option<BasicValue>,
    pub hp: Option<BasicValue>,
    pub speed: Option<BasicValue>,
    pub stats: Option<Vec<i64>>,
    pub saves: IndexMap<String, i64>,
    pub skillsaves: IndexMap<String, i64>,
    pub damage_vulnerabilities: Option<String>,
    pub damage_resistances: Option<String>,
    pub damage_immunities: Option<String>,
    pub condition_immunities: Option<String>,
    pub senses: Option<String>,
    pub languages: Option<String>,
    pub cr: Option<String>,
    pub xp: Option<String>,
    pub spells: Vec<Entry>,
    pub traits: Vec<Entry>,
    pub actions: Vec<Entry>,
    pub legendary_actions: Vec<Entry>,
}

impl StatblockRecord {
    /// Build the view from any YAML tree. Non-mappings give an empty record.
    pub fn from_value(tree: &Value) -> Self {
        match tree.as_mapping() {
            Some(map) => Self::from_mapping(map),
            None => Self::default(),
        }
    }

    pub fn from_mapping(map: &Mapping) -> Self {
        let field = |key: &str| map.get(key);
        Self {
            name: field("name").and_then(scalar_text),
            size: field("size").and_then(scalar_text),
            creature_type: field("type").and_then(scalar_text),
            alignment: field("alignment").and_then(scalar_text),
            ac: field("ac").and_then(basic_value),
            hp: field("hp").and_then(basic_value),
            speed: field("speed").and_then(basic_value),
            stats: field("stats").and_then(integers),
            saves: field("saves").map(bonuses).unwrap_or_default(),
            skillsaves: field("skillsaves").map(bonuses).unwrap_or_default(),
            damage_vulnerabilities: field("damage_vulnerabilities").and_then(list_text),
            damage_resistances: field("damage_resistances").and_then(list_text),
            damage_immunities: field("damage_immunities").and_then(list_text),
            condition_immunities: field("condition_immunities").and_then(list_text),
            senses: field("senses").and_then(list_text),
            languages: field("languages").and_then(list_text),
            cr: field("cr").and_then(scalar_text),
            xp: field("xp").and_then(scalar_text),
            spells: field("spells").map(spells).unwrap_or_default(),
            traits: field("traits").map(entries).unwrap_or_default(),
            actions: field("actions").map(entries).unwrap_or_default(),
            legendary_actions: field("legendary_actions").map(entries).unwrap_or_default(),
        }
    }

    /// The six scores in STR..CHA order, only when `stats` is well-formed.
    pub fn ability_scores(&self) -> Option<[(Ability, i64); 6]> {
        let stats = self.stats.as_ref()?;
        if stats.len() != 6 {
            return None;
        }
        let mut scores = [(Ability::Str, 0); 6];
        for (slot, (ability, score)) in scores.iter_mut().zip(Ability::ALL.iter().zip(stats)) {
            *slot = (*ability, *score);
        }
        Some(scores)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unbenannt")
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn basic_value(value: &Value) -> Option<BasicValue> {
    if let Some(text) = scalar_text(value) {
        return Some(BasicValue::Plain(text));
    }
    let map = value.as_mapping()?;
    let main = map.get("value").and_then(scalar_text)?;
    let note = map
        .get("info")
        .or_else(|| map.get("formula"))
        .and_then(scalar_text)
        .filter(|n| !n.trim().is_empty());
    Some(BasicValue::Structured { value: main, note })
}

fn integers(value: &Value) -> Option<Vec<i64>> {
    value
        .as_sequence()?
        .iter()
        .map(|item| match item {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect()
}

/// Scalars as-is; sequences joined with `, `. Blank results count as absent.
fn list_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Sequence(items) => items
            .iter()
            .filter_map(scalar_text)
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other)?,
    };
    (!text.trim().is_empty()).then_some(text)
}

/// `[{Wahrnehmung: 4}, {Heimlichkeit: 6}]` or `{Wahrnehmung: 4, ...}`.
fn bonuses(value: &Value) -> IndexMap<String, i64> {
    let mut out = IndexMap::new();
    let mut absorb = |map: &Mapping| {
        for (k, v) in map {
            if let (Some(key), Some(bonus)) = (scalar_text(k), v.as_i64()) {
                out.insert(key, bonus);
            }
        }
    };
    match value {
        Value::Mapping(map) => absorb(map),
        Value::Sequence(items) => items.iter().filter_map(Value::as_mapping).for_each(absorb),
        _ => {}
    }
    out
}

fn entries(value: &Value) -> Vec<Entry> {
    let Some(items) = value.as_sequence() else {
        return Vec::new();
    };
    items.iter().filter_map(named_entry).collect()
}

fn named_entry(item: &Value) -> Option<Entry> {
    match item {
        Value::Mapping(map) => {
            let name = map.get("name").and_then(scalar_text).unwrap_or_default();
            let desc = map
                .get("desc")
                .or_else(|| map.get("value"))
                .and_then(scalar_text)
                .unwrap_or_default();
            (!name.is_empty() || !desc.is_empty()).then_some(Entry { name, desc })
        }
        other => scalar_text(other).map(|desc| Entry {
            name: String::new(),
            desc,
        }),
    }
}

/// Spells come as `{name, desc}` items, bare lines, or single-key
/// `{caster ability: spell list}` mappings.
fn spells(value: &Value) -> Vec<Entry> {
    let Some(items) = value.as_sequence() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item.as_mapping() {
            Some(map) if map.contains_key("name") => named_entry(item),
            Some(map) => map.iter().next().map(|(k, v)| Entry {
                name: scalar_text(k).unwrap_or_default(),
                desc: scalar_text(v).unwrap_or_default(),
            }),
            None => named_entry(item),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> StatblockRecord {
        StatblockRecord::from_value(&serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn plain_and_structured_basics() {
        let r = parse("ac: 12 (Lederrüstung)\nhp:\n  value: 11\n  formula: 2W8+2\nspeed: 9 m\n");
        assert_eq!(r.ac, Some(BasicValue::Plain("12 (Lederrüstung)".into())));
        assert_eq!(r.hp.unwrap().text(), "11 (2W8+2)");
        assert_eq!(r.speed.unwrap().text(), "9 m");
    }

    #[test]
    fn structured_prefers_info_over_formula() {
        let r = parse("ac:\n  value: 15\n  info: natürliche Rüstung\n  formula: ignored\n");
        assert_eq!(r.ac.unwrap().text(), "15 (natürliche Rüstung)");
    }

    #[test]
    fn lists_are_joined_and_blanks_dropped() {
        let r = parse("languages: [Gemeinsprache, Goblinisch]\nsenses: ''\ndamage_immunities: []\n");
        assert_eq!(r.languages.as_deref(), Some("Gemeinsprache, Goblinisch"));
        assert_eq!(r.senses, None);
        assert_eq!(r.damage_immunities, None);
    }

    #[test]
    fn stats_need_integers() {
        assert_eq!(parse("stats: [1, 2, '3']").stats, Some(vec![1, 2, 3]));
        assert_eq!(parse("stats: [1, two, 3]").stats, None);
        assert!(parse("stats: [10, 10, 10, 10, 10]").ability_scores().is_none());
    }

    #[test]
    fn skillsaves_accept_list_or_mapping() {
        let list = parse("skillsaves:\n  - Wahrnehmung: 4\n  - Heimlichkeit: 6\n");
        assert_eq!(
            list.skillsaves.iter().collect::<Vec<_>>(),
            vec![(&"Wahrnehmung".to_string(), &4), (&"Heimlichkeit".to_string(), &6)]
        );
        let map = parse("saves:\n  Geschicklichkeit: 5\n");
        assert_eq!(map.saves.get("Geschicklichkeit"), Some(&5));
    }

    #[test]
    fn spells_in_every_shape() {
        let r = parse(
            "spells:\n  - Der Magier ist ein Zauberwirker der 9. Stufe.\n  - Zaubertricks (beliebig oft): Feuerpfeil\n  - name: Schild\n    desc: Reaktion\n",
        );
        assert_eq!(r.spells.len(), 3);
        assert_eq!(r.spells[0].name, "");
        assert_eq!(r.spells[1].name, "Zaubertricks (beliebig oft)");
        assert_eq!(r.spells[1].desc, "Feuerpfeil");
        assert_eq!(r.spells[2].name, "Schild");
    }

    #[test]
    fn entries_accept_value_key() {
        let r = parse("traits:\n  - name: Scharfe Sinne\n    value: Vorteil auf Wahrnehmung\n");
        assert_eq!(r.traits[0].desc, "Vorteil auf Wahrnehmung");
    }

    #[test]
    fn numeric_cr_is_text() {
        assert_eq!(parse("cr: 2").cr.as_deref(), Some("2"));
        assert_eq!(parse("cr: 1/8").cr.as_deref(), Some("1/8"));
    }
}
