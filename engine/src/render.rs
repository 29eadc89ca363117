use serde::{Deserialize, Serialize};

use crate::highlight::{escape_html, highlight};
use crate::record::{Entry, StatblockRecord};
use crate::{ability_mod, format_modifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Multi-column flow, narrowing with the viewport.
    #[default]
    Grid,
    /// One centred column.
    Column,
}

impl Layout {
    pub fn toggled(self) -> Self {
        match self {
            Layout::Grid => Layout::Column,
            Layout::Column => Layout::Grid,
        }
    }

    fn class(self) -> &'static str {
        match self {
            Layout::Grid => "layout-grid",
            Layout::Column => "layout-column",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub layout: Layout,
    /// Per-card edit/remove buttons (hidden again when printing).
    pub controls: bool,
    /// Dismissable error message shown above the cards.
    pub banner: Option<String>,
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Grid,
            controls: true,
            banner: None,
            title: "Statblöcke".to_string(),
        }
    }
}

const STYLE: &str = r#"
body { font-family: "Noto Serif", Georgia, serif; margin: 1rem; color: #1c1917; }
.banner { border: 1px solid #b91c1c; background: #fef2f2; color: #b91c1c; padding: .5rem 1rem; margin-bottom: 1rem; }
.cards { columns: 3; column-gap: 1rem; }
@media (max-width: 1024px) { .cards { columns: 2; } }
@media (max-width: 640px) { .cards { columns: 1; } }
.cards.layout-column { columns: 1; max-width: 28rem; margin: 0 auto; }
.statblock { break-inside: avoid; background: #f5f5f4; padding: .5rem; margin: 0 0 1rem; position: relative; font-size: .75rem; }
.statblock h2 { font-size: 1rem; margin: 0 0 .25rem; }
.statblock h3 { font-size: .75rem; margin: .25rem 0; }
.subtitle { font-style: italic; margin: 0 0 .25rem; }
.basics { border-top: 1px solid #d1d5db; border-bottom: 1px solid #d1d5db; padding: .25rem 0; margin: .25rem 0; }
.statblock p { margin: .1rem 0; }
.abilities { display: grid; grid-template-columns: repeat(6, 1fr); gap: .25rem; text-align: center; margin: .25rem 0; }
.ability .label { font-size: .65rem; font-weight: bold; text-transform: uppercase; }
.statblock section { border-top: 1px solid #d1d5db; padding-top: .25rem; margin-top: .25rem; }
.entry { margin-bottom: .25rem; }
.entry-name { font-weight: bold; }
.pre-wrap { white-space: pre-wrap; }
.card-controls { position: absolute; top: .25rem; right: .25rem; display: flex; gap: .25rem; }
@media print {
  .no-print { display: none !important; }
  body { margin: 0; }
  .cards, .cards.layout-column { columns: 2; max-width: none; margin: 1rem; }
  .statblock { break-inside: avoid-page; }
}
"#;

/// Full standalone page for the combined list, in order.
pub fn render_page<'a>(
    records: impl IntoIterator<Item = &'a StatblockRecord>,
    options: &RenderOptions,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&options.title)));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));
    if let Some(message) = &options.banner {
        html.push_str(&format!(
            "<div class=\"banner no-print\" role=\"alert\">{}</div>\n",
            escape_html(message)
        ));
    }
    html.push_str(&format!("<main class=\"cards {}\">\n", options.layout.class()));
    for (index, record) in records.into_iter().enumerate() {
        html.push_str(&render_card(index, record, options.controls));
    }
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

pub fn render_card(index: usize, record: &StatblockRecord, controls: bool) -> String {
    let mut html = format!("<article class=\"statblock\" data-index=\"{}\">\n", index);
    if controls {
        html.push_str(&format!(
            "<div class=\"card-controls no-print\">\
             <button type=\"button\" data-action=\"edit\" data-index=\"{i}\">Bearbeiten</button>\
             <button type=\"button\" data-action=\"remove\" data-index=\"{i}\">Entfernen</button>\
             </div>\n",
            i = index
        ));
    }
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(record.display_name())));
    if let Some(subtitle) = subtitle(record) {
        html.push_str(&format!("<p class=\"subtitle\">{}</p>\n", escape_html(&subtitle)));
    }

    let basics: Vec<(&str, String)> = [
        ("Rüstungsklasse", &record.ac),
        ("Trefferpunkte", &record.hp),
        ("Bewegungsrate", &record.speed),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| (label, v.text())))
    .collect();
    if !basics.is_empty() {
        html.push_str("<div class=\"basics\">\n");
        for (label, text) in basics {
            html.push_str(&labeled_line(label, &text));
        }
        html.push_str("</div>\n");
    }

    match record.ability_scores() {
        Some(scores) => {
            html.push_str("<div class=\"abilities\">\n");
            for (ability, score) in scores {
                html.push_str(&format!(
                    "<div class=\"ability\"><div class=\"label\">{}</div><div class=\"score\">{} ({})</div></div>\n",
                    ability.label(),
                    score,
                    format_modifier(ability_mod(score))
                ));
            }
            html.push_str("</div>\n");
        }
        None => tracing::warn!(
            name = record.display_name(),
            "statblock has no usable ability scores; rendering without them"
        ),
    }

    html.push_str(&details(record));

    html.push_str(&section("spells", "Zauberwirken", &record.spells, spell_entry));
    html.push_str(&section("traits", "Eigenschaften", &record.traits, |e| {
        plain_entry(e, &escape_html(&e.desc))
    }));
    html.push_str(&section("actions", "Aktionen", &record.actions, |e| {
        plain_entry(e, &highlight(&e.desc))
    }));
    html.push_str(&section(
        "legendary-actions",
        "Legendäre Aktionen",
        &record.legendary_actions,
        |e| plain_entry(e, &highlight(&e.desc)),
    ));
    html.push_str("</article>\n");
    html
}

/// `Mittelgroß Humanoide, neutral`; whichever parts are present.
fn subtitle(record: &StatblockRecord) -> Option<String> {
    let kind = [record.size.as_deref(), record.creature_type.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    match (kind.is_empty(), record.alignment.as_deref()) {
        (true, None) => None,
        (true, Some(alignment)) => Some(alignment.to_string()),
        (false, None) => Some(kind),
        (false, Some(alignment)) => Some(format!("{}, {}", kind, alignment)),
    }
}

fn details(record: &StatblockRecord) -> String {
    let mut lines: Vec<(&str, String)> = Vec::new();
    let optional = [
        ("Verwundbarkeiten", &record.damage_vulnerabilities),
        ("Resistenzen", &record.damage_resistances),
        ("Immunitäten", &record.damage_immunities),
        ("Zustandsimmunitäten", &record.condition_immunities),
    ];
    lines.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| value.clone().map(|v| (label, v))),
    );
    if !record.saves.is_empty() {
        lines.push(("Rettungswürfe", bonus_list(record.saves.iter())));
    }
    if !record.skillsaves.is_empty() {
        lines.push(("Fertigkeiten", bonus_list(record.skillsaves.iter())));
    }
    if let Some(senses) = &record.senses {
        lines.push(("Sinne", senses.clone()));
    }
    if let Some(languages) = &record.languages {
        lines.push(("Sprachen", languages.clone()));
    }
    if let Some(cr) = &record.cr {
        let text = match &record.xp {
            Some(xp) => format!("{} ({} EP)", cr, xp),
            None => cr.clone(),
        };
        lines.push(("Herausforderungsgrad", text));
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut html = String::from("<div class=\"details\">\n");
    for (label, text) in lines {
        html.push_str(&labeled_line(label, &text));
    }
    html.push_str("</div>\n");
    html
}

fn bonus_list<'a>(bonuses: impl Iterator<Item = (&'a String, &'a i64)>) -> String {
    bonuses
        .map(|(name, bonus)| format!("{} {}", name, format_modifier(*bonus)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn labeled_line(label: &str, text: &str) -> String {
    format!("<p><strong>{}</strong> {}</p>\n", label, escape_html(text))
}

fn section(
    class: &str,
    heading: &str,
    entries: &[Entry],
    render_entry: impl Fn(&Entry) -> String,
) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut html = format!("<section class=\"{}\">\n<h3>{}</h3>\n", class, heading);
    for entry in entries {
        html.push_str(&render_entry(entry));
    }
    html.push_str("</section>\n");
    html
}

/// `body_html` must already be escaped.
fn plain_entry(entry: &Entry, body_html: &str) -> String {
    let mut html = String::from("<div class=\"entry\">");
    if !entry.name.is_empty() {
        html.push_str(&format!("<p class=\"entry-name\">{}</p>", escape_html(&entry.name)));
    }
    html.push_str(&format!("<p class=\"pre-wrap\">{}</p></div>\n", body_html));
    html
}

fn spell_entry(entry: &Entry) -> String {
    if entry.name.is_empty() {
        format!("<p class=\"entry pre-wrap\">{}</p>\n", escape_html(&entry.desc))
    } else {
        format!(
            "<div class=\"entry\"><span class=\"entry-name\">{}: </span><span class=\"pre-wrap\">{}</span></div>\n",
            escape_html(&entry.name),
            escape_html(&entry.desc)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(yaml: &str) -> StatblockRecord {
        StatblockRecord::from_value(&serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn subtitle_combinations() {
        assert_eq!(subtitle(&record("name: x")), None);
        assert_eq!(
            subtitle(&record("size: Klein\ntype: Humanoide\nalignment: neutral böse")).as_deref(),
            Some("Klein Humanoide, neutral böse")
        );
        assert_eq!(subtitle(&record("alignment: gesinnungslos")).as_deref(), Some("gesinnungslos"));
    }

    #[test]
    fn layout_toggles_both_ways() {
        assert_eq!(Layout::Grid.toggled(), Layout::Column);
        assert_eq!(Layout::Column.toggled(), Layout::Grid);
    }

    #[test]
    fn empty_sections_are_skipped() {
        let html = render_card(0, &record("name: Nichts"), false);
        assert!(!html.contains("<section"));
        assert!(!html.contains("class=\"details\""));
        assert!(!html.contains("card-controls"));
    }
}
