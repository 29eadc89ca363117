use engine::{Layout, RenderOptions, Statblock, StatblockRecord, highlight, render_card, render_page};

fn record(yaml: &str) -> StatblockRecord {
    Statblock::parse(yaml).unwrap().record().clone()
}

const BANDIT: &str = r#"
name: Bandit
size: Mittelgroß
type: Humanoide (jedes Volk)
alignment: jede nicht-rechtschaffene Gesinnung
ac: 12 (Lederrüstung)
hp:
  value: 11
  formula: 2W8+2
speed: 9 m
stats: [11, 12, 12, 10, 10, 10]
senses: Passive Wahrnehmung 10
languages: Eine beliebige Sprache (normalerweise Gemeinsprache)
cr: 1/8
xp: 25
actions:
  - name: Krummsäbel
    desc: "Nahkampfwaffenangriff: +3 auf Treffer, Reichweite 1,5 m, ein Ziel. Treffer: 4 (1W6+1) Hiebschaden."
"#;

#[test]
fn highlight_german_attack_line() {
    insta::assert_snapshot!(
        highlight("Nahkampfwaffenangriff: +3 auf Treffer, Reichweite 1,5 m, ein Ziel. Treffer: 4 (1W6+1) Hiebschaden."),
        @"Nahkampfwaffenangriff: <strong>+3 auf Treffer</strong>, Reichweite 1,5 m, ein Ziel. Treffer: <strong>4 (1W6+1) Hiebschaden</strong>."
    );
}

#[test]
fn highlight_saving_throw_and_generic_patterns() {
    insta::assert_snapshot!(
        highlight("SG-16-Weisheitsrettungswurf oder 2d6+3 Schaden, DC 15, +5 zu treffen"),
        @"<strong>SG-16-Weisheitsrettungswurf</strong> oder <strong>2d6+3</strong> Schaden, <strong>DC 15</strong>, <strong>+5 zu treffen</strong>"
    );
}

#[test]
fn highlight_escapes_before_wrapping() {
    let out = highlight("<script>alert(1)</script> +4 auf Treffer");
    assert!(!out.contains("<script>"));
    assert!(out.starts_with("&lt;script&gt;alert(1)&lt;/script&gt; "));
    assert!(out.ends_with("<strong>+4 auf Treffer</strong>"));
}

#[test]
fn card_shows_basics_grid_and_details() {
    let html = render_card(3, &record(BANDIT), true);
    assert!(html.contains("<h2>Bandit</h2>"));
    assert!(html.contains("Mittelgroß Humanoide (jedes Volk), jede nicht-rechtschaffene Gesinnung"));
    assert!(html.contains("<strong>Rüstungsklasse</strong> 12 (Lederrüstung)"));
    assert!(html.contains("<strong>Trefferpunkte</strong> 11 (2W8+2)"));
    assert!(html.contains("<div class=\"label\">STR</div><div class=\"score\">11 (+0)</div>"));
    assert!(html.contains("<div class=\"label\">DEX</div><div class=\"score\">12 (+1)</div>"));
    assert!(html.contains("<strong>Herausforderungsgrad</strong> 1/8 (25 EP)"));
    assert!(html.contains("<strong>4 (1W6+1) Hiebschaden</strong>"));
    assert!(html.contains("data-action=\"remove\" data-index=\"3\""));
    assert!(!html.contains("Verwundbarkeiten"));
    assert!(!html.contains("Legendäre Aktionen"));
}

#[test]
fn wrong_sized_stats_render_partial_card() {
    let html = render_card(0, &record("name: Schleim\nstats: [1, 2, 3]\ncr: 1"), false);
    assert!(html.contains("<h2>Schleim</h2>"));
    assert!(!html.contains("class=\"abilities\""));
    assert!(html.contains("Herausforderungsgrad"));
}

#[test]
fn record_text_is_escaped_everywhere() {
    let html = render_card(
        0,
        &record("name: \"<img src=x onerror=alert(1)>\"\ntraits:\n  - name: \"<b>\"\n    desc: \"a & b\"\n"),
        false,
    );
    assert!(!html.contains("<img"));
    assert!(!html.contains("<b>"));
    assert!(html.contains("a &amp; b"));
}

#[test]
fn spells_skills_and_legendary_sections() {
    let html = render_card(
        0,
        &record(
            "name: Lich\nskillsaves:\n  - Arkane Kunde: 18\n  - Wahrnehmung: 9\nsaves:\n  - Konstitution: 10\nspells:\n  - Der Lich ist ein Zauberwirker der 18. Stufe.\n  - Zaubertricks (beliebig oft): Magierhand\nlegendary_actions:\n  - name: Zaubertrick\n    desc: Der Lich wirkt einen Zaubertrick, DC 20.\n",
        ),
        false,
    );
    assert!(html.contains("<strong>Fertigkeiten</strong> Arkane Kunde +18, Wahrnehmung +9"));
    assert!(html.contains("<strong>Rettungswürfe</strong> Konstitution +10"));
    assert!(html.contains("<h3>Zauberwirken</h3>"));
    assert!(html.contains("<span class=\"entry-name\">Zaubertricks (beliebig oft): </span>"));
    assert!(html.contains("<h3>Legendäre Aktionen</h3>"));
    assert!(html.contains("<strong>DC 20</strong>"));
}

#[test]
fn page_carries_layout_and_print_rules() {
    let bandit = record(BANDIT);
    let options = RenderOptions {
        layout: Layout::Column,
        banner: Some("failed to fetch monster data: <timeout>".into()),
        ..RenderOptions::default()
    };
    let html = render_page([&bandit, &bandit], &options);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<main class=\"cards layout-column\">"));
    assert!(html.contains("@media print"));
    assert!(html.contains(".no-print { display: none !important; }"));
    assert!(html.contains("columns: 2;"));
    assert!(html.contains("role=\"alert\">failed to fetch monster data: &lt;timeout&gt;</div>"));
    assert_eq!(html.matches("<article class=\"statblock\"").count(), 2);
    assert!(html.contains("data-index=\"1\""));
}

#[test]
fn extreme_numbers_render_without_panicking() {
    let html = render_card(
        0,
        &record(
            "name: Unmöglich\nstats: [-9223372036854775808, 9223372036854775807, 10, 10, 10, 10]\n\
             saves:\n  - Stärke: -9223372036854775808\nskillsaves:\n  - Wahrnehmung: -9223372036854775808",
        ),
        false,
    );
    assert!(html.contains("<div class=\"score\">-9223372036854775808 (-4611686018427387904)</div>"));
    assert!(html.contains("<div class=\"score\">9223372036854775807 (+4611686018427387898)</div>"));
    assert!(html.contains("Wahrnehmung -9223372036854775808"));
}
