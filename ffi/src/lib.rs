use engine::{Layout, RenderOptions, Statblock, ability_mod, format_modifier, ingest_custom};
use jni::objects::{JClass, JString};
use jni::sys::{jint, jlong, jstring};
use jni::JNIEnv;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// `{"ok":true,"result":..}` or `{"ok":false,"error":".."}`.
#[derive(Debug, Serialize)]
struct Reply {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Reply {
    fn ok(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn err(e: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(e.to_string()),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"ok":false,"error":"unserializable reply"}"#.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RenderRequest {
    Sources(Vec<String>),
    Page {
        sources: Vec<String>,
        #[serde(default)]
        layout: Layout,
    },
}

impl RenderRequest {
    fn into_parts(self) -> (Vec<String>, Layout) {
        match self {
            RenderRequest::Sources(sources) => (sources, Layout::default()),
            RenderRequest::Page { sources, layout } => (sources, layout),
        }
    }
}

fn to_jstring(env: &JNIEnv, text: String) -> jstring {
    match env.new_string(text) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn with_input(mut env: JNIEnv, input: JString, f: impl FnOnce(&str) -> Reply) -> jstring {
    let reply = match env.get_string(&input) {
        Ok(s) => f(&String::from(s)),
        Err(e) => Reply::err(format!("invalid_input: {}", e)),
    };
    to_jstring(&env, reply.to_json())
}

#[no_mangle]
pub extern "system" fn Java_com_statblocks_Ffi_version(env: JNIEnv, _class: JClass) -> jstring {
    to_jstring(&env, version_internal().to_string())
}

#[no_mangle]
pub extern "system" fn Java_com_statblocks_Ffi_abilityModifier(
    _env: JNIEnv,
    _class: JClass,
    score: jlong,
) -> jint {
    ability_modifier_internal(score).clamp(jint::MIN.into(), jint::MAX.into()) as jint
}

#[no_mangle]
pub extern "system" fn Java_com_statblocks_Ffi_ingestJson(
    env: JNIEnv,
    _class: JClass,
    text: JString,
) -> jstring {
    with_input(env, text, ingest_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_statblocks_Ffi_renderCardsJson(
    env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    with_input(env, json, render_cards_internal)
}

// Internal functions for testing without JNI overhead
pub fn version_internal() -> &'static str {
    concat!("statblocks-ffi ", env!("CARGO_PKG_VERSION"))
}

pub fn ability_modifier_internal(score: i64) -> i64 {
    ability_mod(score)
}

fn ingest_internal(text: &str) -> Reply {
    match ingest_custom(text) {
        Ok(statblock) => match serde_json::to_value(statblock.record()) {
            Ok(record) => Reply::ok(json!({
                "name": statblock.name(),
                "source": statblock.source(),
                "record": record,
                "modifiers": modifiers(&statblock),
            })),
            Err(e) => Reply::err(e),
        },
        Err(e) => Reply::err(e),
    }
}

fn modifiers(statblock: &Statblock) -> Value {
    match statblock.record().ability_scores() {
        Some(scores) => scores
            .iter()
            .map(|(ability, score)| {
                let modifier = format_modifier(ability_mod(*score));
                (ability.label().to_string(), Value::String(modifier))
            })
            .collect::<serde_json::Map<_, _>>()
            .into(),
        None => Value::Null,
    }
}

/// Request: `[yaml, ..]` or `{"sources": [yaml, ..], "layout": "grid" | "column"}`.
/// Every source must parse; the first failure names its position.
fn render_cards_internal(input: &str) -> Reply {
    let request: RenderRequest = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => return Reply::err(format!("invalid_request: {}", e)),
    };
    let (sources, layout) = request.into_parts();
    let mut statblocks = Vec::with_capacity(sources.len());
    for (index, source) in sources.iter().enumerate() {
        match ingest_custom(source) {
            Ok(sb) => statblocks.push(sb),
            Err(e) => return Reply::err(format!("source {}: {}", index, e)),
        }
    }
    let options = RenderOptions {
        layout,
        controls: false,
        ..RenderOptions::default()
    };
    let html = engine::render_page(statblocks.iter().map(Statblock::record), &options);
    Reply::ok(Value::String(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(reply: Reply) -> Value {
        serde_json::from_str(&reply.to_json()).unwrap()
    }

    #[test]
    fn version_names_the_crate() {
        assert!(version_internal().starts_with("statblocks-ffi "));
    }

    #[test]
    fn modifier_floors_toward_negative() {
        assert_eq!(ability_modifier_internal(10), 0);
        assert_eq!(ability_modifier_internal(9), -1);
        assert_eq!(ability_modifier_internal(1), -5);
        assert_eq!(ability_modifier_internal(20), 5);
        assert_eq!(ability_modifier_internal(i64::MIN), (i64::MIN / 2));
    }

    #[test]
    fn extreme_scores_do_not_panic() {
        let v = parse(render_cards_internal(
            r#"["stats: [-9223372036854775808, 9223372036854775807, 10, 10, 10, 10]"]"#,
        ));
        assert_eq!(v["ok"], true);
        let v = parse(ingest_internal("stats: [-9223372036854775808, 10, 10, 10, 10, 10]"));
        assert_eq!(v["result"]["modifiers"]["STR"], "-4611686018427387904");
    }

    #[test]
    fn ingest_returns_record_and_modifiers() {
        let v = parse(ingest_internal(
            "```statblock\nname: Wolf\ncr: 1/4\nstats: [12, 15, 12, 3, 12, 6]\n```",
        ));
        assert_eq!(v["ok"], true);
        assert_eq!(v["result"]["name"], "Wolf");
        assert_eq!(v["result"]["record"]["cr"], "1/4");
        assert_eq!(v["result"]["modifiers"]["DEX"], "+2");
        assert_eq!(v["result"]["modifiers"]["INT"], "-4");
    }

    #[test]
    fn ingest_error_is_wrapped_and_escaped() {
        let v = parse(ingest_internal("name: \"unterminated"));
        assert_eq!(v["ok"], false);
        assert!(v["error"].as_str().unwrap().starts_with("invalid YAML format"));
        assert!(v.get("result").is_none());
    }

    #[test]
    fn render_cards_builds_a_page() {
        let v = parse(render_cards_internal(
            r#"{"sources": ["name: Eins", "name: Zwei"], "layout": "column"}"#,
        ));
        let html = v["result"].as_str().unwrap();
        assert!(html.contains("cards layout-column"));
        assert!(html.find("<h2>Eins</h2>").unwrap() < html.find("<h2>Zwei</h2>").unwrap());
        assert!(!html.contains("data-action"));
    }

    #[test]
    fn render_cards_reports_bad_source_position() {
        let v = parse(render_cards_internal(r#"{"sources": ["name: Eins", "- a"]}"#));
        assert_eq!(v["ok"], false);
        assert!(v["error"].as_str().unwrap().starts_with("source 1:"));

        let v = parse(render_cards_internal(r#"{"layout": "grid"}"#));
        assert!(v["error"].as_str().unwrap().starts_with("invalid_request"));
    }

    #[test]
    fn render_cards_accepts_bare_array() {
        let v = parse(render_cards_internal(r#"["name: Eins"]"#));
        let html = v["result"].as_str().unwrap();
        assert!(html.contains("cards layout-grid"));
        assert!(html.contains("<h2>Eins</h2>"));
    }
}
