//! JSON shape of the compiled output, as consumed by renderers.

#![cfg(feature = "serde")]

use ass_compiler::compiler::TagKey;
use ass_compiler::{compile, CompileOptions, CompiledScript};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn compile_json(events: &str) -> Value {
    let text = format!(
        "[Script Info]\nPlayResX: 640\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n{events}"
    );
    serde_json::to_value(compile(&text, &CompileOptions::default())).unwrap_or(Value::Null)
}

#[test]
fn fragment_tags_serialize_as_flat_objects() {
    let value = compile_json("Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello {\\b1}World");

    let fragments = &value["dialogues"][0]["slices"][0]["fragments"];
    assert_eq!(fragments[0]["tag"], json!({}));
    assert_eq!(fragments[0]["text"], json!("Hello "));
    assert_eq!(fragments[1]["tag"], json!({ "b": 1.0 }));
    assert_eq!(fragments[1]["drawing"], Value::Null);

    assert_eq!(value["width"], json!(640.0));
    assert_eq!(value["height"], Value::Null);
    assert_eq!(value["collisions"], json!("Normal"));
    assert_eq!(value["info"], json!({ "PlayResX": "640" }));
}

#[test]
fn event_level_fields_use_renderer_names() {
    let value = compile_json(
        "Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,{\\move(0,0,10,10)\\fad(100,200)\\t(0,500,\\frz90)\\K20}x",
    );

    let event = &value["dialogues"][0];
    assert_eq!(event["move"]["x2"], json!(10.0));
    assert_eq!(event["fade"], json!({ "type": "fad", "t1": 100.0, "t2": 200.0 }));
    assert_eq!(event["slices"][0]["borderStyle"], json!(1.0));

    let tag = &event["slices"][0]["fragments"][0]["tag"];
    assert_eq!(tag["K"], json!(20.0));
    assert_eq!(tag["t"][0]["tag"], json!({ "frz": 90.0 }));
    assert_eq!(tag["t"][0]["t2"], json!(500.0));
}

#[test]
fn drawings_serialize_with_path_and_box() {
    let value = compile_json("Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,{\\p1}m 0 0 l 4 2");

    let drawing = &value["dialogues"][0]["slices"][0]["fragments"][0]["drawing"];
    assert_eq!(drawing["d"], json!("M0,0L4,2"));
    assert_eq!(drawing["instructions"][1]["type"], json!("L"));
    assert_eq!(drawing["instructions"][1]["points"], json!([{ "x": 4.0, "y": 2.0 }]));
    assert_eq!(drawing["minX"], json!(0.0));
    assert_eq!(drawing["width"], json!(4.0));
}

#[test]
fn compiled_script_round_trips_through_json() {
    let script = compile(
        "[V4+ Styles]\nFormat: Name, Fontsize\nStyle: Big,48\n\n[Events]\nFormat: Start, End, Style, Text\nDialogue: 0:00:00.00,0:00:01.00,Big,{\\c&H00FF00&\\pos(1,2)}x",
        &CompileOptions::default(),
    );

    let text = serde_json::to_string(&script).unwrap_or_default();
    let back: Option<CompiledScript> = serde_json::from_str(&text).ok();
    assert_eq!(back.as_ref().map(|s| &s.dialogues), Some(&script.dialogues));
    assert_eq!(back.map(|s| s.styles.len()), Some(2));
}

#[test]
fn empty_drawing_box_round_trips() {
    let script = compile(
        "[Events]\nFormat: Start, End, Text\nDialogue: 0:00:00.00,0:00:01.00,{\\p1}x y z",
        &CompileOptions::default(),
    );
    let text = serde_json::to_string(&script).unwrap();
    assert!(text.contains(r#""minX":null,"minY":null,"width":null,"height":null"#));

    let back: CompiledScript = serde_json::from_str(&text).unwrap();
    let drawing = back.dialogues[0].slices[0].fragments[0].drawing.as_ref().unwrap();
    assert!(drawing.is_empty());
    assert_eq!(drawing.min_x, f64::INFINITY);
    assert_eq!(drawing.width, f64::NEG_INFINITY);
    assert_eq!(back.dialogues, script.dialogues);
}

#[test]
fn unparsable_tag_values_round_trip_as_nan() {
    let script = compile(
        "[Events]\nFormat: Start, End, Text\nDialogue: 0:00:00.00,0:00:01.00,{\\b1x\\pos(a,2)}x",
        &CompileOptions::default(),
    );
    let text = serde_json::to_string(&script).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["dialogues"][0]["slices"][0]["fragments"][0]["tag"]["b"], Value::Null);
    assert_eq!(value["dialogues"][0]["pos"], json!({ "x": null, "y": 2.0 }));

    let back: CompiledScript = serde_json::from_str(&text).unwrap();
    let event = &back.dialogues[0];
    assert!(event.slices[0].fragments[0].tag.number(TagKey::B).is_some_and(f64::is_nan));
    assert!(event.pos.is_some_and(|pos| pos.x.is_nan() && pos.y == 2.0));
    assert_eq!(serde_json::to_value(&back).unwrap(), value);
}
