//! Style compiler
//!
//! Each style row is merged over the built-in default style, its numeric
//! fields are coerced, its four colors are parsed and its base tag set is
//! derived. The base tag set is what a fragment starts from before any
//! override tag applies.

use crate::compiler::tags::{ResolvedTags, TagKey, TagValue};
use crate::parser::ScriptInfo;
use crate::utils::{
    coerce_number, create_hash_map_with_capacity, parse_style_color, AssHashMap, ColorPair,
};

#[cfg(feature = "serde")]
use crate::utils::float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fields of the implicit `Default` style, matching Aegisub
pub const DEFAULT_STYLE: [(&str, &str); 23] = [
    ("Name", "Default"),
    ("Fontname", "Arial"),
    ("Fontsize", "20"),
    ("PrimaryColour", "&H00FFFFFF&"),
    ("SecondaryColour", "&H000000FF&"),
    ("OutlineColour", "&H00000000&"),
    ("BackColour", "&H00000000&"),
    ("Bold", "0"),
    ("Italic", "0"),
    ("Underline", "0"),
    ("StrikeOut", "0"),
    ("ScaleX", "100"),
    ("ScaleY", "100"),
    ("Spacing", "0"),
    ("Angle", "0"),
    ("BorderStyle", "1"),
    ("Outline", "2"),
    ("Shadow", "2"),
    ("Alignment", "2"),
    ("MarginL", "10"),
    ("MarginR", "10"),
    ("MarginV", "10"),
    ("Encoding", "1"),
];

/// Whether `field` is a style column the compiler understands
#[must_use]
pub fn is_style_field(field: &str) -> bool {
    field == "TertiaryColour" || DEFAULT_STYLE.iter().any(|(name, _)| *name == field)
}

/// Style fields after merging and numeric coercion
///
/// Numeric fields that do not parse are `NaN`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRecord {
    pub name: String,
    pub fontname: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub fontsize: f64,
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub bold: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub italic: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub underline: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub strike_out: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub scale_x: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub scale_y: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub spacing: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub angle: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub border_style: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub outline: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub shadow: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub alignment: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub margin_l: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub margin_r: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub margin_v: f64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "float::nan_if_null"))]
    pub encoding: f64,
    /// Columns outside the standard set, unmodified
    pub extra: Vec<(String, String)>,
}

/// Ordered raw field set used while merging
#[derive(Debug, Clone, Default)]
struct StyleFields(Vec<(String, String)>);

impl StyleFields {
    fn defaults(overrides: &[(String, String)]) -> Self {
        let mut fields = Self::default();
        for (name, value) in DEFAULT_STYLE {
            fields.set(name, value);
        }
        for (name, value) in overrides {
            fields.set(name, value);
        }
        fields
    }

    fn set(&mut self, name: &str, value: &str) {
        // SSA v4 scripts call the outline color TertiaryColour
        let name = if name == "TertiaryColour" {
            "OutlineColour"
        } else {
            name
        };
        match self.0.iter_mut().find(|(field, _)| field == name) {
            Some(entry) => value.clone_into(&mut entry.1),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map_or("", |(_, value)| value.as_str())
    }

    fn into_record(self) -> StyleRecord {
        let text = |name: &str| self.get(name).to_string();
        let number = |name: &str| coerce_number(self.get(name));

        let mut name = text("Name");
        if name.ends_with("Default") && name.len() > "Default".len() {
            let stars = &name[..name.len() - "Default".len()];
            if stars.bytes().all(|b| b == b'*') {
                name = "Default".to_string();
            }
        }

        StyleRecord {
            name,
            fontname: text("Fontname"),
            fontsize: number("Fontsize"),
            primary_colour: text("PrimaryColour"),
            secondary_colour: text("SecondaryColour"),
            outline_colour: text("OutlineColour"),
            back_colour: text("BackColour"),
            bold: number("Bold"),
            italic: number("Italic"),
            underline: number("Underline"),
            strike_out: number("StrikeOut"),
            scale_x: number("ScaleX"),
            scale_y: number("ScaleY"),
            spacing: number("Spacing"),
            angle: number("Angle"),
            border_style: number("BorderStyle"),
            outline: number("Outline"),
            shadow: number("Shadow"),
            alignment: number("Alignment"),
            margin_l: number("MarginL"),
            margin_r: number("MarginR"),
            margin_v: number("MarginV"),
            encoding: number("Encoding"),
            extra: self
                .0
                .iter()
                .filter(|(field, _)| !is_style_field(field))
                .cloned()
                .collect(),
        }
    }
}

/// A style ready for the dialogue compiler
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStyle {
    pub style: StyleRecord,
    /// Base tag set of fragments using this style
    pub tag: ResolvedTags,
}

impl CompiledStyle {
    /// Compile one merged style record
    #[must_use]
    pub fn new(style: StyleRecord, wrap_style: f64) -> Self {
        let tag = base_tags(&style, wrap_style);
        Self { style, tag }
    }
}

fn style_color(name: &str, field: &str) -> ColorPair {
    parse_style_color(field).unwrap_or_else(|err| {
        tracing::debug!(style = name, %err, "style color replaced with opaque black");
        ColorPair::opaque_black()
    })
}

fn base_tags(style: &StyleRecord, wrap_style: f64) -> ResolvedTags {
    let mut tag = ResolvedTags::new();
    let number = |tag: &mut ResolvedTags, key, value| tag.insert(key, TagValue::Number(value));

    tag.insert(TagKey::Fn, TagValue::Text(style.fontname.clone()));
    number(&mut tag, TagKey::Fs, style.fontsize);

    let colors = [
        &style.primary_colour,
        &style.secondary_colour,
        &style.outline_colour,
        &style.back_colour,
    ];
    for (slot, field) in (1u8..).zip(colors) {
        let ColorPair { alpha, color } = style_color(&style.name, field);
        if let (Some(color_key), Some(alpha_key)) = (TagKey::color(slot), TagKey::alpha(slot)) {
            tag.insert(color_key, TagValue::Text(color));
            tag.insert(alpha_key, TagValue::Text(alpha));
        }
    }

    number(&mut tag, TagKey::B, style.bold.abs());
    number(&mut tag, TagKey::I, style.italic.abs());
    number(&mut tag, TagKey::U, style.underline.abs());
    number(&mut tag, TagKey::S, style.strike_out.abs());
    number(&mut tag, TagKey::Fscx, style.scale_x);
    number(&mut tag, TagKey::Fscy, style.scale_y);
    number(&mut tag, TagKey::Fsp, style.spacing);
    number(&mut tag, TagKey::Frz, style.angle);
    number(&mut tag, TagKey::Xbord, style.outline);
    number(&mut tag, TagKey::Ybord, style.outline);
    number(&mut tag, TagKey::Xshad, style.shadow);
    number(&mut tag, TagKey::Yshad, style.shadow);
    number(&mut tag, TagKey::Q, wrap_style);

    tag
}

/// Wrap mode from `[Script Info]`, 2 unless it is exactly `0` to `3`
#[must_use]
pub fn wrap_style(info: &ScriptInfo) -> f64 {
    match info.get("WrapStyle") {
        Some("0") => 0.0,
        Some("1") => 1.0,
        Some("3") => 3.0,
        _ => 2.0,
    }
}

/// Compile the implicit `Default` style plus every style row
///
/// Rows are matched to `format` by position. A later style with the same
/// name replaces an earlier one, so a script's own `Default` replaces the
/// built-in one.
#[must_use]
pub fn compile_styles(
    info: &ScriptInfo,
    format: &[String],
    rows: &[Vec<String>],
    default_overrides: &[(String, String)],
) -> AssHashMap<String, CompiledStyle> {
    let wrap = wrap_style(info);
    let mut styles = create_hash_map_with_capacity(rows.len() + 1);

    let mut implicit = StyleFields::defaults(default_overrides);
    implicit.set("Name", "Default");
    let record = implicit.into_record();
    styles.insert(record.name.clone(), CompiledStyle::new(record, wrap));

    for row in rows {
        let mut fields = StyleFields::defaults(default_overrides);
        for (column, value) in format.iter().zip(row) {
            fields.set(column, value);
        }
        let record = fields.into_record();
        styles.insert(record.name.clone(), CompiledStyle::new(record, wrap));
    }

    styles
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn info(pairs: &[(&str, &str)]) -> ScriptInfo {
        let mut info = ScriptInfo::default();
        for (key, value) in pairs {
            info.insert(*key, *value);
        }
        info
    }

    #[test]
    fn implicit_default_always_exists() {
        let styles = compile_styles(&ScriptInfo::default(), &[], &[], &[]);
        let default = &styles["Default"];

        assert_eq!(default.style.fontname, "Arial");
        assert_eq!(default.tag.number(TagKey::Fs), Some(20.0));
        assert_eq!(default.tag.text(TagKey::C1), Some("FFFFFF"));
        assert_eq!(default.tag.text(TagKey::C2), Some("0000FF"));
        assert_eq!(default.tag.text(TagKey::A1), Some("00"));
        assert_eq!(default.tag.number(TagKey::Xbord), Some(2.0));
        assert_eq!(default.tag.number(TagKey::Q), Some(2.0));
    }

    #[test]
    fn rows_merge_over_defaults() {
        let format = columns(&["Name", "Fontsize", "Bold", "PrimaryColour"]);
        let rows = vec![columns(&["Sign", "48", "-1", "&H8000FF00&"])];
        let styles = compile_styles(&ScriptInfo::default(), &format, &rows, &[]);
        let sign = &styles["Sign"];

        assert_eq!(sign.style.fontname, "Arial");
        assert_eq!(sign.style.margin_v, 10.0);
        assert_eq!(sign.tag.number(TagKey::Fs), Some(48.0));
        assert_eq!(sign.tag.number(TagKey::B), Some(1.0));
        assert_eq!(sign.tag.text(TagKey::C1), Some("00FF00"));
        assert_eq!(sign.tag.text(TagKey::A1), Some("80"));
    }

    #[test]
    fn starred_default_is_default() {
        let format = columns(&["Name", "Fontname"]);
        let rows = vec![columns(&["**Default", "Verdana"]), columns(&["*Defaults", "X"])];
        let styles = compile_styles(&ScriptInfo::default(), &format, &rows, &[]);

        assert_eq!(styles["Default"].style.fontname, "Verdana");
        assert!(styles.contains_key("*Defaults"));
    }

    #[test]
    fn caller_defaults_apply_everywhere() {
        let overrides = vec![("Fontname".to_string(), "Noto Sans".to_string())];
        let format = columns(&["Name"]);
        let rows = vec![columns(&["Other"])];
        let styles = compile_styles(&ScriptInfo::default(), &format, &rows, &overrides);

        assert_eq!(styles["Default"].style.fontname, "Noto Sans");
        assert_eq!(styles["Other"].style.fontname, "Noto Sans");
    }

    #[test]
    fn wrap_style_from_info() {
        assert_eq!(wrap_style(&info(&[("WrapStyle", "1")])), 1.0);
        assert_eq!(wrap_style(&info(&[("WrapStyle", "4")])), 2.0);
        assert_eq!(wrap_style(&info(&[("WrapStyle", "01")])), 2.0);
        assert_eq!(wrap_style(&info(&[])), 2.0);
    }

    #[test]
    fn bad_colors_and_numbers_degrade() {
        let format = columns(&["Name", "BackColour", "Outline", "Encoding"]);
        let rows = vec![columns(&["Odd", "9999999999", "thick", "0"])];
        let styles = compile_styles(&ScriptInfo::default(), &format, &rows, &[]);
        let odd = &styles["Odd"];

        assert_eq!(odd.tag.text(TagKey::C4), Some("000000"));
        assert_eq!(odd.tag.text(TagKey::A4), Some("00"));
        assert!(odd.style.outline.is_nan());
        assert_eq!(odd.style.encoding, 0.0);
    }

    #[test]
    fn v4_tertiary_colour_and_extra_fields() {
        let format = columns(&["Name", "TertiaryColour", "AlphaLevel"]);
        let rows = vec![columns(&["Old", "&H00112233", "0"])];
        let styles = compile_styles(&ScriptInfo::default(), &format, &rows, &[]);
        let old = &styles["Old"];

        assert_eq!(old.style.outline_colour, "&H00112233");
        assert_eq!(old.tag.text(TagKey::C3), Some("112233"));
        assert_eq!(old.style.extra, vec![("AlphaLevel".to_string(), "0".to_string())]);
    }
}
