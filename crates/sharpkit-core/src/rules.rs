//! Rule tables: pure functions over identifier and expression text.
//!
//! Everything here is process-wide immutable configuration, compiled once
//! and consulted by the visitors. No function in this module sees the
//! syntax tree; matching happens on the exact textual rendering of a
//! token span (default channel only, see [`crate::token::text_of`]).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// `using` directives that replace the Java import block.
pub const USINGS: [&str; 4] = [
    "System",
    "System.Linq",
    "Android.Graphics",
    "System.Collections.Generic",
];

/// Enumerators recognized in switch case labels.
pub const RESIZING_BEHAVIORS: [&str; 4] = ["AspectFit", "AspectFill", "Stretch", "Center"];

/// Members of the generated color helper class that keep their own name
/// (cased) instead of being qualified with the color class.
pub const COLOR_HELPER_MEMBERS: [&str; 2] = ["colorByBlendingColors", "colorByChangingAlpha"];

/// Java constant naming convention: `ALL_CAPS`, digits allowed after the
/// first character.
static JAVA_CONSTANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z_]+[A-Z_\d]*$").expect("valid constant pattern"));

/// Ordered expression substitution table. Patterns are anchored against the
/// whole expression text; the first match wins and later patterns are not
/// tried. Capture groups may be referenced from the replacement.
static EXPRESSION_MAPPINGS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"Paint\.ANTI_ALIAS_FLAG", "PaintFlags.AntiAlias"),
        (r"Paint\.Style\.FILL", "Paint.Style.Fill"),
        (r"Path\.FillType\.EVEN_ODD", "Path.FillType.EvenOdd"),
        (r"Path\.Direction\.CW", "Path.Direction.Cw"),
        (r"Shader\.TileMode\.CLAMP", "Shader.TileMode.Clamp"),
        (r"Canvas\.ALL_SAVE_FLAG", "SaveFlags.All"),
        (r"BlurMaskFilter\.Blur\.NORMAL", "BlurMaskFilter.Blur.Normal"),
        (r"Paint\.Style\.STROKE", "Paint.Style.Stroke"),
        (r"PorterDuff\.Mode\.SRC_IN", "PorterDuff.Mode.SrcIn"),
        (r"Arrays\.equals", "Enumerable.SequenceEqual"),
        (r"(.*)\.setFlags", "$1.Flags = "),
        (r"(.*)\.setColor", "$1.Color = (ColorWrapper)"),
        (r"(.*)\.setStrokeWidth", "$1.StrokeWidth = "),
        (r"(.*)\.setStrokeMiter", "$1.StrokeMiter = "),
        (
            r"(.*)\.drawColor\((.*)\.color\)",
            "$1.DrawColor((ColorWrapper)$2.Color)",
        ),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        let anchored = format!("^{pattern}$");
        (
            Regex::new(&anchored).expect("valid substitution pattern"),
            replacement,
        )
    })
    .collect()
});

/// Color accessor methods and their C# equivalents.
static COLOR_ACCESSORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("red", "GetRedComponent"),
        ("green", "GetGreenComponent"),
        ("blue", "GetBlueComponent"),
        ("alpha", "GetAlphaComponent"),
        ("argb", "Argb"),
        ("RGBToHSV", "RGBToHSV"),
        ("HSVToColor", "HSVToColor"),
    ])
});

/// Convert a camelCase identifier to PascalCase.
///
/// Uppercases the first letter, leaves internal case and digits untouched,
/// preserves leading underscores. Idempotent on already-Pascal input.
pub fn pascalize(ident: &str) -> String {
    let trimmed = ident.trim_start_matches('_');
    let (underscores, rest) = ident.split_at(ident.len() - trimmed.len());
    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => format!(
            "{underscores}{}{}",
            first.to_ascii_uppercase(),
            chars.as_str()
        ),
        None => ident.to_string(),
    }
}

/// Convert an `ALL_CAPS` constant into Pascal-cased words: `SRC_IN` becomes
/// `SrcIn`. Used only when qualifying constant references.
pub fn pascalize_constant(name: &str) -> String {
    let mut out = String::new();
    for word in name.split('_').filter(|word| !word.is_empty()) {
        let lower = word.to_ascii_lowercase();
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// First-match-wins substitution over an expression's exact text.
///
/// Returns the expanded replacement for the first table entry whose
/// anchored pattern matches, or `None` when no entry matches.
pub fn substitute_expression(text: &str) -> Option<String> {
    for (pattern, replacement) in EXPRESSION_MAPPINGS.iter() {
        if let Some(captures) = pattern.captures(text) {
            let mut out = String::new();
            captures.expand(replacement, &mut out);
            return Some(out);
        }
    }
    None
}

/// True when `text` follows the Java constant convention.
pub fn is_constant_convention(text: &str) -> bool {
    JAVA_CONSTANT.is_match(text)
}

/// Look up a color accessor method by its Java name.
pub fn color_accessor(name: &str) -> Option<&'static str> {
    COLOR_ACCESSORS.get(name).copied()
}

/// Qualified-name constant mapping.
///
/// Fires on references already prefixed with the color class
/// (`Color.argb` -> `Color.Argb`, `Color.RED` -> `Color.Red`) and on bare
/// text following the constant convention (`RED` -> `Color.Red`). Bare
/// accessor names are deliberately not mapped here; outside the color
/// helper class a bare `red` is just an identifier.
pub fn map_constant_reference(text: &str) -> Option<String> {
    if let Some(member) = text.strip_prefix("Color.") {
        if let Some(accessor) = COLOR_ACCESSORS.get(member) {
            return Some(format!("Color.{accessor}"));
        }
        if is_constant_convention(member) {
            return Some(format!("Color.{}", pascalize_constant(member)));
        }
        return None;
    }
    if is_constant_convention(text) {
        return Some(format!("Color.{}", pascalize_constant(text)));
    }
    None
}

/// Declared access modifiers relevant to visibility mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifierFlags {
    pub has_public: bool,
    pub has_private: bool,
    pub has_static: bool,
}

/// Edit the visibility-mapping rule wants applied to a member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityEdit {
    /// Insert the internal-visibility keyword before the declaration.
    InsertInternal,
    /// Replace the `private` keyword with the internal-visibility keyword.
    PrivateToInternal,
}

/// Map Java member visibility to C#.
///
/// Package-private members (no `public`, no `private`) become `internal`;
/// `private static` members become `internal static`; plain `private`
/// members stay private and `public` members are untouched.
pub fn map_visibility(flags: ModifierFlags) -> Option<VisibilityEdit> {
    if flags.has_public {
        return None;
    }
    if !flags.has_private {
        return Some(VisibilityEdit::InsertInternal);
    }
    if flags.has_static {
        return Some(VisibilityEdit::PrivateToInternal);
    }
    None
}

/// Primitive type name mapping. `boolean` is the only spelling that
/// differs between the two languages.
pub fn map_primitive(name: &str) -> Option<&'static str> {
    if name == "boolean" {
        Some("bool")
    } else {
        None
    }
}

/// Enum literal mapping for switch case labels.
pub fn map_enum_literal(text: &str) -> Option<String> {
    if RESIZING_BEHAVIORS.contains(&text) {
        Some(format!("ResizingBehavior.{text}"))
    } else {
        None
    }
}
