//! End-to-end fixtures: PaintCode-shaped Java in, exact C# out.
//!
//! The fixtures are miniature StyleKit units covering the full rewrite
//! surface: namespace and using rewriting, cache classes, visibility
//! mapping, setter substitution, constant qualification, the color helper
//! class, and the appended ColorWrapper asset. Comparisons are exact;
//! everything a rule does not match must come through byte-identical.

use pretty_assertions::assert_eq;
use sharpkit::{transpile, TranspileError, COLOR_WRAPPER};

const CHART_KIT_JAVA: &str = r#"package com.acme.charts;

import android.graphics.Canvas;
import android.graphics.Color;
import android.graphics.Paint;

public class ChartKit {

    public enum ResizingBehavior {
        AspectFit,
        AspectFill,
        Stretch,
        Center
    }

    private static class CacheForBadge {
        private static Paint paint = new Paint();
        private static RectF badgeRect = new RectF(0f, 0f, 40f, 40f);
    }

    public static void drawBadge(Canvas canvas) {
        Paint paint = CacheForBadge.paint;
        paint.reset();
        paint.setFlags(Paint.ANTI_ALIAS_FLAG);
        paint.setColor(Color.RED);
        paint.setStrokeWidth(2f);
        canvas.drawRect(CacheForBadge.badgeRect, paint);
    }
}
"#;

const CHART_KIT_CS: &str = r#"namespace com.acme.charts {

using System;
using System.Linq;
using Android.Graphics;
using System.Collections.Generic;

public class ChartKit {

    public enum ResizingBehavior {
        AspectFit,
        AspectFill,
        Stretch,
        Center
    }

    internal static class CacheForBadge {
        internal static Paint Paint = new Paint();
        internal static RectF BadgeRect = new RectF(0f, 0f, 40f, 40f);
    }

    public static void DrawBadge(Canvas canvas) {
        Paint paint = CacheForBadge.Paint;
        paint.Reset();
        paint.Flags = (PaintFlags.AntiAlias);
        paint.Color = (ColorWrapper)(Color.Red);
        paint.StrokeWidth = (2f);
        canvas.DrawRect(CacheForBadge.BadgeRect, paint);
    }
}"#;

#[test]
fn chart_kit_unit_converts_exactly() {
    let output = transpile(CHART_KIT_JAVA).expect("fixture transpiles");
    let expected = format!("{CHART_KIT_CS}\n}}\n\n{COLOR_WRAPPER}\n");
    assert_eq!(output, expected);
}

const COLOR_HELPER_JAVA: &str = r#"package com.acme.charts;

class PaintCodeColor extends Color {

    public static int colorByChangingAlpha(int color, int newAlpha) {
        return Color.argb(newAlpha, red(color), green(color), blue(color));
    }

    public static int translucent(int color) {
        return colorByChangingAlpha(color, 128);
    }

    @Override
    public boolean equals(Object other) {
        return other instanceof PaintCodeColor;
    }
}
"#;

#[test]
fn color_helper_unit_converts_exactly() {
    let output = transpile(COLOR_HELPER_JAVA).expect("fixture transpiles");
    let expected_body = "namespace com.acme.charts {\n\n\
class PaintCodeColor  {\n\n    \
public static int ColorByChangingAlpha(int color, int newAlpha) {\n        \
return Color.Argb(newAlpha, Color.GetRedComponent(color), Color.GetGreenComponent(color), Color.GetBlueComponent(color));\n    \
}\n\n    \
public static int Translucent(int color) {\n        \
return ColorByChangingAlpha(color, 128);\n    \
}\n\n    \n    \
public override bool Equals(Object other) {\n        \
return other is PaintCodeColor;\n    \
}\n}";
    let expected = format!("{expected_body}\n}}\n\n{COLOR_WRAPPER}\n");
    assert_eq!(output, expected);
}

#[test]
fn units_without_a_package_get_no_namespace_brace() {
    let output = transpile("class Kit { }\n").expect("fixture transpiles");
    let expected = format!("class Kit {{ }}\n\n{COLOR_WRAPPER}\n");
    assert_eq!(output, expected);
}

#[test]
fn resizing_behavior_switch_converts() {
    let source = "class Kit {\n    static void apply(ResizingBehavior resizing, float ratio) {\n        switch (resizing) {\n            case AspectFit:\n                ratio = ratio < 1f ? ratio : 1f;\n                break;\n            case Stretch:\n                break;\n            default:\n                break;\n        }\n    }\n}\n";
    let output = transpile(source).expect("fixture transpiles");
    assert!(output.contains("case ResizingBehavior.AspectFit:"));
    assert!(output.contains("case ResizingBehavior.Stretch:"));
    assert!(output.contains("default:"));
    assert!(output.contains("ratio = ratio < 1f ? ratio : 1f;"));
}

#[test]
fn draw_color_substitution_consumes_the_whole_call() {
    let source = "class Kit { static void fill(Canvas canvas, Paint paint) { canvas.drawColor(paint.color); } }\n";
    let output = transpile(source).expect("fixture transpiles");
    assert!(output.contains("canvas.DrawColor((ColorWrapper)paint.Color);"));
}

#[test]
fn arrays_equals_maps_to_linq() {
    let source = "class Kit { static boolean same(float[] a, float[] b) { return Arrays.equals(a, b); } }\n";
    let output = transpile(source).expect("fixture transpiles");
    assert!(output.contains("static bool Same(float[] a, float[] b)"));
    assert!(output.contains("return Enumerable.SequenceEqual(a, b);"));
}

#[test]
fn malformed_input_fails_without_partial_output() {
    let err = transpile("class Kit { void broken( }").unwrap_err();
    assert!(matches!(err, TranspileError::Parse(_)));

    let err = transpile("class Kit { void f() { Runnable r = () -> { }; } }").unwrap_err();
    assert!(matches!(err, TranspileError::Parse(_)));
}
