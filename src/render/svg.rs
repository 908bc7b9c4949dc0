use std::fmt::Write;

use super::format::escape;

/// A4 portrait in PostScript points.
pub const A4_WIDTH: f64 = 595.3;
pub const A4_HEIGHT: f64 = 841.9;

pub const ACCENT: &str = "#f26722";
pub const INK: &str = "#231f20";
pub const SHADE_EVEN: &str = "#e6e7e8";
pub const SHADE_ODD: &str = "#f1f2f2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub size: f64,
    pub bold: bool,
    pub anchor: Anchor,
    pub fill: &'static str,
}

impl Style {
    pub const fn plain(size: f64) -> Self {
        Self {
            size,
            bold: false,
            anchor: Anchor::Start,
            fill: INK,
        }
    }

    pub const fn bold(size: f64) -> Self {
        Self {
            bold: true,
            ..Self::plain(size)
        }
    }

    pub const fn end(self) -> Self {
        Self {
            anchor: Anchor::End,
            ..self
        }
    }

    pub const fn middle(self) -> Self {
        Self {
            anchor: Anchor::Middle,
            ..self
        }
    }

    pub const fn fill(self, fill: &'static str) -> Self {
        Self { fill, ..self }
    }
}

/// Minimal append-only SVG writer for fixed page layouts.
pub struct SvgPage {
    height: f64,
    body: String,
}

impl SvgPage {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            body: String::new(),
        }
    }

    pub fn a4() -> Self {
        Self::new(A4_HEIGHT)
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) -> &mut Self {
        let _ = writeln!(
            self.body,
            r#"<rect x="{x:.1}" y="{y:.2}" width="{w:.1}" height="{h:.2}" fill="{fill}"/>"#
        );
        self
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) -> &mut Self {
        let _ = writeln!(
            self.body,
            r#"<line x1="{x1:.1}" y1="{y1:.2}" x2="{x2:.1}" y2="{y2:.2}" stroke="{stroke}" stroke-width="0.8"/>"#
        );
        self
    }

    /// Text is escaped here; callers pass raw values.
    pub fn text(&mut self, x: f64, y: f64, style: Style, content: &str) -> &mut Self {
        let weight = if style.bold { "bold" } else { "normal" };
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.1}" y="{y:.2}" font-family="sans-serif" font-size="{}" font-weight="{weight}" text-anchor="{}" fill="{}">{}</text>"#,
            style.size,
            style.anchor.as_str(),
            style.fill,
            escape(content)
        );
        self
    }

    /// Company banner shared by every document.
    pub fn header(&mut self, company: &str, title: &str) -> &mut Self {
        self.rect(0.0, 0.0, A4_WIDTH, 110.0, INK);
        self.rect(0.0, 110.0, A4_WIDTH, 6.0, ACCENT);
        self.text(40.0, 62.0, Style::bold(21.1).fill("#fff"), company);
        self.text(A4_WIDTH - 40.0, 66.0, Style::bold(30.0).end().fill("#fff"), title)
    }

    /// Label/value pair stacked in the meta block.
    pub fn field(&mut self, x: f64, y: f64, label: &str, value: &str) -> &mut Self {
        self.text(x, y, Style::bold(9.0).fill(ACCENT), label);
        self.text(x, y + 15.0, Style::plain(11.1), value)
    }

    pub fn finish(self) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h:.1}" "#,
                r#"width="{w}pt" height="{h:.1}pt">"#,
                "\n{body}</svg>\n"
            ),
            w = A4_WIDTH,
            h = self.height,
            body = self.body
        )
    }
}
