use std::collections::HashMap;

use wahy::{ParsedCommand, Target};

use crate::driver::{Dispatch, Emitter, Warnings};
use crate::error::EmitError;

/// Emitted instead of an empty stylesheet.
pub const NO_RULES_SENTINEL: &str = "/* لا توجد قواعد CSS */";

type ValueTable = &'static [(&'static str, &'static str)];

#[derive(Debug, Clone, Copy)]
enum CssCommand {
    Select,
    SelectAll,
    /// `قاعدة property value`: any property, value passed through.
    Rule,
    Property {
        name: &'static str,
        default: &'static str,
        values: ValueTable,
    },
    /// Declaration with a fixed value (`فلكس` -> `display: flex`).
    Fixed {
        name: &'static str,
        value: &'static str,
    },
    FontFamily,
    BackgroundImage,
    StartMedia,
    EndMedia,
}

const NONE: ValueTable = &[];

const TEXT_ALIGN: ValueTable = &[
    ("يمين", "right"),
    ("يسار", "left"),
    ("وسط", "center"),
    ("ضبط", "justify"),
];

const TEXT_DECORATION: ValueTable = &[
    ("خط_تحت", "underline"),
    ("خط_فوق", "overline"),
    ("خط_وسط", "line-through"),
    ("بلا", "none"),
];

const DISPLAY: ValueTable = &[
    ("كتلة", "block"),
    ("سطري", "inline"),
    ("سطري_كتلة", "inline-block"),
    ("فلكس", "flex"),
    ("شبكة", "grid"),
    ("مخفي", "none"),
];

const POSITION: ValueTable = &[
    ("ثابت", "static"),
    ("نسبي", "relative"),
    ("مطلق", "absolute"),
    ("مثبت", "fixed"),
    ("لاصق", "sticky"),
];

const BORDER_STYLE: ValueTable = &[
    ("صلب", "solid"),
    ("منقط", "dotted"),
    ("متقطع", "dashed"),
    ("مزدوج", "double"),
    ("محفور", "groove"),
    ("مرتفع", "ridge"),
];

const FLEX_DIRECTION: ValueTable = &[
    ("صف", "row"),
    ("صف_عكسي", "row-reverse"),
    ("عمود", "column"),
    ("عمود_عكسي", "column-reverse"),
];

const JUSTIFY: ValueTable = &[
    ("بداية", "flex-start"),
    ("نهاية", "flex-end"),
    ("وسط", "center"),
    ("متباعد", "space-between"),
    ("متوزع", "space-around"),
    ("متوزع_بالتساوي", "space-evenly"),
];

const ALIGN_ITEMS: ValueTable = &[
    ("بداية", "flex-start"),
    ("نهاية", "flex-end"),
    ("وسط", "center"),
    ("امتداد", "stretch"),
    ("خط_أساسي", "baseline"),
];

const BACKGROUND_SIZE: ValueTable = &[("غطاء", "cover"), ("احتواء", "contain"), ("تلقائي", "auto")];

const BACKGROUND_REPEAT: ValueTable = &[
    ("تكرار", "repeat"),
    ("بلا_تكرار", "no-repeat"),
    ("تكرار_س", "repeat-x"),
    ("تكرار_ص", "repeat-y"),
];

const BACKGROUND_POSITION: ValueTable = &[
    ("أعلى_يمين", "top right"),
    ("أعلى_يسار", "top left"),
    ("أعلى_وسط", "top center"),
    ("أسفل_يمين", "bottom right"),
    ("أسفل_يسار", "bottom left"),
    ("أسفل_وسط", "bottom center"),
    ("وسط", "center"),
];

const CURSOR: ValueTable = &[
    ("مؤشر", "pointer"),
    ("نص", "text"),
    ("تحريك", "move"),
    ("انتظار", "wait"),
    ("مساعدة", "help"),
    ("ممنوع", "not-allowed"),
];

const OVERFLOW: ValueTable = &[
    ("مرئي", "visible"),
    ("مخفي", "hidden"),
    ("تمرير", "scroll"),
    ("تلقائي", "auto"),
];

const VISIBILITY: ValueTable = &[("مرئي", "visible"), ("مخفي", "hidden")];

const fn prop(name: &'static str, default: &'static str, values: ValueTable) -> CssCommand {
    CssCommand::Property {
        name,
        default,
        values,
    }
}

const COMMANDS: &[(&str, CssCommand)] = &[
    // Selection
    ("اختر", CssCommand::Select),
    ("حدد", CssCommand::Select),
    ("اختر_الكل", CssCommand::SelectAll),
    ("حدد_الكل", CssCommand::SelectAll),
    ("قاعدة", CssCommand::Rule),
    ("rule", CssCommand::Rule),
    // Colors
    ("لون", prop("color", "black", NONE)),
    ("لون_النص", prop("color", "black", NONE)),
    ("لون_الخلفية", prop("background-color", "white", NONE)),
    ("خلفية", prop("background-color", "white", NONE)),
    ("لون_الحدود", prop("border-color", "gray", NONE)),
    // Text
    ("الخط", CssCommand::FontFamily),
    ("نوع_الخط", CssCommand::FontFamily),
    ("حجم_الخط", prop("font-size", "16px", NONE)),
    ("وزن_الخط", prop("font-weight", "normal", NONE)),
    ("محاذاة_النص", prop("text-align", "right", TEXT_ALIGN)),
    ("تزيين_النص", prop("text-decoration", "none", TEXT_DECORATION)),
    // Layout
    ("العرض", prop("width", "auto", NONE)),
    ("width", prop("width", "auto", NONE)),
    ("الارتفاع", prop("height", "auto", NONE)),
    ("height", prop("height", "auto", NONE)),
    ("الهامش", prop("margin", "0", NONE)),
    ("margin", prop("margin", "0", NONE)),
    ("البطانة", prop("padding", "0", NONE)),
    ("padding", prop("padding", "0", NONE)),
    ("النوع", prop("display", "block", DISPLAY)),
    ("display", prop("display", "block", DISPLAY)),
    ("الموضع", prop("position", "static", POSITION)),
    ("position", prop("position", "static", POSITION)),
    // Borders
    ("الحدود", prop("border", "1px solid black", NONE)),
    ("border", prop("border", "1px solid black", NONE)),
    ("سماكة_الحدود", prop("border-width", "1px", NONE)),
    ("نوع_الحدود", prop("border-style", "solid", BORDER_STYLE)),
    ("استدارة_الحدود", prop("border-radius", "0", NONE)),
    // Flexbox
    ("فلكس", CssCommand::Fixed { name: "display", value: "flex" }),
    ("flexbox", CssCommand::Fixed { name: "display", value: "flex" }),
    ("اتجاه_الفلكس", prop("flex-direction", "row", FLEX_DIRECTION)),
    ("محاذاة_الفلكس", prop("justify-content", "flex-start", JUSTIFY)),
    ("محاذاة_العناصر", prop("align-items", "stretch", ALIGN_ITEMS)),
    // Grid
    ("الشبكة", CssCommand::Fixed { name: "display", value: "grid" }),
    ("grid", CssCommand::Fixed { name: "display", value: "grid" }),
    ("أعمدة_الشبكة", prop("grid-template-columns", "1fr", NONE)),
    ("صفوف_الشبكة", prop("grid-template-rows", "1fr", NONE)),
    ("فجوة_الشبكة", prop("gap", "10px", NONE)),
    // Effects
    ("الظل", prop("box-shadow", "0 2px 4px rgba(0,0,0,0.1)", NONE)),
    ("shadow", prop("box-shadow", "0 2px 4px rgba(0,0,0,0.1)", NONE)),
    ("الشفافية", prop("opacity", "1", NONE)),
    ("opacity", prop("opacity", "1", NONE)),
    ("التحويل", prop("transform", "none", NONE)),
    ("transform", prop("transform", "none", NONE)),
    ("الانتقال", prop("transition", "all 0.3s ease", NONE)),
    ("transition", prop("transition", "all 0.3s ease", NONE)),
    // Background
    ("صورة_الخلفية", CssCommand::BackgroundImage),
    ("حجم_الخلفية", prop("background-size", "auto", BACKGROUND_SIZE)),
    ("تكرار_الخلفية", prop("background-repeat", "repeat", BACKGROUND_REPEAT)),
    ("موضع_الخلفية", prop("background-position", "top left", BACKGROUND_POSITION)),
    // Media queries
    ("استعلام_الوسائط", CssCommand::StartMedia),
    ("media_query", CssCommand::StartMedia),
    ("أنهِ_الاستعلام", CssCommand::EndMedia),
    ("end_media", CssCommand::EndMedia),
    // Advanced
    ("المؤشر", prop("cursor", "default", CURSOR)),
    ("cursor", prop("cursor", "default", CURSOR)),
    ("الفيض", prop("overflow", "visible", OVERFLOW)),
    ("overflow", prop("overflow", "visible", OVERFLOW)),
    ("الرؤية", prop("visibility", "visible", VISIBILITY)),
    ("visibility", prop("visibility", "visible", VISIBILITY)),
    ("المؤشر_z", prop("z-index", "auto", NONE)),
    ("z_index", prop("z-index", "auto", NONE)),
];

/// True when `key` is in the CSS command table.
pub fn is_css_command(key: &str) -> bool {
    COMMANDS.iter().any(|(k, _)| *k == key)
}

fn translate(values: ValueTable, raw: &str) -> String {
    values
        .iter()
        .find(|(arabic, _)| *arabic == raw)
        .map(|(_, css)| css.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Translates style commands into a stylesheet.
///
/// Only a current-selector pointer is tracked: selecting a new element
/// closes the previous rule, and there is no explicit "end rule" command.
pub struct CssEmitter {
    lines: Vec<String>,
    commands: HashMap<&'static str, CssCommand>,
    current_selector: Option<String>,
    media_depth: usize,
    declarations: usize,
}

impl CssEmitter {
    pub fn new() -> Self {
        CssEmitter {
            lines: Vec::new(),
            commands: COMMANDS.iter().copied().collect(),
            current_selector: None,
            media_depth: 0,
            declarations: 0,
        }
    }

    fn push(&mut self, line: impl AsRef<str>) {
        let indent = "  ".repeat(self.media_depth);
        self.lines.push(format!("{}{}", indent, line.as_ref()));
    }

    fn close_selector(&mut self) {
        if self.current_selector.take().is_some() {
            self.push("}");
        }
    }

    pub fn select(&mut self, selector: &str) {
        self.close_selector();
        self.push(format!("{} {{", selector));
        self.current_selector = Some(selector.to_string());
    }

    pub fn add_rule(&mut self, property: &str, value: &str) {
        if self.current_selector.is_none() {
            self.select("body");
        }
        self.push(format!("  {}: {};", property, value));
        self.declarations += 1;
    }

    fn start_media(&mut self, query: &str) {
        self.close_selector();
        self.push(format!("@media {} {{", query));
        self.media_depth += 1;
    }

    fn end_media(&mut self) -> Result<(), EmitError> {
        if self.media_depth == 0 {
            return Err(EmitError::UnmatchedClose {
                construct: "media query",
            });
        }
        self.close_selector();
        self.media_depth -= 1;
        self.push("}");
        Ok(())
    }
}

impl Default for CssEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter for CssEmitter {
    fn target(&self) -> Target {
        Target::Css
    }

    fn execute(
        &mut self,
        command: &ParsedCommand,
        warnings: &mut Warnings<'_>,
    ) -> Result<Dispatch, EmitError> {
        let Some(&op) = self.commands.get(command.key.as_str()) else {
            return Ok(Dispatch::Unknown);
        };

        if command.args.iter().any(|a| a.text.contains("</")) {
            warnings.push("'</' would end the style block; line skipped");
            return Ok(Dispatch::Handled);
        }

        match op {
            CssCommand::Select => self.select(&command.joined_or(0, "body")),
            CssCommand::SelectAll => {
                let selector = command.joined_or(0, "*");
                if selector == "*" {
                    self.select("*");
                } else {
                    self.select(&format!("* {}", selector));
                }
            }
            CssCommand::Rule => {
                let property = command.arg_or(0, "").to_string();
                if property.is_empty() {
                    warnings.push("rule needs a property name");
                } else {
                    self.add_rule(&property, &command.joined(1));
                }
            }
            CssCommand::Property {
                name,
                default,
                values,
            } => {
                let raw = command.joined_or(0, default);
                self.add_rule(name, &translate(values, &raw));
            }
            CssCommand::Fixed { name, value } => self.add_rule(name, value),
            CssCommand::FontFamily => {
                let font = command.joined_or(0, "Arial");
                self.add_rule("font-family", &format!("'{}', sans-serif", font));
            }
            CssCommand::BackgroundImage => {
                let image = command.joined_or(0, "none");
                if image == "none" {
                    self.add_rule("background-image", "none");
                } else {
                    self.add_rule("background-image", &format!("url({})", image));
                }
            }
            CssCommand::StartMedia => self.start_media(&command.joined_or(0, "screen")),
            CssCommand::EndMedia => self.end_media()?,
        }

        Ok(Dispatch::Handled)
    }

    fn finish(&mut self, warnings: &mut Warnings<'_>) -> String {
        self.close_selector();
        if self.media_depth > 0 {
            warnings.push(format!(
                "{} media query block(s) left open at end of input; closing",
                self.media_depth
            ));
            while self.media_depth > 0 {
                self.media_depth -= 1;
                self.push("}");
            }
        }

        if self.declarations == 0 {
            return NO_RULES_SENTINEL.to_string();
        }
        self.lines.join("\n")
    }
}
