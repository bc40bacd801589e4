use std::collections::HashMap;

use wahy::{Arg, ParsedCommand, Target};

use crate::driver::{Dispatch, Emitter, Warnings};
use crate::error::EmitError;

/// Emitted instead of an empty script.
pub const NO_CODE_SENTINEL: &str = "// لا يوجد كود JavaScript";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsCommand {
    Declare,
    Assign,
    Function,
    Call,
    Return,
    Print,
    Alert,
    Prompt,
    If,
    ElseIf,
    Else,
    ForRange,
    While,
    ForEach,
    /// Closers only decrement depth; the opener's kind is not checked.
    EndBlock(&'static str),
    Break,
    Continue,
    OnEvent(&'static str),
    OnLoad,
    GetElement,
    QueryAll,
    SetHtml,
    SetValue,
    SetStyle,
    AddClass,
    RemoveClass,
    Math(&'static str),
    Array,
    Push,
    Pop,
    Length,
    Object,
    Property,
    Stringify,
    Parse,
    Now,
    Timeout,
    Interval,
    Comment,
    Raw,
}

const COMMANDS: &[(&str, JsCommand)] = &[
    // Variables
    ("متغير", JsCommand::Declare),
    ("أنشئ_متغير", JsCommand::Declare),
    ("اعط", JsCommand::Assign),
    ("اجعل", JsCommand::Assign),
    // Functions
    ("دالة", JsCommand::Function),
    ("أنشئ_دالة", JsCommand::Function),
    ("أنهِ_دالة", JsCommand::EndBlock("function")),
    ("انتهاء_دالة", JsCommand::EndBlock("function")),
    ("أنهِ دالة", JsCommand::EndBlock("function")),
    ("استدعي", JsCommand::Call),
    ("نادِ", JsCommand::Call),
    ("ارجع", JsCommand::Return),
    ("أرجع", JsCommand::Return),
    // Output
    ("اطبع", JsCommand::Print),
    ("أظهر", JsCommand::Print),
    ("أظهر_رسالة", JsCommand::Alert),
    ("رسالة", JsCommand::Alert),
    ("اسأل", JsCommand::Prompt),
    ("استفسر", JsCommand::Prompt),
    // Conditionals
    ("إذا", JsCommand::If),
    ("وإلا_إذا", JsCommand::ElseIf),
    ("else_if", JsCommand::ElseIf),
    ("وإلا", JsCommand::Else),
    ("else", JsCommand::Else),
    ("أنهِ_إذا", JsCommand::EndBlock("if")),
    ("انتهاء_إذا", JsCommand::EndBlock("if")),
    ("أنهِ إذا", JsCommand::EndBlock("if")),
    // Loops
    ("كرر", JsCommand::ForRange),
    ("حلقة", JsCommand::ForRange),
    ("طالما", JsCommand::While),
    ("while", JsCommand::While),
    ("لكل", JsCommand::ForEach),
    ("for_each", JsCommand::ForEach),
    ("أنهِ_حلقة", JsCommand::EndBlock("loop")),
    ("انتهاء_حلقة", JsCommand::EndBlock("loop")),
    ("أنهِ حلقة", JsCommand::EndBlock("loop")),
    ("اكسر", JsCommand::Break),
    ("توقف", JsCommand::Break),
    ("تابع", JsCommand::Continue),
    ("استمر", JsCommand::Continue),
    // DOM events
    ("عند_الضغط", JsCommand::OnEvent("onclick")),
    ("onclick", JsCommand::OnEvent("onclick")),
    ("عند_التغيير", JsCommand::OnEvent("onchange")),
    ("onchange", JsCommand::OnEvent("onchange")),
    ("عند_الإدخال", JsCommand::OnEvent("oninput")),
    ("oninput", JsCommand::OnEvent("oninput")),
    ("عند_التحميل", JsCommand::OnLoad),
    ("onload", JsCommand::OnLoad),
    // DOM operations
    ("اختر_عنصر", JsCommand::GetElement),
    ("getElementById", JsCommand::GetElement),
    ("اختر_عناصر", JsCommand::QueryAll),
    ("querySelectorAll", JsCommand::QueryAll),
    ("غيّر_نص", JsCommand::SetHtml),
    ("innerHTML", JsCommand::SetHtml),
    ("غيّر_قيمة", JsCommand::SetValue),
    ("value", JsCommand::SetValue),
    ("غيّر_نمط", JsCommand::SetStyle),
    ("style", JsCommand::SetStyle),
    ("أضف_فئة", JsCommand::AddClass),
    ("addClass", JsCommand::AddClass),
    ("احذف_فئة", JsCommand::RemoveClass),
    ("removeClass", JsCommand::RemoveClass),
    // Arithmetic
    ("اجمع", JsCommand::Math("+")),
    ("plus", JsCommand::Math("+")),
    ("اطرح", JsCommand::Math("-")),
    ("minus", JsCommand::Math("-")),
    ("اضرب", JsCommand::Math("*")),
    ("multiply", JsCommand::Math("*")),
    ("اقسم", JsCommand::Math("/")),
    ("divide", JsCommand::Math("/")),
    // Arrays
    ("مصفوفة", JsCommand::Array),
    ("array", JsCommand::Array),
    ("أضف_للمصفوفة", JsCommand::Push),
    ("push", JsCommand::Push),
    ("احذف_من_المصفوفة", JsCommand::Pop),
    ("pop", JsCommand::Pop),
    ("طول_المصفوفة", JsCommand::Length),
    ("length", JsCommand::Length),
    // Objects and JSON
    ("كائن", JsCommand::Object),
    ("object", JsCommand::Object),
    ("خاصية", JsCommand::Property),
    ("property", JsCommand::Property),
    ("تحويل_لنص", JsCommand::Stringify),
    ("stringify", JsCommand::Stringify),
    ("تحليل_النص", JsCommand::Parse),
    ("parse", JsCommand::Parse),
    // Time
    ("الوقت_الحالي", JsCommand::Now),
    ("now", JsCommand::Now),
    ("انتظر", JsCommand::Timeout),
    ("setTimeout", JsCommand::Timeout),
    ("تكرار_دوري", JsCommand::Interval),
    ("setInterval", JsCommand::Interval),
    // Pass-through
    ("تعليق", JsCommand::Comment),
    ("comment", JsCommand::Comment),
    ("كود_خام", JsCommand::Raw),
    ("raw_code", JsCommand::Raw),
];

/// Arabic condition operators and their JavaScript spelling. Substitution
/// is purely textual on whole words: operators glued to other characters,
/// other than parentheses, are left alone, and no precedence is inferred.
pub const CONDITION_OPERATORS: &[(&str, &str)] = &[
    ("يساوي", "=="),
    ("لا_يساوي", "!="),
    ("أكبر_من", ">"),
    ("أصغر_من", "<"),
    ("أكبر_أو_يساوي", ">="),
    ("أصغر_أو_يساوي", "<="),
    ("و", "&&"),
    ("أو", "||"),
    ("ليس", "!"),
];

/// True when `key` is in the JavaScript command table.
pub fn is_js_command(key: &str) -> bool {
    COMMANDS.iter().any(|(k, _)| *k == key)
}

/// Replace whole-word Arabic operators in `condition`.
pub fn substitute_operators(condition: &str) -> String {
    let mut out = String::with_capacity(condition.len());
    let mut word = String::new();

    for c in condition.chars() {
        if c.is_whitespace() || c == '(' || c == ')' {
            push_operator_word(&mut out, &mut word);
            out.push(c);
        } else {
            word.push(c);
        }
    }
    push_operator_word(&mut out, &mut word);

    out
}

fn push_operator_word(out: &mut String, word: &mut String) {
    if word.is_empty() {
        return;
    }
    match CONDITION_OPERATORS.iter().find(|(arabic, _)| *arabic == word.as_str()) {
        Some((_, js)) => out.push_str(js),
        None => out.push_str(word),
    }
    word.clear();
}

/// Render an argument as a JavaScript expression.
///
/// Quoted arguments become string literals. Bare tokens that are already
/// quoted, numeric, or a boolean/null keyword pass through; anything else
/// is taken as a variable reference, never auto-quoted.
pub fn coerce_value(arg: &Arg) -> String {
    if arg.quoted {
        return string_literal(&arg.text);
    }

    let text = arg.text.as_str();
    let already_quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if already_quoted || text.parse::<f64>().is_ok() {
        return text.to_string();
    }

    match text {
        "صحيح" | "true" => "true".to_string(),
        "خطأ" | "false" => "false".to_string(),
        "فارغ" | "null" => "null".to_string(),
        "غير_محدد" | "undefined" => "undefined".to_string(),
        _ => text.to_string(),
    }
}

/// A double-quoted JavaScript string. `</` is written as `<\/` so the
/// literal cannot end the surrounding `<script>` element.
fn string_literal(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace("</", "<\\/")
}

/// Quote `text` for use inside a single-quoted JavaScript string.
fn single_quoted(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Translates scripting commands into JavaScript.
///
/// Nesting is tracked by depth alone. A closer such as `أنهِ_حلقة` will
/// happily close a function; only closing at depth zero is an error.
pub struct JsEmitter {
    lines: Vec<String>,
    commands: HashMap<&'static str, JsCommand>,
    depth: usize,
}

impl JsEmitter {
    pub fn new() -> Self {
        JsEmitter {
            lines: Vec::new(),
            commands: COMMANDS.iter().copied().collect(),
            depth: 0,
        }
    }

    fn line(&mut self, code: impl AsRef<str>) {
        let indent = "  ".repeat(self.depth);
        self.lines.push(format!("{}{}", indent, code.as_ref()));
    }

    fn open(&mut self, code: impl AsRef<str>) {
        self.line(code);
        self.depth += 1;
    }

    fn close(&mut self, construct: &'static str) -> Result<(), EmitError> {
        if self.depth == 0 {
            return Err(EmitError::UnmatchedClose { construct });
        }
        self.depth -= 1;
        self.line("}");
        Ok(())
    }

    /// `} else ... {` at the enclosing depth.
    fn reopen(&mut self, code: impl AsRef<str>) -> Result<(), EmitError> {
        if self.depth == 0 {
            return Err(EmitError::UnmatchedClose { construct: "if" });
        }
        self.depth -= 1;
        self.open(code);
        Ok(())
    }

    /// A callback body wrapped in `head` ... `tail`.
    fn callback(&mut self, head: String, action: &str, tail: &str) {
        self.open(head);
        self.line(statement(action));
        self.depth -= 1;
        self.line(tail);
    }

    /// `let var = expr;` when a target variable is named, else `expr;`.
    fn bind(&mut self, variable: Option<&str>, expr: String) {
        match variable.filter(|v| !v.is_empty()) {
            Some(name) => self.line(format!("let {} = {};", name, expr)),
            None => self.line(format!("{};", expr)),
        }
    }
}

impl Default for JsEmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn statement(action: &str) -> String {
    let action = action.trim_end();
    if action.ends_with(';') || action.ends_with('}') {
        action.to_string()
    } else {
        format!("{};", action)
    }
}

/// Code written after argument `from`. A lone quoted argument is taken as
/// the code itself; anything else is copied from the source as written.
fn code_from(command: &ParsedCommand, from: usize) -> String {
    match command.args.get(from..) {
        Some([only]) if only.quoted => only.text.clone(),
        _ => command.raw_from(from).to_string(),
    }
}

fn value_at(command: &ParsedCommand, index: usize) -> String {
    command.args.get(index).map(coerce_value).unwrap_or_default()
}

fn values_from(command: &ParsedCommand, from: usize) -> String {
    command
        .args
        .iter()
        .skip(from)
        .map(coerce_value)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a condition from the arguments starting at `from`. A single quoted
/// argument is the whole condition; otherwise quoted arguments are string
/// operands and bare ones are coerced, then operator-substituted.
fn condition(command: &ParsedCommand, from: usize) -> String {
    let args = command.args.get(from..).unwrap_or(&[]);
    if let [only] = args {
        if only.quoted {
            return substitute_operators(&only.text);
        }
    }
    args.iter()
        .map(|a| {
            if a.quoted {
                string_literal(&a.text)
            } else {
                substitute_operators(&coerce_value(a))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Emitter for JsEmitter {
    fn target(&self) -> Target {
        Target::JavaScript
    }

    fn execute(
        &mut self,
        command: &ParsedCommand,
        _warnings: &mut Warnings<'_>,
    ) -> Result<Dispatch, EmitError> {
        let Some(&op) = self.commands.get(command.key.as_str()) else {
            return Ok(Dispatch::Unknown);
        };

        let arg = |index: usize| command.arg_or(index, "");

        match op {
            JsCommand::Declare => {
                if command.args.len() > 1 {
                    self.line(format!("let {} = {};", arg(0), value_at(command, 1)));
                } else {
                    self.line(format!("let {};", arg(0)));
                }
            }
            JsCommand::Assign => {
                self.line(format!("{} = {};", arg(0), value_at(command, 1)));
            }
            JsCommand::Function => {
                let params = command
                    .args
                    .iter()
                    .skip(1)
                    .map(|a| a.text.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                self.open(format!("function {}({}) {{", arg(0), params));
            }
            JsCommand::Call => {
                self.line(format!("{}({});", arg(0), values_from(command, 1)));
            }
            JsCommand::Return => {
                if command.args.is_empty() {
                    self.line("return;");
                } else {
                    self.line(format!("return {};", value_at(command, 0)));
                }
            }
            JsCommand::Print => self.line(format!("console.log({});", values_from(command, 0))),
            JsCommand::Alert => self.line(format!("alert({});", value_at(command, 0))),
            JsCommand::Prompt => {
                let expr = format!("prompt({})", value_at(command, 0));
                self.bind(command.arg(1), expr);
            }
            JsCommand::If => self.open(format!("if ({}) {{", condition(command, 0))),
            JsCommand::ElseIf => {
                self.reopen(format!("}} else if ({}) {{", condition(command, 0)))?
            }
            JsCommand::Else if command.arg(0) == Some("إذا") => {
                self.reopen(format!("}} else if ({}) {{", condition(command, 1)))?
            }
            JsCommand::Else => self.reopen("} else {")?,
            JsCommand::ForRange => {
                let variable = command.arg_or(0, "i");
                self.open(format!(
                    "for (let {0} = {1}; {0} <= {2}; {0}++) {{",
                    variable,
                    value_at(command, 1),
                    value_at(command, 2)
                ));
            }
            JsCommand::While => self.open(format!("while ({}) {{", condition(command, 0))),
            JsCommand::ForEach => {
                self.open(format!("for (let {} of {}) {{", arg(0), arg(1)));
            }
            JsCommand::EndBlock(construct) => self.close(construct)?,
            JsCommand::Break => self.line("break;"),
            JsCommand::Continue => self.line("continue;"),
            JsCommand::OnEvent(event) => {
                let head = format!(
                    "document.getElementById({}).{} = function() {{",
                    single_quoted(arg(0)),
                    event
                );
                self.callback(head, &code_from(command, 1), "};");
            }
            JsCommand::OnLoad => {
                self.callback(
                    "window.onload = function() {".to_string(),
                    &code_from(command, 0),
                    "};",
                );
            }
            JsCommand::GetElement => {
                let expr = format!("document.getElementById({})", single_quoted(arg(0)));
                self.bind(command.arg(1), expr);
            }
            JsCommand::QueryAll => {
                let expr = format!("document.querySelectorAll({})", single_quoted(arg(0)));
                self.bind(command.arg(1), expr);
            }
            JsCommand::SetHtml => self.line(format!(
                "document.getElementById({}).innerHTML = {};",
                single_quoted(arg(0)),
                value_at(command, 1)
            )),
            JsCommand::SetValue => self.line(format!(
                "document.getElementById({}).value = {};",
                single_quoted(arg(0)),
                value_at(command, 1)
            )),
            JsCommand::SetStyle => self.line(format!(
                "document.getElementById({}).style.{} = {};",
                single_quoted(arg(0)),
                arg(1),
                value_at(command, 2)
            )),
            JsCommand::AddClass => self.line(format!(
                "document.getElementById({}).classList.add({});",
                single_quoted(arg(0)),
                single_quoted(arg(1))
            )),
            JsCommand::RemoveClass => self.line(format!(
                "document.getElementById({}).classList.remove({});",
                single_quoted(arg(0)),
                single_quoted(arg(1))
            )),
            JsCommand::Math(operator) => self.line(format!(
                "let {} = {} {} {};",
                arg(0),
                value_at(command, 1),
                operator,
                value_at(command, 2)
            )),
            JsCommand::Array => {
                self.line(format!("let {} = [{}];", arg(0), values_from(command, 1)));
            }
            JsCommand::Push => {
                self.line(format!("{}.push({});", arg(0), value_at(command, 1)));
            }
            JsCommand::Pop => self.line(format!("{}.pop();", arg(0))),
            JsCommand::Length => {
                let expr = format!("{}.length", arg(0));
                self.bind(command.arg(1), expr);
            }
            JsCommand::Object => self.line(format!("let {} = {{}};", arg(0))),
            JsCommand::Property => self.line(format!(
                "{}.{} = {};",
                arg(0),
                arg(1),
                value_at(command, 2)
            )),
            JsCommand::Stringify => {
                let expr = format!("JSON.stringify({})", arg(0));
                self.bind(command.arg(1), expr);
            }
            JsCommand::Parse => {
                let expr = format!("JSON.parse({})", value_at(command, 0));
                self.bind(command.arg(1), expr);
            }
            JsCommand::Now => self.bind(command.arg(0), "new Date()".to_string()),
            JsCommand::Timeout => {
                let delay = command.arg_or(1, "1000").to_string();
                self.callback(
                    "setTimeout(function() {".to_string(),
                    arg(0),
                    &format!("}}, {});", delay),
                );
            }
            JsCommand::Interval => {
                let interval = command.arg_or(1, "1000").to_string();
                self.callback(
                    "setInterval(function() {".to_string(),
                    arg(0),
                    &format!("}}, {});", interval),
                );
            }
            JsCommand::Comment => self.line(format!("// {}", command.raw_from(0))),
            JsCommand::Raw => self.line(code_from(command, 0)),
        }

        Ok(Dispatch::Handled)
    }

    fn finish(&mut self, warnings: &mut Warnings<'_>) -> String {
        if self.depth > 0 {
            warnings.push(format!(
                "{} block(s) left open at end of input; closing",
                self.depth
            ));
            while self.depth > 0 {
                self.depth -= 1;
                self.line("}");
            }
        }

        if self.lines.is_empty() {
            return NO_CODE_SENTINEL.to_string();
        }
        self.lines.join("\n")
    }
}
