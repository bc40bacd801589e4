use std::collections::HashMap;

use wahy::{ParsedCommand, Target, escape_html};

use crate::config::{InterpreterConfig, StylesheetMode};
use crate::driver::{Dispatch, Emitter, Warnings};
use crate::error::EmitError;
use crate::state::{BlockTag, GenerationState, PageState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlCommand {
    OpenPage,
    ClosePage,
    Heading(u8),
    Paragraph,
    Link,
    Image,
    Button,
    Text,
    BackgroundColor,
    TextColor,
    Font,
    StartList { ordered: bool },
    ListItem,
    EndList,
    StartSection,
    EndSection,
    HorizontalRule,
    Space,
    TextInput,
    PasswordInput,
    Checkbox,
    StartTable,
    TableRow,
    TableCell,
    EndTable,
}

const COMMANDS: &[(&str, HtmlCommand)] = &[
    // Page
    ("افتح صفحة", HtmlCommand::OpenPage),
    ("أنشئ صفحة", HtmlCommand::OpenPage),
    ("ابدأ صفحة", HtmlCommand::OpenPage),
    ("أغلق صفحة", HtmlCommand::ClosePage),
    ("أنهِ صفحة", HtmlCommand::ClosePage),
    // Content
    ("أضف عنوان", HtmlCommand::Heading(1)),
    ("عنوان", HtmlCommand::Heading(1)),
    ("أضف عنوان_فرعي", HtmlCommand::Heading(2)),
    ("أضف فقرة", HtmlCommand::Paragraph),
    ("فقرة", HtmlCommand::Paragraph),
    ("أضف رابط", HtmlCommand::Link),
    ("رابط", HtmlCommand::Link),
    ("أضف صورة", HtmlCommand::Image),
    ("صورة", HtmlCommand::Image),
    ("أضف زر", HtmlCommand::Button),
    ("أنشئ زر", HtmlCommand::Button),
    ("زر", HtmlCommand::Button),
    ("أضف نص", HtmlCommand::Text),
    ("نص", HtmlCommand::Text),
    // Style overrides
    ("غيّر لون_الخلفية إلى", HtmlCommand::BackgroundColor),
    ("غيّر لون_النص إلى", HtmlCommand::TextColor),
    ("غيّر الخط إلى", HtmlCommand::Font),
    // Lists
    ("ابدأ قائمة", HtmlCommand::StartList { ordered: false }),
    ("أنشئ قائمة", HtmlCommand::StartList { ordered: false }),
    ("ابدأ قائمة_مرقمة", HtmlCommand::StartList { ordered: true }),
    ("أنشئ قائمة_مرقمة", HtmlCommand::StartList { ordered: true }),
    ("أضف عنصر", HtmlCommand::ListItem),
    ("عنصر", HtmlCommand::ListItem),
    ("أنهِ قائمة", HtmlCommand::EndList),
    ("أغلق قائمة", HtmlCommand::EndList),
    ("أنهِ قائمة_مرقمة", HtmlCommand::EndList),
    // Layout
    ("ابدأ قسم", HtmlCommand::StartSection),
    ("أنشئ قسم", HtmlCommand::StartSection),
    ("أنهِ قسم", HtmlCommand::EndSection),
    ("أغلق قسم", HtmlCommand::EndSection),
    ("أضف خط_فاصل", HtmlCommand::HorizontalRule),
    ("أضف مسافة", HtmlCommand::Space),
    // Forms
    ("أضف مدخل_نص", HtmlCommand::TextInput),
    ("أضف مدخل_كلمة_سر", HtmlCommand::PasswordInput),
    ("أضف مربع_اختيار", HtmlCommand::Checkbox),
    // Tables
    ("ابدأ جدول", HtmlCommand::StartTable),
    ("أنشئ جدول", HtmlCommand::StartTable),
    ("أضف صف", HtmlCommand::TableRow),
    ("صف", HtmlCommand::TableRow),
    ("أضف خانة", HtmlCommand::TableCell),
    ("خانة", HtmlCommand::TableCell),
    ("أنهِ جدول", HtmlCommand::EndTable),
];

const BASE_STYLESHEET: &[&str] = &[
    "body { font-family: 'Arial', sans-serif; margin: 20px; background-color: white; color: black; }",
    "p { line-height: 1.6; margin: 10px 0; }",
    "img { max-width: 100%; height: auto; }",
    ".wahy-section { margin: 10px 0; }",
    ".wahy-button { padding: 10px 20px; margin: 5px; background-color: #007bff; color: white; border: none; border-radius: 5px; cursor: pointer; }",
    ".wahy-input { padding: 8px; margin: 5px; border: 1px solid #ccc; border-radius: 3px; }",
    "table { border-collapse: collapse; width: 100%; margin: 10px 0; }",
    "th, td { border: 1px solid #ddd; padding: 8px; text-align: right; }",
];

/// True when `key` is in the HTML command table.
pub fn is_html_command(key: &str) -> bool {
    COMMANDS.iter().any(|(k, _)| *k == key)
}

/// Translates page-building commands into an HTML document.
pub struct HtmlEmitter {
    state: GenerationState,
    commands: HashMap<&'static str, HtmlCommand>,
    stylesheet: StylesheetMode,
    stylesheet_href: String,
    default_title: String,
    checkboxes: usize,
}

impl HtmlEmitter {
    pub fn new(config: &InterpreterConfig) -> Self {
        HtmlEmitter {
            state: GenerationState::new(),
            commands: COMMANDS.iter().copied().collect(),
            stylesheet: config.stylesheet,
            stylesheet_href: config.stylesheet_href.clone(),
            default_title: config.default_title.clone(),
            checkboxes: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Page lifecycle
    // -----------------------------------------------------------------------

    fn open_page(&mut self, title: &str, warnings: &mut Warnings<'_>) {
        if self.state.page_open() {
            warnings.push("page is already open");
            return;
        }

        self.state.push_raw("<!DOCTYPE html>");
        self.state.push_raw("<html dir=\"rtl\" lang=\"ar\">");
        self.state.push_raw("<head>");
        self.state.push_raw("  <meta charset=\"UTF-8\">");
        self.state.push_raw(
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">",
        );
        self.state
            .push_raw(format!("  <title>{}</title>", escape_html(title)));
        match self.stylesheet {
            StylesheetMode::Inline => {
                self.state.push_raw("  <style id=\"wahy-base\">");
                for rule in BASE_STYLESHEET {
                    self.state.push_raw(format!("    {}", rule));
                }
                self.state.push_raw("  </style>");
            }
            StylesheetMode::External => {
                self.state.push_raw(format!(
                    "  <link rel=\"stylesheet\" href=\"{}\">",
                    escape_html(&self.stylesheet_href)
                ));
            }
        }
        self.state.push_raw("</head>");
        self.state.push_raw("<body>");
        self.state.mark_open();
    }

    fn close_page(&mut self, warnings: &mut Warnings<'_>) {
        match self.state.page_state() {
            PageState::Unopened => warnings.push("no page is open to close"),
            PageState::Closed => warnings.push("page is already closed"),
            PageState::Open => self.state.close_page(&["</body>", "</html>"]),
        }
    }

    /// Content may only be added to an open page. An unopened page is
    /// opened with the default title so partial scripts still preview.
    fn ensure_page(&mut self, command: &str, warnings: &mut Warnings<'_>) -> Result<(), EmitError> {
        match self.state.page_state() {
            PageState::Open => Ok(()),
            PageState::Unopened => {
                let title = self.default_title.clone();
                self.open_page(&title, warnings);
                Ok(())
            }
            PageState::Closed => Err(EmitError::ContentAfterClose {
                command: command.to_string(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    fn heading(&mut self, level: u8, text: &str) {
        let level = level.clamp(1, 6);
        self.state
            .push_line(format!("<h{0}>{1}</h{0}>", level, escape_html(text)));
    }

    fn link(&mut self, text: &str, url: &str) {
        let text = if text.is_empty() { url } else { text };
        self.state.push_line(format!(
            "<a href=\"{}\" target=\"_blank\">{}</a>",
            escape_html(url),
            escape_html(text)
        ));
    }

    fn image(&mut self, url: &str, alt: &str) {
        self.state.push_line(format!(
            "<img src=\"{}\" alt=\"{}\">",
            escape_html(url),
            escape_html(alt)
        ));
    }

    fn button(&mut self, text: &str, onclick: Option<&str>) {
        let onclick = match onclick {
            Some(action) if !action.is_empty() => format!(" onclick=\"{}\"", escape_html(action)),
            _ => String::new(),
        };
        self.state.push_line(format!(
            "<button class=\"wahy-button\"{}>{}</button>",
            onclick,
            escape_html(text)
        ));
    }

    /// Each override is its own block; later blocks win by cascade order.
    /// Values are raw CSS, so a `<` that could end the block is refused.
    fn style_override(&mut self, declaration: String, warnings: &mut Warnings<'_>) {
        if declaration.contains('<') {
            warnings.push("style value may not contain '<'; override skipped");
            return;
        }
        self.state
            .push_line(format!("<style>body {{ {} }}</style>", declaration));
    }

    fn input(&mut self, kind: &str, name: &str, placeholder: Option<&str>) {
        let placeholder = match placeholder {
            Some(text) if !text.is_empty() => format!(" placeholder=\"{}\"", escape_html(text)),
            _ => String::new(),
        };
        self.state.push_line(format!(
            "<input type=\"{}\" name=\"{}\" class=\"wahy-input\"{}>",
            kind,
            escape_html(name),
            placeholder
        ));
    }

    fn checkbox(&mut self, name: &str, label: Option<&str>) {
        self.checkboxes += 1;
        let id = format!("wahy-checkbox-{}", self.checkboxes);
        self.state.push_line(format!(
            "<input type=\"checkbox\" id=\"{}\" name=\"{}\">",
            id,
            escape_html(name)
        ));
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            self.state
                .push_line(format!("<label for=\"{}\">{}</label>", id, escape_html(label)));
        }
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    fn start_list(&mut self, ordered: bool) {
        if ordered {
            self.state.open_block(BlockTag::OrderedList, "<ol>");
        } else {
            self.state.open_block(BlockTag::UnorderedList, "<ul>");
        }
    }

    fn list_item(&mut self, text: &str, warnings: &mut Warnings<'_>) {
        if self.state.top().is_some_and(BlockTag::is_list) {
            self.state.push_line(format!("<li>{}</li>", escape_html(text)));
        } else {
            warnings.push("list item outside of a list; start a list first");
        }
    }

    /// Closing is positional: the innermost open block is closed whatever
    /// its kind.
    fn end_block(&mut self, construct: &'static str) -> Result<(), EmitError> {
        self.state
            .close_block()
            .map(|_| ())
            .ok_or(EmitError::UnmatchedClose { construct })
    }

    fn start_section(&mut self, class: Option<&str>) {
        let open = match class {
            Some(class) if !class.is_empty() => {
                format!("<div class=\"wahy-section {}\">", escape_html(class))
            }
            _ => "<div class=\"wahy-section\">".to_string(),
        };
        self.state.open_block(BlockTag::Section, open);
    }

    fn table_row(&mut self, warnings: &mut Warnings<'_>) {
        if self.state.top() == Some(BlockTag::TableRow) {
            self.state.close_block();
        }
        if self.state.top() == Some(BlockTag::Table) {
            self.state.open_block(BlockTag::TableRow, "<tr>");
        } else {
            warnings.push("table row outside of a table; start a table first");
        }
    }

    fn table_cell(&mut self, text: &str, warnings: &mut Warnings<'_>) {
        if self.state.top() == Some(BlockTag::Table) {
            self.state.open_block(BlockTag::TableRow, "<tr>");
        }
        if self.state.top() == Some(BlockTag::TableRow) {
            self.state.push_line(format!("<td>{}</td>", escape_html(text)));
        } else {
            warnings.push("table cell outside of a table; start a table first");
        }
    }

    fn end_table(&mut self) -> Result<(), EmitError> {
        while self.state.top() == Some(BlockTag::TableRow) {
            self.state.close_block();
        }
        self.end_block("table")
    }
}

impl Emitter for HtmlEmitter {
    fn target(&self) -> Target {
        Target::Html
    }

    fn execute(
        &mut self,
        command: &ParsedCommand,
        warnings: &mut Warnings<'_>,
    ) -> Result<Dispatch, EmitError> {
        let Some(&op) = self.commands.get(command.key.as_str()) else {
            return Ok(Dispatch::Unknown);
        };

        match op {
            HtmlCommand::OpenPage => {
                let title = command.arg_or(0, &self.default_title).to_string();
                self.open_page(&title, warnings);
            }
            HtmlCommand::ClosePage => self.close_page(warnings),
            HtmlCommand::EndList => self.end_block("list")?,
            HtmlCommand::EndSection => self.end_block("section")?,
            HtmlCommand::EndTable => self.end_table()?,
            content => {
                self.ensure_page(&command.key, warnings)?;
                self.content(content, command, warnings);
            }
        }

        Ok(Dispatch::Handled)
    }

    fn finish(&mut self, _warnings: &mut Warnings<'_>) -> String {
        if self.state.page_state() == PageState::Open {
            self.state.close_page(&["</body>", "</html>"]);
        }
        std::mem::take(&mut self.state).into_output()
    }
}

impl HtmlEmitter {
    fn content(&mut self, op: HtmlCommand, command: &ParsedCommand, warnings: &mut Warnings<'_>) {
        match op {
            HtmlCommand::Heading(level) => self.heading(level, command.arg_or(0, "")),
            HtmlCommand::Paragraph => {
                let text = escape_html(command.arg_or(0, ""));
                self.state.push_line(format!("<p>{}</p>", text));
            }
            HtmlCommand::Link => self.link(command.arg_or(0, ""), command.arg_or(1, "#")),
            HtmlCommand::Image => self.image(command.arg_or(0, ""), command.arg_or(1, "صورة")),
            HtmlCommand::Button => self.button(command.arg_or(0, "زر"), command.arg(1)),
            HtmlCommand::Text => {
                let text = escape_html(command.arg_or(0, ""));
                self.state.push_line(format!("<span>{}</span>", text));
            }
            HtmlCommand::BackgroundColor => {
                let color = command.arg_or(0, "white");
                self.style_override(format!("background-color: {};", color), warnings);
            }
            HtmlCommand::TextColor => {
                let color = command.arg_or(0, "black");
                self.style_override(format!("color: {};", color), warnings);
            }
            HtmlCommand::Font => {
                let font = command
                    .arg_or(0, "Arial")
                    .replace('\\', "\\\\")
                    .replace('\'', "\\'");
                self.style_override(format!("font-family: '{}', sans-serif;", font), warnings);
            }
            HtmlCommand::StartList { ordered } => self.start_list(ordered),
            HtmlCommand::ListItem => self.list_item(command.arg_or(0, ""), warnings),
            HtmlCommand::StartSection => self.start_section(command.arg(0)),
            HtmlCommand::HorizontalRule => self.state.push_line("<hr>"),
            HtmlCommand::Space => self.state.push_line("<br>"),
            HtmlCommand::TextInput => self.input("text", command.arg_or(0, ""), command.arg(1)),
            HtmlCommand::PasswordInput => {
                self.input("password", command.arg_or(0, ""), command.arg(1))
            }
            HtmlCommand::Checkbox => self.checkbox(command.arg_or(0, ""), command.arg(1)),
            HtmlCommand::StartTable => self.state.open_block(BlockTag::Table, "<table>"),
            HtmlCommand::TableRow => self.table_row(warnings),
            HtmlCommand::TableCell => self.table_cell(command.arg_or(0, ""), warnings),
            HtmlCommand::OpenPage
            | HtmlCommand::ClosePage
            | HtmlCommand::EndList
            | HtmlCommand::EndSection
            | HtmlCommand::EndTable => {}
        }
    }
}
