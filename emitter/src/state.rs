/// A construct that stays open across lines and must be closed in LIFO order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    UnorderedList,
    OrderedList,
    Section,
    Table,
    TableRow,
}

impl BlockTag {
    pub fn close_tag(self) -> &'static str {
        match self {
            BlockTag::UnorderedList => "</ul>",
            BlockTag::OrderedList => "</ol>",
            BlockTag::Section => "</div>",
            BlockTag::Table => "</table>",
            BlockTag::TableRow => "</tr>",
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, BlockTag::UnorderedList | BlockTag::OrderedList)
    }
}

/// Page lifecycle: Unopened -> Open -> Closed. Closed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Unopened,
    Open,
    Closed,
}

/// Output buffer plus nesting state for one HTML emitter run.
#[derive(Debug)]
pub struct GenerationState {
    output_lines: Vec<String>,
    page: PageState,
    open_stack: Vec<BlockTag>,
}

impl GenerationState {
    pub fn new() -> Self {
        GenerationState {
            output_lines: Vec::new(),
            page: PageState::Unopened,
            open_stack: Vec::new(),
        }
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    /// True once the page has been opened, including after it was closed.
    pub fn page_open(&self) -> bool {
        self.page != PageState::Unopened
    }

    pub fn mark_open(&mut self) {
        self.page = PageState::Open;
    }

    /// Append a line indented to the current nesting depth.
    pub fn push_line(&mut self, line: impl AsRef<str>) {
        let indent = "  ".repeat(self.open_stack.len());
        self.output_lines.push(format!("{}{}", indent, line.as_ref()));
    }

    /// Append a line exactly as given.
    pub fn push_raw(&mut self, line: impl Into<String>) {
        self.output_lines.push(line.into());
    }

    /// Emit `open_line` and push `tag`; lines that follow are indented.
    pub fn open_block(&mut self, tag: BlockTag, open_line: impl AsRef<str>) {
        self.push_line(open_line);
        self.open_stack.push(tag);
    }

    /// Pop the innermost open block and emit its closing tag.
    pub fn close_block(&mut self) -> Option<BlockTag> {
        let tag = self.open_stack.pop()?;
        self.push_line(tag.close_tag());
        Some(tag)
    }

    pub fn top(&self) -> Option<BlockTag> {
        self.open_stack.last().copied()
    }

    /// Close every open block innermost first, then mark the page closed.
    pub fn close_page(&mut self, closing_lines: &[&str]) {
        while self.close_block().is_some() {}
        for line in closing_lines {
            self.push_raw(*line);
        }
        self.page = PageState::Closed;
    }

    pub fn into_output(self) -> String {
        self.output_lines.join("\n")
    }
}

impl Default for GenerationState {
    fn default() -> Self {
        Self::new()
    }
}
