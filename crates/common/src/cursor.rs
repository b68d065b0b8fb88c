//! Source-location metadata carried by every user-visible error (§7).

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub col: Option<u32>,
}

impl Cursor {
    pub fn none() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, self.line, self.col) {
            (Some(file), Some(line), Some(col)) => write!(f, "{file}:{line}:{col}"),
            (Some(file), None, None) => write!(f, "{file}"),
            _ => write!(f, "<unknown>"),
        }
    }
}
