use std::fmt;

/// A single line of a `config.ini` file.
///
/// A whole file is an ordered `Vec<IniElement>`; the order is kept verbatim
/// across a deserialize/serialize cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniElement {
    /// `[name]`
    Section { name: String },

    /// `key=value`
    Parameter { key: String, value: String },

    /// `;text`. Read from lines starting with `;` or `#` (marker stripped)
    /// and from free text that is neither a section nor a parameter.
    Comment { text: String },
}

impl IniElement {
    pub fn section(name: impl Into<String>) -> Self {
        Self::Section { name: name.into() }
    }

    pub fn parameter(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Parameter {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment { text: text.into() }
    }

    /// Returns true if this element is a parameter with the given key
    pub fn is_parameter(&self, wanted: &str) -> bool {
        matches!(self, Self::Parameter { key, .. } if key == wanted)
    }
}

impl fmt::Display for IniElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section { name } => write!(f, "[{}]", name),
            Self::Parameter { key, value } => write!(f, "{}={}", key, value),
            Self::Comment { text } => write!(f, ";{}", text),
        }
    }
}
