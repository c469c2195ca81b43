use std::fmt;

/// How to find an element on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Form control by its `name` attribute
    Name(&'static str),
    /// CSS selector
    Css(&'static str),
    /// XPath expression. Absolute paths (`//…`) are made relative when the
    /// lookup is scoped to an element.
    XPath(&'static str),
}

impl Locator {
    /// The equivalent CSS selector, for strategies that have one
    pub fn to_css(&self) -> Option<String> {
        match self {
            Locator::Name(name) => Some(format!("[name=\"{}\"]", name)),
            Locator::Css(selector) => Some((*selector).to_string()),
            Locator::XPath(_) => None,
        }
    }

    /// XPath expression to evaluate against a context node
    pub fn scoped_xpath(&self) -> Option<String> {
        match self {
            Locator::XPath(path) if path.starts_with('/') => Some(format!(".{}", path)),
            Locator::XPath(path) => Some((*path).to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Name(name) => write!(f, "name={}", name),
            Locator::Css(selector) => write!(f, "css={}", selector),
            Locator::XPath(path) => write!(f, "xpath={}", path),
        }
    }
}
