use std::fmt;

/// One CSS rule: a selector and its declarations in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    selector: String,
    declarations: Vec<(&'static str, String)>,
}

impl CssRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
        }
    }

    pub fn decl(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.declarations.push((property, value.into()));
        self
    }

    pub fn px(self, property: &'static str, value: i32) -> Self {
        self.decl(property, format!("{value}px"))
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Value of the first declaration of `property`.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.selector)?;
        for (property, value) in &self.declarations {
            writeln!(f, "    {property}: {value};")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_declarations_in_order() {
        let rule = CssRule::new(".shape1")
            .px("width", 99)
            .decl("position", "absolute")
            .decl("border-radius", "initial");
        assert_eq!(
            rule.to_string(),
            ".shape1 {\n    width: 99px;\n    position: absolute;\n    border-radius: initial;\n}"
        );
        assert_eq!(rule.get("position"), Some("absolute"));
        assert_eq!(rule.get("clip-path"), None);
    }
}
