//! A tiny declarative display element: set its `age` attribute and its text
//! content follows synchronously.

pub const OBSERVED_ATTRIBUTES: &[&str] = &["age"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeInfo {
    age: Option<String>,
    text_content: String,
}

impl AgeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_content(&self) -> &str {
        &self.text_content
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        match name {
            "age" => self.age.as_deref(),
            _ => None,
        }
    }

    /// Only observed attributes are stored; anything else is ignored.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if !OBSERVED_ATTRIBUTES.contains(&name) {
            return;
        }
        let old = self.age.replace(value.to_string());
        self.attribute_changed(name, old.as_deref(), value);
    }

    pub fn attribute_changed(&mut self, name: &str, _old: Option<&str>, new: &str) {
        if name == "age" {
            self.text_content = if new.is_empty() {
                String::new()
            } else {
                format!("Your age is: {new}")
            };
        }
    }
}
