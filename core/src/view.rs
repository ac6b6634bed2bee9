//! Headless view model: what a page would show, as plain data.

/// Contents of one list container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Loading(String),
    Empty(String),
    Cards(Vec<Card>),
    Error(String),
}

impl Default for Container {
    fn default() -> Self {
        Container::Cards(Vec::new())
    }
}

impl Container {
    pub fn cards(&self) -> &[Card] {
        match self {
            Container::Cards(cards) => cards,
            _ => &[],
        }
    }
}

/// One summary card in a list container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub fields: Vec<CardField>,
    pub footer: Option<String>,
}

impl Card {
    /// Value of the first field with this label.
    pub fn field(&self, label: &str) -> Option<&CardField> {
        self.fields.iter().find(|f| f.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub label: String,
    pub value: String,
    /// Styling hook for values that carry one (the status badge).
    pub class: Option<String>,
}

impl CardField {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            class: None,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }
}

/// A dropdown fed from a fetched collection. The first option is always the
/// placeholder with an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectControl {
    pub options: Vec<SelectOption>,
}

impl SelectControl {
    pub fn with_placeholder(placeholder: &str) -> Self {
        Self {
            options: vec![SelectOption {
                value: String::new(),
                label: placeholder.to_string(),
            }],
        }
    }

    pub fn push(&mut self, value: impl Into<String>, label: impl Into<String>) {
        self.options.push(SelectOption {
            value: value.into(),
            label: label.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}
