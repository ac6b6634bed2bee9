//! Plain-text rendering of the view model.

use std::fmt::Write;

use library_core::notifier::Message;
use library_core::{Card, Container, Effect, MessageSlot, SelectControl};

pub fn container(heading: &str, container: &Container) -> String {
    let mut out = format!("== {heading} ==\n");
    match container {
        Container::Loading(text) | Container::Empty(text) => {
            let _ = writeln!(out, "{text}");
        }
        Container::Error(text) => {
            let _ = writeln!(out, "! {text}");
        }
        Container::Cards(cards) => {
            for card in cards {
                out.push_str(&self::card(card));
            }
        }
    }
    out
}

fn card(card: &Card) -> String {
    let mut out = format!("* {}\n", card.title);
    for field in &card.fields {
        match &field.class {
            Some(class) => {
                let _ = writeln!(out, "    {}: {} [{class}]", field.label, field.value);
            }
            None => {
                let _ = writeln!(out, "    {}: {}", field.label, field.value);
            }
        }
    }
    if let Some(footer) = &card.footer {
        let _ = writeln!(out, "    {footer}");
    }
    out
}

/// Options after the placeholder, one per line.
pub fn select(heading: &str, select: &SelectControl) -> String {
    let mut out = format!("== {heading} ==\n");
    for option in select.options.iter().skip(1) {
        let _ = writeln!(out, "[{}] {}", option.value, option.label);
    }
    out
}

pub fn message(slot: MessageSlot, message: &Message) -> String {
    format!("{} ({}): {}\n", slot.id(), message.kind.as_str(), message.text)
}

pub fn effect(effect: &Effect) -> String {
    match effect {
        Effect::ShowSection(section) => format!("show #{}\n", section.element_id()),
        Effect::ShowTab { axis, target } => format!("show {} tab #{target}\n", axis.as_str()),
        Effect::Refresh(collection) => format!("refresh {collection}\n"),
    }
}

#[cfg(test)]
mod tests {
    use library_core::notifier::Message;
    use library_core::{CardField, Collection, MessageKind, Section, TabAxis};

    use super::*;

    #[test]
    fn cards_list_fields_and_classes() {
        let view = Container::Cards(vec![Card {
            title: "Bumi Manusia".into(),
            fields: vec![
                CardField::new("ISBN", "N/A"),
                CardField::new("Stock", "3").with_class("stok"),
            ],
            footer: Some("Added: 2024-05-01".into()),
        }]);
        assert_eq!(
            container("Books", &view),
            "== Books ==\n* Bumi Manusia\n    ISBN: N/A\n    Stock: 3 [stok]\n    Added: 2024-05-01\n"
        );
    }

    #[test]
    fn error_container_is_flagged() {
        let view = Container::Error("Failed to load members: boom.".into());
        assert!(container("Members", &view).contains("! Failed to load members"));
    }

    #[test]
    fn select_skips_placeholder() {
        let mut control = SelectControl::with_placeholder("Select a book");
        control.push("4", "Laskar Pelangi (Stock: 2)");
        assert_eq!(select("Books", &control), "== Books ==\n[4] Laskar Pelangi (Stock: 2)\n");
    }

    #[test]
    fn message_names_slot_and_kind() {
        let msg = Message {
            text: "Book added successfully!".into(),
            kind: MessageKind::Success,
        };
        assert_eq!(
            message(MessageSlot::Book, &msg),
            "book-message (success): Book added successfully!\n"
        );
    }

    #[test]
    fn effects_render_targets() {
        assert_eq!(
            effect(&Effect::ShowSection(Section::MemberManagement)),
            "show #member-management-section\n"
        );
        assert_eq!(
            effect(&Effect::ShowTab {
                axis: TabAxis::Borrowing,
                target: "return-book-subsection".into(),
            }),
            "show borrowing tab #return-book-subsection\n"
        );
        assert_eq!(effect(&Effect::Refresh(Collection::Books)), "refresh books\n");
    }
}
