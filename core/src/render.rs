//! Entity renderers: DTO collections to containers and selection controls.
//!
//! # Design
//! Card and option construction is pure so it can be tested without a
//! transport. `ListView` adds the fetch lifecycle around a container:
//! `begin` shows the loading placeholder and hands out a generation ticket,
//! `finish` applies a result only if no newer fetch started in between.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{Book, Borrowing, BorrowingStatus, Member};
use crate::view::{Card, CardField, Container, SelectControl};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_RETURNED: &str = "Not returned yet";
pub const BOOK_PLACEHOLDER: &str = "Select a book";
pub const MEMBER_PLACEHOLDER: &str = "Select a member";

/// The three collections the page keeps in sync with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Books,
    Members,
    Borrowings,
}

impl Collection {
    pub fn path(self) -> &'static str {
        match self {
            Collection::Books => "/books",
            Collection::Members => "/members",
            Collection::Borrowings => "/borrowings",
        }
    }

    pub fn loading_text(self) -> &'static str {
        match self {
            Collection::Books => "Loading books...",
            Collection::Members => "Loading members...",
            Collection::Borrowings => "Loading borrowings...",
        }
    }

    pub fn empty_text(self) -> &'static str {
        match self {
            Collection::Books => "No books found.",
            Collection::Members => "No members found.",
            Collection::Borrowings => "No borrowing history.",
        }
    }

    /// Inline error shown in the container when the fetch fails.
    pub fn error_text(self, cause: &dyn fmt::Display) -> String {
        match self {
            Collection::Books => {
                format!("Failed to load books: {cause}. Make sure the API is running.")
            }
            Collection::Members => format!("Failed to load members: {cause}."),
            Collection::Borrowings => format!("Failed to load borrowings: {cause}."),
        }
    }

    /// Short notifier text for the same failure.
    pub fn failure_notice(self) -> &'static str {
        match self {
            Collection::Books => "Failed to load books.",
            Collection::Members => "Failed to load members.",
            Collection::Borrowings => "Failed to load borrowings.",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path()[1..])
    }
}

/// Generation ticket handed out by `ListView::begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct ListView {
    container: Container,
    generation: u64,
}

impl ListView {
    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn begin(&mut self, loading: &str) -> FetchTicket {
        self.generation += 1;
        self.container = Container::Loading(loading.to_string());
        FetchTicket(self.generation)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply `content` if `ticket` is still the latest fetch. Returns whether
    /// it was applied.
    pub fn finish(&mut self, ticket: FetchTicket, content: Container) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                stale = ticket.0,
                current = self.generation,
                "discarding stale fetch result"
            );
            return false;
        }
        self.container = content;
        true
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    format_date(ts.date())
}

fn or_na(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Cards for a list, or the empty-state text when there is nothing to show.
fn cards_or_empty<T>(collection: Collection, items: &[T], card: impl Fn(&T) -> Card) -> Container {
    if items.is_empty() {
        Container::Empty(collection.empty_text().to_string())
    } else {
        Container::Cards(items.iter().map(card).collect())
    }
}

pub fn book_card(book: &Book) -> Card {
    Card {
        title: book.judul.clone(),
        fields: vec![
            CardField::new("Author ID", book.author_id.to_string()),
            CardField::new("Category ID", book.category_id.to_string()),
            CardField::new(
                "Year",
                or_na(book.tahun_terbit.filter(|&y| y != 0).map(|y| y.to_string())),
            ),
            CardField::new("ISBN", or_na(book.isbn.clone())),
            CardField::new("Stock", book.stok.to_string()).with_class("stok"),
        ],
        footer: Some(format!("Added: {}", format_timestamp(book.tanggal_dibuat))),
    }
}

pub fn render_books(books: &[Book]) -> Container {
    cards_or_empty(Collection::Books, books, book_card)
}

pub fn book_select(books: &[Book]) -> SelectControl {
    let mut select = SelectControl::with_placeholder(BOOK_PLACEHOLDER);
    for book in books {
        select.push(book.id.to_string(), format!("{} (Stock: {})", book.judul, book.stok));
    }
    select
}

pub fn member_card(member: &Member) -> Card {
    Card {
        title: format!("{} (ID: {})", member.nama, member.id),
        fields: vec![
            CardField::new("Phone", member.telepon.clone()),
            CardField::new("Email", or_na(member.email.clone())),
            CardField::new("Address", or_na(member.alamat.clone())),
        ],
        footer: Some(format!("Joined: {}", format_timestamp(member.tanggal_registrasi))),
    }
}

pub fn render_members(members: &[Member]) -> Container {
    cards_or_empty(Collection::Members, members, member_card)
}

pub fn member_select(members: &[Member]) -> SelectControl {
    let mut select = SelectControl::with_placeholder(MEMBER_PLACEHOLDER);
    for member in members {
        select.push(member.id.to_string(), format!("{} (ID: {})", member.nama, member.id));
    }
    select
}

/// Display label and class for a raw borrowing status. Anything the client
/// does not recognise is styled as borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub class: &'static str,
}

impl StatusBadge {
    pub fn for_status(status: &str) -> Self {
        let class = match BorrowingStatus::from_wire(status) {
            Some(BorrowingStatus::Returned) => "status-dikembalikan",
            Some(BorrowingStatus::Overdue) => "status-terlambat",
            Some(BorrowingStatus::Borrowed) | None => "status-dipinjam",
        };
        Self {
            label: status.to_uppercase(),
            class,
        }
    }
}

pub fn borrowing_card(borrowing: &Borrowing) -> Card {
    let book_title = borrowing.book.as_ref().map(|b| b.judul.clone());
    let member_name = borrowing.member.as_ref().map(|m| m.nama.clone());
    let returned = borrowing
        .tanggal_pengembalian_aktual
        .map(format_timestamp)
        .unwrap_or_else(|| NOT_RETURNED.to_string());
    let badge = StatusBadge::for_status(&borrowing.status);

    Card {
        title: format!("Borrowing ID: {}", borrowing.id),
        fields: vec![
            CardField::new(
                "Book",
                format!("{} (ID: {})", or_na(book_title), borrowing.book_id),
            ),
            CardField::new(
                "Member",
                format!("{} (ID: {})", or_na(member_name), borrowing.member_id),
            ),
            CardField::new("Borrowed", format_timestamp(borrowing.tanggal_peminjaman)),
            CardField::new("Due", format_date(borrowing.tanggal_kembali_seharusnya)),
            CardField::new("Returned", returned),
            CardField::new("Status", badge.label).with_class(badge.class),
        ],
        footer: None,
    }
}

pub fn render_borrowings(borrowings: &[Borrowing]) -> Container {
    cards_or_empty(Collection::Borrowings, borrowings, borrowing_card)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn book(id: i64, title: &str, stok: i64) -> Book {
        Book {
            id,
            judul: title.to_string(),
            tahun_terbit: None,
            isbn: None,
            stok,
            author_id: 1,
            category_id: 2,
            tanggal_dibuat: ts(1),
            tanggal_diupdate: None,
            author: None,
            category: None,
        }
    }

    fn member(id: i64, name: &str) -> Member {
        Member {
            id,
            nama: name.to_string(),
            alamat: None,
            telepon: "0812".to_string(),
            email: Some("a@b.id".to_string()),
            tanggal_registrasi: ts(2),
        }
    }

    fn borrowing(status: &str) -> Borrowing {
        Borrowing {
            id: 7,
            book_id: 1,
            member_id: 2,
            tanggal_peminjaman: ts(3),
            tanggal_kembali_seharusnya: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            tanggal_pengembalian_aktual: None,
            status: status.to_string(),
            book: None,
            member: None,
        }
    }

    #[test]
    fn n_books_render_n_cards_and_n_plus_one_options() {
        let books = vec![book(1, "A", 1), book(2, "B", 0), book(3, "C", 5)];
        let container = render_books(&books);
        assert_eq!(container.cards().len(), 3);
        let select = book_select(&books);
        assert_eq!(select.len(), 4);
        assert_eq!(select.options[0].value, "");
        assert_eq!(select.options[0].label, BOOK_PLACEHOLDER);
        assert_eq!(select.options[2].value, "2");
        assert_eq!(select.options[2].label, "B (Stock: 0)");
    }

    #[test]
    fn cards_preserve_server_order() {
        let books = vec![book(9, "Z", 1), book(1, "A", 1)];
        let rendered = render_books(&books);
        let titles: Vec<&str> = rendered
            .cards()
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, ["Z", "A"]);
    }

    #[test]
    fn empty_collection_renders_empty_state() {
        assert_eq!(
            render_books(&[]),
            Container::Empty("No books found.".to_string())
        );
        assert_eq!(
            render_borrowings(&[]),
            Container::Empty("No borrowing history.".to_string())
        );
        assert_eq!(book_select(&[]).len(), 1);
    }

    #[test]
    fn book_card_fills_missing_optionals() {
        let card = book_card(&book(1, "Bumi", 3));
        assert_eq!(card.field("Year").unwrap().value, NOT_AVAILABLE);
        assert_eq!(card.field("ISBN").unwrap().value, NOT_AVAILABLE);
        assert_eq!(card.field("Stock").unwrap().value, "3");
        assert_eq!(card.footer.as_deref(), Some("Added: 2024-05-01"));
    }

    #[test]
    fn zero_year_is_shown_as_not_available() {
        let mut unknown = book(1, "Bumi", 3);
        unknown.tahun_terbit = Some(0);
        assert_eq!(book_card(&unknown).field("Year").unwrap().value, NOT_AVAILABLE);

        unknown.tahun_terbit = Some(1980);
        assert_eq!(book_card(&unknown).field("Year").unwrap().value, "1980");
    }

    #[test]
    fn member_card_and_option_labels() {
        let m = member(4, "Siti");
        let card = member_card(&m);
        assert_eq!(card.title, "Siti (ID: 4)");
        assert_eq!(card.field("Address").unwrap().value, NOT_AVAILABLE);
        assert_eq!(card.field("Email").unwrap().value, "a@b.id");
        let select = member_select(&[m]);
        assert_eq!(select.options[1].label, "Siti (ID: 4)");
        assert_eq!(select.options[0].label, MEMBER_PLACEHOLDER);
    }

    #[test]
    fn status_badge_three_way_branch() {
        assert_eq!(
            StatusBadge::for_status("dikembalikan").class,
            "status-dikembalikan"
        );
        assert_eq!(StatusBadge::for_status("terlambat").class, "status-terlambat");
        assert_eq!(StatusBadge::for_status("dipinjam").class, "status-dipinjam");
        let unknown = StatusBadge::for_status("hilang");
        assert_eq!(unknown.class, "status-dipinjam");
        assert_eq!(unknown.label, "HILANG");
    }

    #[test]
    fn borrowing_card_without_relations_falls_back() {
        let card = borrowing_card(&borrowing("dipinjam"));
        assert_eq!(card.title, "Borrowing ID: 7");
        assert_eq!(card.field("Book").unwrap().value, "N/A (ID: 1)");
        assert_eq!(card.field("Member").unwrap().value, "N/A (ID: 2)");
        assert_eq!(card.field("Returned").unwrap().value, NOT_RETURNED);
        assert_eq!(card.field("Due").unwrap().value, "2024-05-10");
        let status = card.field("Status").unwrap();
        assert_eq!(status.value, "DIPINJAM");
        assert_eq!(status.class.as_deref(), Some("status-dipinjam"));
    }

    #[test]
    fn borrowing_card_with_relations_uses_names() {
        let mut b = borrowing("dikembalikan");
        b.book = Some(book(1, "Bumi", 2));
        b.member = Some(member(2, "Siti"));
        b.tanggal_pengembalian_aktual = Some(ts(6));
        let card = borrowing_card(&b);
        assert_eq!(card.field("Book").unwrap().value, "Bumi (ID: 1)");
        assert_eq!(card.field("Member").unwrap().value, "Siti (ID: 2)");
        assert_eq!(card.field("Returned").unwrap().value, "2024-05-06");
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let mut view = ListView::default();
        let first = view.begin(Collection::Books.loading_text());
        let second = view.begin(Collection::Books.loading_text());
        assert!(matches!(view.container(), Container::Loading(_)));

        assert!(view.finish(second, Container::Empty("newer".into())));
        assert!(!view.finish(first, Container::Empty("older".into())));
        assert_eq!(view.container(), &Container::Empty("newer".into()));
    }

    #[test]
    fn error_text_mentions_cause() {
        let text = Collection::Members.error_text(&"HTTP error! status: 500");
        assert_eq!(text, "Failed to load members: HTTP error! status: 500.");
        assert_eq!(Collection::Borrowings.to_string(), "borrowings");
    }
}
