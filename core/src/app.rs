//! Application context: everything a page holds between load and unload.
//!
//! # Design
//! `App` owns the client, the host's transport, the navigation state, the
//! list views, the selection controls, the forms and the notifier. Hosts
//! feed it events (navigation, form submission, timer ticks) and read the
//! view model back. The server stays the only source of truth: every
//! mutation is followed by a refetch of the collections it touched.

use crate::client::LibraryClient;
use crate::config::AppConfig;
use crate::error::{ApiError, NavError, SubmitError};
use crate::forms::{BookForm, BorrowForm, MemberForm, ReturnForm};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::nav::{self, Effect, NavEvent, NavState, Routes, TabAxis};
use crate::notifier::{Clock, Message, MessageKind, MessageSlot, Notifier, SystemClock};
use crate::render::{self, Collection, FetchTicket, ListView, BOOK_PLACEHOLDER, MEMBER_PLACEHOLDER};
use crate::types::{Author, Book, Borrowing, Category, CreateAuthor, CreateCategory, Member};
use crate::view::{Container, SelectControl};

/// The four forms of the page.
#[derive(Debug, Clone, Default)]
pub struct Forms {
    pub book: BookForm,
    pub member: MemberForm,
    pub borrow: BorrowForm,
    pub ret: ReturnForm,
}

/// User-facing wording for one kind of submission.
struct Operation {
    slot: MessageSlot,
    failed: &'static str,
    during: &'static str,
}

const ADD_BOOK: Operation = Operation {
    slot: MessageSlot::Book,
    failed: "Failed to add book",
    during: "adding book",
};

const ADD_MEMBER: Operation = Operation {
    slot: MessageSlot::Member,
    failed: "Failed to add member",
    during: "adding member",
};

const BORROW_BOOK: Operation = Operation {
    slot: MessageSlot::Borrowing,
    failed: "Failed to borrow book",
    during: "borrowing book",
};

const RETURN_BOOK: Operation = Operation {
    slot: MessageSlot::Return,
    failed: "Failed to return book",
    during: "returning book",
};

impl Operation {
    fn failure_text(&self, err: &ApiError) -> String {
        match err {
            ApiError::Http { .. } => format!("{}: {}", self.failed, err.reason()),
            other => format!("Error while {}: {other}", self.during),
        }
    }
}

pub struct App<T, C: Clock = SystemClock> {
    client: LibraryClient,
    transport: T,
    routes: Routes,
    nav: NavState,
    books: ListView,
    members: ListView,
    borrowings: ListView,
    book_select: SelectControl,
    member_select: SelectControl,
    notifier: Notifier<C>,
    pub forms: Forms,
}

impl<T: Transport> App<T, SystemClock> {
    pub fn new(config: &AppConfig, transport: T) -> Result<Self, NavError> {
        Self::with_clock(config, transport, SystemClock)
    }
}

impl<T: Transport, C: Clock> App<T, C> {
    /// Build the context. Fails if the tab routing table is incomplete.
    pub fn with_clock(config: &AppConfig, transport: T, clock: C) -> Result<Self, NavError> {
        Ok(Self {
            client: LibraryClient::new(&config.api.base_url),
            transport,
            routes: Routes::standard()?,
            nav: NavState::default(),
            books: ListView::default(),
            members: ListView::default(),
            borrowings: ListView::default(),
            book_select: SelectControl::with_placeholder(BOOK_PLACEHOLDER),
            member_select: SelectControl::with_placeholder(MEMBER_PLACEHOLDER),
            notifier: Notifier::new(clock, config.notifier.clear_after()),
            forms: Forms::default(),
        })
    }

    pub fn client(&self) -> &LibraryClient {
        &self.client
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Markup id of the active tab on `axis`.
    pub fn active_tab_target(&self, axis: TabAxis) -> &str {
        match axis {
            TabAxis::Borrowing => self.routes.borrowing_target(self.nav.borrowing_tab),
            TabAxis::Member => self.routes.member_target(self.nav.member_tab),
        }
    }

    pub fn container(&self, collection: Collection) -> &Container {
        self.view(collection).container()
    }

    pub fn book_select(&self) -> &SelectControl {
        &self.book_select
    }

    pub fn member_select(&self) -> &SelectControl {
        &self.member_select
    }

    pub fn message(&self, slot: MessageSlot) -> Option<&Message> {
        self.notifier.message(slot)
    }

    pub fn notifier(&self) -> &Notifier<C> {
        &self.notifier
    }

    /// Initial page load.
    pub fn start(&mut self) -> Vec<Effect> {
        let effects = nav::startup_effects();
        self.run_effects(&effects);
        effects
    }

    /// Apply a navigation event and run its refreshes. The effects are
    /// returned so a host can update whatever it draws.
    pub fn dispatch(&mut self, event: NavEvent) -> Vec<Effect> {
        let (next, effects) = nav::transition(&self.nav, event, &self.routes);
        self.nav = next;
        self.run_effects(&effects);
        effects
    }

    /// Fire due notifier timers.
    pub fn tick(&mut self) -> Vec<MessageSlot> {
        self.notifier.tick()
    }

    fn run_effects(&mut self, effects: &[Effect]) {
        for effect in effects {
            if let Effect::Refresh(collection) = effect {
                self.refresh(*collection);
            }
        }
    }

    fn view(&self, collection: Collection) -> &ListView {
        match collection {
            Collection::Books => &self.books,
            Collection::Members => &self.members,
            Collection::Borrowings => &self.borrowings,
        }
    }

    fn view_mut(&mut self, collection: Collection) -> &mut ListView {
        match collection {
            Collection::Books => &mut self.books,
            Collection::Members => &mut self.members,
            Collection::Borrowings => &mut self.borrowings,
        }
    }

    /// Refetch one collection and redraw it.
    pub fn refresh(&mut self, collection: Collection) {
        let (ticket, request) = self.begin_fetch(collection);
        let result = self.transport.execute(request);
        self.finish_fetch(collection, ticket, result);
    }

    /// Show the loading placeholder and return the request to execute along
    /// with the ticket to hand back to `finish_fetch`.
    pub fn begin_fetch(&mut self, collection: Collection) -> (FetchTicket, HttpRequest) {
        let ticket = self.view_mut(collection).begin(collection.loading_text());
        let request = match collection {
            Collection::Books => self.client.build_list_books(),
            Collection::Members => self.client.build_list_members(),
            Collection::Borrowings => self.client.build_list_borrowings(),
        };
        tracing::debug!(%collection, url = %request.url, "fetching");
        (ticket, request)
    }

    /// Apply a fetch result. Results for a superseded ticket are dropped
    /// without touching the view or the notifier.
    pub fn finish_fetch(
        &mut self,
        collection: Collection,
        ticket: FetchTicket,
        result: Result<HttpResponse, ApiError>,
    ) {
        if !self.view(collection).is_current(ticket) {
            tracing::debug!(%collection, "ignoring superseded fetch");
            return;
        }
        let rendered = result.and_then(|response| match collection {
            Collection::Books => {
                let books = self.client.parse_list_books(response)?;
                self.book_select = render::book_select(&books);
                Ok(render::render_books(&books))
            }
            Collection::Members => {
                let members = self.client.parse_list_members(response)?;
                self.member_select = render::member_select(&members);
                Ok(render::render_members(&members))
            }
            Collection::Borrowings => {
                let borrowings = self.client.parse_list_borrowings(response)?;
                Ok(render::render_borrowings(&borrowings))
            }
        });
        match rendered {
            Ok(container) => {
                self.view_mut(collection).finish(ticket, container);
            }
            Err(err) => {
                tracing::warn!(%collection, error = %err, "fetch failed");
                let text = collection.error_text(&err);
                self.view_mut(collection).finish(ticket, Container::Error(text));
                self.notifier.notify(
                    fetch_slot(collection),
                    collection.failure_notice(),
                    MessageKind::Error,
                );
            }
        }
    }

    fn send<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: fn(&LibraryClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let request = request?;
        tracing::debug!(method = %request.method, url = %request.url, "submitting");
        let response = self.transport.execute(request)?;
        parse(&self.client, response)
    }

    fn report(&mut self, op: &Operation, err: ApiError) -> SubmitError {
        tracing::warn!(
            slot = op.slot.id(),
            status = err.status(),
            error = %err,
            "submission failed"
        );
        self.notifier
            .notify(op.slot, op.failure_text(&err), MessageKind::Error);
        SubmitError::Api(err)
    }

    pub fn submit_book(&mut self) -> Result<Book, SubmitError> {
        let payload = self.forms.book.payload();
        match self.send(self.client.build_create_book(&payload), LibraryClient::parse_create_book) {
            Ok(book) => {
                tracing::info!(id = book.id, title = %book.judul, "book added");
                self.notifier
                    .notify(MessageSlot::Book, "Book added successfully!", MessageKind::Success);
                self.forms.book.reset();
                self.refresh(Collection::Books);
                Ok(book)
            }
            Err(err) => Err(self.report(&ADD_BOOK, err)),
        }
    }

    pub fn submit_member(&mut self) -> Result<Member, SubmitError> {
        let payload = self.forms.member.payload();
        match self.send(
            self.client.build_create_member(&payload),
            LibraryClient::parse_create_member,
        ) {
            Ok(member) => {
                tracing::info!(id = member.id, name = %member.nama, "member added");
                self.notifier.notify(
                    MessageSlot::Member,
                    "Member added successfully!",
                    MessageKind::Success,
                );
                self.forms.member.reset();
                self.refresh(Collection::Members);
                Ok(member)
            }
            Err(err) => Err(self.report(&ADD_MEMBER, err)),
        }
    }

    /// Validate and submit the borrow form. Invalid input is reported in the
    /// borrowing slot without any request being made.
    pub fn submit_borrowing(&mut self) -> Result<Borrowing, SubmitError> {
        let payload = match self.forms.borrow.payload() {
            Ok(payload) => payload,
            Err(err) => {
                self.notifier
                    .notify(MessageSlot::Borrowing, err.to_string(), MessageKind::Error);
                return Err(err.into());
            }
        };
        match self.send(
            self.client.build_create_borrowing(&payload),
            LibraryClient::parse_create_borrowing,
        ) {
            Ok(borrowing) => {
                tracing::info!(id = borrowing.id, book_id = borrowing.book_id, "book borrowed");
                self.notifier.notify(
                    MessageSlot::Borrowing,
                    "Book borrowed successfully!",
                    MessageKind::Success,
                );
                self.forms.borrow.reset();
                self.refresh(Collection::Books);
                self.refresh(Collection::Borrowings);
                Ok(borrowing)
            }
            Err(err) => Err(self.report(&BORROW_BOOK, err)),
        }
    }

    pub fn submit_return(&mut self) -> Result<Borrowing, SubmitError> {
        let id = match self.forms.ret.borrowing_id() {
            Ok(id) => id,
            Err(err) => {
                self.notifier
                    .notify(MessageSlot::Return, err.to_string(), MessageKind::Error);
                return Err(err.into());
            }
        };
        match self.send(
            self.client.build_return_borrowing(id),
            LibraryClient::parse_return_borrowing,
        ) {
            Ok(borrowing) => {
                tracing::info!(id, "borrowing returned");
                self.notifier.notify(
                    MessageSlot::Return,
                    format!("Borrowing ID {id} returned successfully!"),
                    MessageKind::Success,
                );
                self.forms.ret.reset();
                self.refresh(Collection::Books);
                self.refresh(Collection::Borrowings);
                Ok(borrowing)
            }
            Err(err) => Err(self.report(&RETURN_BOOK, err)),
        }
    }

    pub fn authors(&self) -> Result<Vec<Author>, ApiError> {
        self.send(Ok(self.client.build_list_authors()), LibraryClient::parse_list_authors)
    }

    pub fn add_author(&self, input: &CreateAuthor) -> Result<Author, ApiError> {
        self.send(self.client.build_create_author(input), LibraryClient::parse_create_author)
    }

    pub fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.send(Ok(self.client.build_list_categories()), LibraryClient::parse_list_categories)
    }

    pub fn add_category(&self, input: &CreateCategory) -> Result<Category, ApiError> {
        self.send(self.client.build_create_category(input), LibraryClient::parse_create_category)
    }
}

fn fetch_slot(collection: Collection) -> MessageSlot {
    match collection {
        Collection::Books => MessageSlot::Book,
        Collection::Members => MessageSlot::Member,
        Collection::Borrowings => MessageSlot::Borrowing,
    }
}
