//! Navigation state machine.
//!
//! # Design
//! Two independent axes: the top-level section and, inside the borrowing and
//! member sections, a tab. `transition` is a pure function from the current
//! state and an event to the next state plus the effects a host must run
//! (show this block, refresh that collection). Tab targets come from a
//! `Routes` table that is checked for completeness when it is built, because
//! the markup ids do not follow one naming pattern.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::NavError;
use crate::render::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    BookList,
    BorrowingManagement,
    MemberManagement,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::BookList,
        Section::BorrowingManagement,
        Section::MemberManagement,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Section::BookList => "book-list",
            Section::BorrowingManagement => "borrowing-management",
            Section::MemberManagement => "member-management",
        }
    }

    pub fn element_id(self) -> String {
        format!("{}-section", self.key())
    }

    /// Collections to refetch when this section becomes active, in order.
    pub fn refreshes(self) -> &'static [Collection] {
        match self {
            Section::BookList => &[Collection::Books],
            Section::BorrowingManagement => {
                &[Collection::Borrowings, Collection::Books, Collection::Members]
            }
            Section::MemberManagement => &[Collection::Members],
        }
    }
}

impl FromStr for Section {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.key() == s)
            .ok_or_else(|| NavError::UnknownSection(s.to_string()))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabAxis {
    Borrowing,
    Member,
}

impl TabAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            TabAxis::Borrowing => "borrowing",
            TabAxis::Member => "member",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorrowingTab {
    List,
    New,
    Return,
}

impl BorrowingTab {
    pub const ALL: [BorrowingTab; 3] =
        [BorrowingTab::List, BorrowingTab::New, BorrowingTab::Return];

    pub fn key(self) -> &'static str {
        match self {
            BorrowingTab::List => "list",
            BorrowingTab::New => "new",
            BorrowingTab::Return => "return",
        }
    }
}

impl FromStr for BorrowingTab {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BorrowingTab::ALL
            .into_iter()
            .find(|tab| tab.key() == s)
            .ok_or_else(|| NavError::UnknownTab {
                axis: TabAxis::Borrowing.as_str(),
                key: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberTab {
    List,
    New,
}

impl MemberTab {
    pub const ALL: [MemberTab; 2] = [MemberTab::List, MemberTab::New];

    pub fn key(self) -> &'static str {
        match self {
            MemberTab::List => "list",
            MemberTab::New => "new",
        }
    }
}

impl FromStr for MemberTab {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberTab::ALL
            .into_iter()
            .find(|tab| tab.key() == s)
            .ok_or_else(|| NavError::UnknownTab {
                axis: TabAxis::Member.as_str(),
                key: s.to_string(),
            })
    }
}

/// Tab key to markup id, per axis.
#[derive(Debug, Clone)]
pub struct Routes {
    borrowing: HashMap<BorrowingTab, String>,
    member: HashMap<MemberTab, String>,
}

impl Routes {
    pub const BORROWING: [(BorrowingTab, &'static str); 3] = [
        (BorrowingTab::List, "borrowings-list-subsection"),
        (BorrowingTab::New, "borrow-new-subsection"),
        (BorrowingTab::Return, "return-book-subsection"),
    ];

    pub const MEMBER: [(MemberTab, &'static str); 2] = [
        (MemberTab::List, "members-list-subsection"),
        (MemberTab::New, "add-member-subsection"),
    ];

    /// Build a table, rejecting it unless every tab of both axes maps to a
    /// non-empty id.
    pub fn new(
        borrowing: &[(BorrowingTab, &str)],
        member: &[(MemberTab, &str)],
    ) -> Result<Self, NavError> {
        let borrowing: HashMap<BorrowingTab, String> = borrowing
            .iter()
            .map(|&(tab, id)| (tab, id.to_string()))
            .collect();
        let member: HashMap<MemberTab, String> = member
            .iter()
            .map(|&(tab, id)| (tab, id.to_string()))
            .collect();

        for tab in BorrowingTab::ALL {
            check_route(TabAxis::Borrowing, tab.key(), borrowing.get(&tab))?;
        }
        for tab in MemberTab::ALL {
            check_route(TabAxis::Member, tab.key(), member.get(&tab))?;
        }
        Ok(Self { borrowing, member })
    }

    pub fn standard() -> Result<Self, NavError> {
        Self::new(&Self::BORROWING, &Self::MEMBER)
    }

    pub fn borrowing_target(&self, tab: BorrowingTab) -> &str {
        self.borrowing.get(&tab).map(String::as_str).unwrap_or_default()
    }

    pub fn member_target(&self, tab: MemberTab) -> &str {
        self.member.get(&tab).map(String::as_str).unwrap_or_default()
    }
}

fn check_route(axis: TabAxis, key: &'static str, target: Option<&String>) -> Result<(), NavError> {
    match target {
        None => Err(NavError::MissingRoute {
            axis: axis.as_str(),
            key,
        }),
        Some(id) if id.trim().is_empty() => Err(NavError::EmptyRoute {
            axis: axis.as_str(),
            key,
        }),
        Some(_) => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub section: Section,
    pub borrowing_tab: BorrowingTab,
    pub member_tab: MemberTab,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            section: Section::BookList,
            borrowing_tab: BorrowingTab::List,
            member_tab: MemberTab::List,
        }
    }
}

impl NavState {
    pub fn is_active(&self, section: Section) -> bool {
        self.section == section
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    SelectSection(Section),
    SelectBorrowingTab(BorrowingTab),
    SelectMemberTab(MemberTab),
}

impl NavEvent {
    /// Event for a sidebar link carrying `data-section="<key>"`.
    pub fn section(key: &str) -> Result<Self, NavError> {
        key.parse().map(NavEvent::SelectSection)
    }

    /// Event for a tab button on `axis` carrying the tab `key`.
    pub fn tab(axis: TabAxis, key: &str) -> Result<Self, NavError> {
        match axis {
            TabAxis::Borrowing => key.parse().map(NavEvent::SelectBorrowingTab),
            TabAxis::Member => key.parse().map(NavEvent::SelectMemberTab),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ShowSection(Section),
    ShowTab { axis: TabAxis, target: String },
    Refresh(Collection),
}

pub fn transition(state: &NavState, event: NavEvent, routes: &Routes) -> (NavState, Vec<Effect>) {
    let mut next = *state;
    let mut effects = Vec::new();
    match event {
        NavEvent::SelectSection(section) => {
            next.section = section;
            effects.push(Effect::ShowSection(section));
            effects.extend(section.refreshes().iter().copied().map(Effect::Refresh));
        }
        NavEvent::SelectBorrowingTab(tab) => {
            next.borrowing_tab = tab;
            effects.push(Effect::ShowTab {
                axis: TabAxis::Borrowing,
                target: routes.borrowing_target(tab).to_string(),
            });
            if tab == BorrowingTab::New {
                effects.push(Effect::Refresh(Collection::Books));
                effects.push(Effect::Refresh(Collection::Members));
            }
        }
        NavEvent::SelectMemberTab(tab) => {
            next.member_tab = tab;
            effects.push(Effect::ShowTab {
                axis: TabAxis::Member,
                target: routes.member_target(tab).to_string(),
            });
        }
    }
    tracing::debug!(from = ?state, to = ?next, ?event, "navigation transition");
    (next, effects)
}

/// Effects of the initial page load: the book list is shown, books are
/// fetched for the list and the selector, members for their selector.
pub fn startup_effects() -> Vec<Effect> {
    vec![
        Effect::ShowSection(Section::BookList),
        Effect::Refresh(Collection::Books),
        Effect::Refresh(Collection::Members),
    ]
}
