use std::time::Duration;

use crate::{
    dto::repos::{EmptyStateResponse, RepoListQueryState, RepoListResponse},
    models::repos::{ConfiguredFilter, ListedRepo, RepoPageInfo, SortColumn},
};

/// Keystrokes settle for this long before a search term is committed.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Everything that can happen to a live list session: user interaction
/// relayed by the client, the debounce timer, and page fetches resolving.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SearchInput(String),
    DebounceElapsed { token: u64 },
    SortActivated(SortColumn),
    FilterChanged(ConfiguredFilter),
    /// Load-more click or the scroll sentinel becoming visible.
    LoadMoreRequested,
    PageResolved {
        generation: u64,
        response: RepoListResponse,
    },
    PageFailed {
        generation: u64,
        message: String,
    },
}

/// Effects the session driver must carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Arm (or re-arm) the debounce timer. A newer token supersedes any
    /// older pending timer; last keystroke wins.
    ScheduleDebounce { token: u64, delay: Duration },
    /// Fetch a page for this exact state. Responses must come back tagged
    /// with the same generation.
    Fetch {
        generation: u64,
        state: RepoListQueryState,
    },
    /// Mirror the committed state into the client's location bar.
    SyncLocation { query: String },
    /// Push the current snapshot to the client.
    Render,
    /// Surface a transient failure message; the list stays usable.
    Notify { message: String },
}

/// State machine behind the repository table. Owns the query state, the
/// merged rows, and the pagination bookkeeping; every mutation happens in
/// `handle`, which returns the commands the driver executes. Responses and
/// timers carry tokens, so anything that arrives late — after a newer
/// commit, or after the session went away — is dropped instead of applied.
pub struct RepoListController {
    state: RepoListQueryState,
    rows: Vec<ListedRepo>,
    page_info: RepoPageInfo,
    empty_state: Option<EmptyStateResponse>,
    loading: bool,
    appending: bool,
    generation: u64,
    debounce_token: u64,
    pending_search: Option<String>,
}

impl RepoListController {
    pub fn new(state: RepoListQueryState) -> Self {
        Self {
            state,
            rows: Vec::new(),
            page_info: RepoPageInfo::default(),
            empty_state: None,
            loading: false,
            appending: false,
            generation: 0,
            debounce_token: 0,
            pending_search: None,
        }
    }

    /// Kicks off the first page load for the restored query state.
    pub fn initialize(&mut self) -> Vec<SessionCommand> {
        self.state.cursor = None;
        self.begin_fetch()
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionCommand> {
        match event {
            SessionEvent::SearchInput(term) => {
                self.pending_search = Some(term);
                self.debounce_token += 1;
                vec![SessionCommand::ScheduleDebounce {
                    token: self.debounce_token,
                    delay: SEARCH_DEBOUNCE,
                }]
            }

            SessionEvent::DebounceElapsed { token } => {
                if token != self.debounce_token {
                    // Superseded by a later keystroke.
                    return Vec::new();
                }
                let Some(term) = self.pending_search.take() else {
                    return Vec::new();
                };
                if term == self.state.search_term {
                    return Vec::new();
                }
                self.state.search_term = term;
                self.commit()
            }

            SessionEvent::SortActivated(column) => {
                if self.state.sort_column == column {
                    self.state.sort_direction = self.state.sort_direction.toggled();
                } else {
                    self.state.sort_column = column;
                    self.state.sort_direction = column.natural_direction();
                }
                self.commit()
            }

            SessionEvent::FilterChanged(filter) => {
                if self.state.configured_filter == filter {
                    return Vec::new();
                }
                self.state.configured_filter = filter;
                self.commit()
            }

            SessionEvent::LoadMoreRequested => {
                if self.loading || !self.page_info.has_next_page {
                    return Vec::new();
                }
                self.state.cursor = self.page_info.end_cursor.clone();
                self.begin_fetch()
            }

            SessionEvent::PageResolved {
                generation,
                response,
            } => {
                if generation != self.generation {
                    // A newer commit made this page stale, or the session is
                    // tearing down. Either way it must not touch state.
                    return Vec::new();
                }
                self.loading = false;
                if self.appending {
                    self.rows.extend(response.rows);
                } else {
                    self.rows = response.rows;
                }
                self.page_info = response.page_info;
                self.empty_state = response.empty_state;
                vec![SessionCommand::Render]
            }

            SessionEvent::PageFailed {
                generation,
                message,
            } => {
                if generation != self.generation {
                    return Vec::new();
                }
                self.loading = false;
                vec![SessionCommand::Notify { message }]
            }
        }
    }

    /// A search/sort/filter change: stale cursors must never be reused, so
    /// pagination restarts and the generation fences out in-flight pages.
    fn commit(&mut self) -> Vec<SessionCommand> {
        self.state.cursor = None;
        self.generation += 1;
        let mut commands = self.begin_fetch();
        if let Ok(query) = self.state.to_query_string() {
            commands.push(SessionCommand::SyncLocation { query });
        }
        commands
    }

    fn begin_fetch(&mut self) -> Vec<SessionCommand> {
        self.loading = true;
        self.appending = self.state.cursor.is_some();
        vec![SessionCommand::Fetch {
            generation: self.generation,
            state: self.state.clone(),
        }]
    }

    pub fn rows(&self) -> &[ListedRepo] {
        &self.rows
    }

    pub fn empty_state(&self) -> Option<&EmptyStateResponse> {
        self.empty_state.as_ref()
    }

    pub fn query_state(&self) -> &RepoListQueryState {
        &self.state
    }

    /// The load-more affordance is offered only between fetches while more
    /// pages exist.
    pub fn load_more_visible(&self) -> bool {
        self.page_info.has_next_page && !self.loading
    }
}
