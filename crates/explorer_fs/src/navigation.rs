//! Navigation controller
//!
//! Owns the current location, the back/forward stacks and the search state.
//! Every request is validated before anything changes: a failed request
//! leaves current, both stacks and the state exactly as they were.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::NavigationError;
use crate::location::{volumes, EntryKind, Location, PathResolver};
use crate::search::{SearchEngine, SearchResult};

/// A named shortcut, such as "Documents".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedLocation {
    pub label: String,
    pub location: Location,
}

impl PinnedLocation {
    pub fn new(label: impl Into<String>, location: impl Into<Location>) -> Self {
        Self {
            label: label.into(),
            location: location.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Browsing,
    /// Results replace the listing until one is activated or the search is
    /// cancelled. Never recorded in history.
    Searching {
        query: String,
        scope: Location,
        results: Vec<SearchResult>,
    },
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    resolver: PathResolver,
    search: SearchEngine,
    current: Location,
    back: Vec<Location>,
    forward: Vec<Location>,
    state: NavState,
    pinned: Vec<PinnedLocation>,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(PathResolver::default(), SearchEngine::default())
    }
}

impl NavigationController {
    /// Starts at the collection root with empty history.
    pub fn new(resolver: PathResolver, search: SearchEngine) -> Self {
        Self {
            resolver,
            search,
            current: Location::CollectionRoot,
            back: Vec::new(),
            forward: Vec::new(),
            state: NavState::Browsing,
            pinned: Vec::new(),
        }
    }

    pub fn with_pinned(mut self, pinned: Vec<PinnedLocation>) -> Self {
        self.pinned = pinned;
        self
    }

    /// Replaces the starting location. History stays empty.
    pub fn starting_at(mut self, location: impl Into<Location>) -> Self {
        self.current = location.into();
        self
    }

    pub fn current(&self) -> &Location {
        &self.current
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.state, NavState::Searching { .. })
    }

    /// Oldest first.
    pub fn back_stack(&self) -> &[Location] {
        &self.back
    }

    /// The next `go_forward` target is last.
    pub fn forward_stack(&self) -> &[Location] {
        &self.forward
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn pinned(&self) -> &[PinnedLocation] {
        &self.pinned
    }

    pub fn search_results(&self) -> &[SearchResult] {
        match &self.state {
            NavState::Searching { results, .. } => results,
            NavState::Browsing => &[],
        }
    }

    // ========================================================================
    // DIRECT NAVIGATION
    // ========================================================================

    /// Location-bar navigation. Relative input is joined onto the current
    /// location.
    pub fn navigate(&mut self, input: &str) -> Result<&Location, NavigationError> {
        let target = self.resolver.resolve_from(input, &self.current)?;
        self.navigate_to(target)
    }

    /// Navigates to an already-built location. Going to the current location
    /// leaves history alone.
    pub fn navigate_to(&mut self, target: Location) -> Result<&Location, NavigationError> {
        self.check_container(&target)?;
        self.state = NavState::Browsing;

        if target != self.current {
            let previous = std::mem::replace(&mut self.current, target);
            self.back.push(previous);
            self.forward.clear();
            tracing::info!("Navigated to {}", self.current);
        }
        Ok(&self.current)
    }

    /// Moves to the parent folder, or to the collection root from a volume.
    /// A no-op at the collection root.
    pub fn go_up(&mut self) -> Result<&Location, NavigationError> {
        match self.current.parent() {
            Some(parent) => self.navigate_to(parent),
            None => Ok(&self.current),
        }
    }

    pub fn open_pinned(&mut self, index: usize) -> Result<&Location, NavigationError> {
        let target = self
            .pinned
            .get(index)
            .map(|pin| pin.location.clone())
            .ok_or(NavigationError::NoSuchPinned(index))?;
        self.navigate_to(target)
    }

    // ========================================================================
    // HISTORY REPLAY
    // ========================================================================

    /// Returns false when there is nothing to go back to. If the previous
    /// location has disappeared the stacks are left untouched.
    pub fn go_back(&mut self) -> Result<bool, NavigationError> {
        let Some(target) = self.back.last().cloned() else {
            return Ok(false);
        };
        self.check_container(&target)?;

        self.back.pop();
        let previous = std::mem::replace(&mut self.current, target);
        self.forward.push(previous);
        self.state = NavState::Browsing;
        tracing::debug!("Back to {}", self.current);
        Ok(true)
    }

    pub fn go_forward(&mut self) -> Result<bool, NavigationError> {
        let Some(target) = self.forward.last().cloned() else {
            return Ok(false);
        };
        self.check_container(&target)?;

        self.forward.pop();
        let previous = std::mem::replace(&mut self.current, target);
        self.back.push(previous);
        self.state = NavState::Browsing;
        tracing::debug!("Forward to {}", self.current);
        Ok(true)
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// Runs a search under `scope` and switches to the search state. An
    /// empty query returns to browsing instead.
    pub fn search(&mut self, query: &str, scope: &Location) -> Result<&[SearchResult], NavigationError> {
        if query.is_empty() {
            self.cancel_search();
            return Ok(&[]);
        }
        self.check_container(scope)?;

        let results: Vec<SearchResult> = match scope {
            Location::Path(path) => self.search.search(query, path).collect(),
            Location::CollectionRoot => {
                let limit = self.search.options().max_results.unwrap_or(usize::MAX);
                volumes()
                    .iter()
                    .flat_map(|volume| self.search.search(query, volume))
                    .take(limit)
                    .collect()
            }
        };
        tracing::info!("Search for {:?} in {} found {} result(s)", query, scope, results.len());

        self.state = NavState::Searching {
            query: query.to_string(),
            scope: scope.clone(),
            results,
        };
        Ok(self.search_results())
    }

    /// Leaves the search state. History is not touched.
    pub fn cancel_search(&mut self) {
        if self.is_searching() {
            tracing::debug!("Search cancelled");
        }
        self.state = NavState::Browsing;
    }

    /// Navigates to the folder holding result `index`, recording history as
    /// a direct navigation would. Returns the activated result so the caller
    /// can highlight it.
    pub fn activate_result(&mut self, index: usize) -> Result<SearchResult, NavigationError> {
        let result = self
            .search_results()
            .get(index)
            .cloned()
            .ok_or(NavigationError::NoSuchResult(index))?;
        let parent = result
            .parent()
            .map(|p| Location::from_path(p))
            .unwrap_or(Location::CollectionRoot);

        self.navigate_to(parent)?;
        Ok(result)
    }

    fn check_container(&self, target: &Location) -> Result<(), NavigationError> {
        match self.resolver.kind_of(target) {
            Ok(kind) if kind.is_container() => Ok(()),
            Ok(EntryKind::File) => Err(NavigationError::NotADirectory(
                target.path().map(PathBuf::from).unwrap_or_default(),
            )),
            Ok(_) | Err(_) => Err(NavigationError::NotFound(target.to_string())),
        }
    }
}
