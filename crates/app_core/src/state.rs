//! Viewer state and the reducer driving it
//!
//! `reduce` is a pure function from the current state and one [`Action`] to
//! the next state plus the side effects to run. Asynchronous work reports
//! back as another `Action` tagged with the generation it was started in;
//! `open` and `reload` start a new generation, so late results of an older
//! flow are dropped instead of overwriting newer state.

use crate::command::Command;
use crate::config::ViewerSettings;
use crate::metadata::{MetadataCache, MetadataEntry};
use crate::navigation::{self, PageWindows, MAX_STEPS};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Which screen is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Browsing,
    Help,
}

impl ViewMode {
    fn toggled(self) -> Self {
        match self {
            ViewMode::Browsing => ViewMode::Help,
            ViewMode::Help => ViewMode::Browsing,
        }
    }
}

/// Which flow a resolution belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOrigin {
    /// New selection: starts at the first page
    Open,
    /// Same selection re-expanded: keeps the position
    Reload,
}

/// Input to the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Command(Command),
    /// The picker closed; `paths` is empty when cancelled
    PickerClosed { generation: u64, paths: Vec<String> },
    FilesResolved {
        generation: u64,
        origin: ResolveOrigin,
        files: Vec<String>,
    },
    MetadataFetched {
        generation: u64,
        entries: Vec<(String, MetadataEntry)>,
    },
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        Action::Command(command)
    }
}

/// Side effect requested by the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowPicker { generation: u64 },
    Resolve {
        generation: u64,
        origin: ResolveOrigin,
        paths: Vec<String>,
    },
    FetchMetadata { generation: u64, paths: Vec<String> },
    PersistSettings(ViewerSettings),
    Quit,
    ToggleDevTools,
}

/// Everything the viewer shows, as one immutable value
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    /// Paths last returned by the picker, re-expanded on reload
    pub picked_paths: Arc<[String]>,
    /// Flat image list in display order
    pub files: Arc<[String]>,
    /// First image of the current page; may be transiently out of range
    pub index: i64,
    /// Images per page, at least 1
    pub steps: usize,
    pub view_mode: ViewMode,
    pub tooltip_enabled: bool,
    pub metadata: MetadataCache,
    /// Bumped by every open/reload; older async results are discarded
    pub generation: u64,
    /// Paths with a metadata fetch in flight for this generation
    pending_metadata: BTreeSet<String>,
    /// An open or reload has not produced a file list yet
    awaiting_files: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}

impl ViewerState {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            picked_paths: Arc::from(Vec::new()),
            files: Arc::from(Vec::new()),
            index: 0,
            steps: settings.steps.clamp(1, MAX_STEPS),
            view_mode: ViewMode::Browsing,
            tooltip_enabled: settings.tooltip_enabled,
            metadata: MetadataCache::new(),
            generation: 0,
            pending_metadata: BTreeSet::new(),
            awaiting_files: false,
        }
    }

    /// Previous, current and next pages
    pub fn windows(&self) -> PageWindows<'_, String> {
        navigation::page_windows(&self.files, self.index, self.steps)
    }

    /// Help is shown when toggled on or when there is nothing to show
    pub fn shows_help(&self) -> bool {
        self.view_mode == ViewMode::Help || self.windows().is_empty()
    }

    pub fn settings(&self) -> ViewerSettings {
        ViewerSettings {
            steps: self.steps,
            tooltip_enabled: self.tooltip_enabled,
        }
    }

    /// Paths currently being fetched
    pub fn pending_metadata(&self) -> impl Iterator<Item = &String> {
        self.pending_metadata.iter()
    }

    /// `1-3 / 10` style position label; empty without a current page
    pub fn position_label(&self) -> String {
        let current = self.windows().current.len();
        if current == 0 {
            return String::new();
        }
        let first = self.index + 1;
        let last = self.index + current as i64;
        if first == last {
            format!("{} / {}", first, self.files.len())
        } else {
            format!("{}-{} / {}", first, last, self.files.len())
        }
    }

    fn next_generation(&mut self) {
        self.generation += 1;
        self.pending_metadata.clear();
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation
    }
}

/// Apply one action, returning the new state and the effects to run
pub fn reduce(state: &ViewerState, action: Action) -> (ViewerState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        Action::Command(command) => {
            tracing::debug!(%command, index = state.index, steps = state.steps, "Command");
            apply_command(&mut next, command, &mut effects);
        }

        Action::PickerClosed { generation, paths } => {
            if next.is_stale(generation) {
                tracing::debug!(generation, current = next.generation, "Dropping stale picker result");
                return (next, effects);
            }
            if paths.is_empty() {
                tracing::debug!("Picker cancelled, keeping current files");
                next.awaiting_files = false;
            } else {
                next.view_mode = ViewMode::Browsing;
                next.picked_paths = Arc::from(paths.clone());
                effects.push(Effect::Resolve {
                    generation,
                    origin: ResolveOrigin::Open,
                    paths,
                });
            }
        }

        Action::FilesResolved { generation, origin, files } => {
            if next.is_stale(generation) {
                tracing::debug!(generation, current = next.generation, "Dropping stale file list");
                return (next, effects);
            }
            tracing::info!(count = files.len(), ?origin, "Loaded image list");
            next.files = Arc::from(files);
            next.metadata = MetadataCache::new();
            next.pending_metadata.clear();
            next.awaiting_files = false;
            if origin == ResolveOrigin::Open {
                next.index = 0;
            }
        }

        Action::MetadataFetched { generation, entries } => {
            if next.is_stale(generation) {
                tracing::debug!(generation, current = next.generation, "Dropping stale metadata");
                return (next, effects);
            }
            for (path, _) in &entries {
                next.pending_metadata.remove(path);
            }
            let files = Arc::clone(&next.files);
            next.metadata = next
                .metadata
                .merged(entries.into_iter().filter(|(path, _)| files.contains(path)));
        }
    }

    request_missing_metadata(&mut next, &mut effects);
    (next, effects)
}

fn apply_command(state: &mut ViewerState, command: Command, effects: &mut Vec<Effect>) {
    let len = state.files.len();

    match command {
        Command::Open => {
            state.next_generation();
            state.awaiting_files = true;
            effects.push(Effect::ShowPicker {
                generation: state.generation,
            });
        }
        Command::Reload => {
            state.next_generation();
            state.awaiting_files = true;
            state.view_mode = ViewMode::Browsing;
            state.metadata = MetadataCache::new();
            effects.push(Effect::Resolve {
                generation: state.generation,
                origin: ResolveOrigin::Reload,
                paths: state.picked_paths.to_vec(),
            });
        }
        Command::ToggleHelp => state.view_mode = state.view_mode.toggled(),
        Command::ToggleTooltip => {
            state.tooltip_enabled = !state.tooltip_enabled;
            effects.push(Effect::PersistSettings(state.settings()));
        }
        Command::Quit => effects.push(Effect::Quit),
        Command::ToggleDevTools => effects.push(Effect::ToggleDevTools),
        Command::Advance => state.index = navigation::advance(state.index, state.steps, len),
        Command::Retreat => state.index = navigation::retreat(state.index, state.steps),
        Command::GoFirst => state.index = 0,
        Command::GoLast => state.index = navigation::last_page(state.steps, len),
        Command::IncreaseSteps => {
            let steps = state.steps.saturating_add(1).min(MAX_STEPS);
            if steps != state.steps {
                state.steps = steps;
                effects.push(Effect::PersistSettings(state.settings()));
            }
        }
        Command::DecreaseSteps => {
            let steps = state.steps.saturating_sub(1).max(1);
            if steps != state.steps {
                state.steps = steps;
                effects.push(Effect::PersistSettings(state.settings()));
            }
        }
    }
}

/// Queue a fetch for uncached paths around the current page
///
/// Nothing is fetched between an open or reload and its file list, since the
/// list on screen is about to be replaced.
fn request_missing_metadata(state: &mut ViewerState, effects: &mut Vec<Effect>) {
    if !state.tooltip_enabled || state.awaiting_files {
        return;
    }

    let paths: Vec<String> = state
        .metadata
        .missing(&state.files, state.index, state.steps)
        .into_iter()
        .filter(|p| !state.pending_metadata.contains(p))
        .collect();
    if paths.is_empty() {
        return;
    }

    state.pending_metadata.extend(paths.iter().cloned());
    effects.push(Effect::FetchMetadata {
        generation: state.generation,
        paths,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/img/{:02}.png", i)).collect()
    }

    fn loaded(n: usize, steps: usize) -> ViewerState {
        let state = ViewerState::new(ViewerSettings { steps, tooltip_enabled: false });
        let (state, _) = reduce(&state, Command::Open.into());
        let (state, _) = reduce(
            &state,
            Action::PickerClosed { generation: state.generation, paths: vec!["/img".into()] },
        );
        let (state, _) = reduce(
            &state,
            Action::FilesResolved {
                generation: state.generation,
                origin: ResolveOrigin::Open,
                files: files(n),
            },
        );
        state
    }

    fn press(state: &ViewerState, command: Command) -> (ViewerState, Vec<Effect>) {
        reduce(state, command.into())
    }

    #[test]
    fn test_initial_state_shows_help() {
        let state = ViewerState::default();
        assert!(state.shows_help());
        assert_eq!(state.steps, 1);
    }

    #[test]
    fn test_open_flow() {
        let state = ViewerState::default();

        let (state, effects) = press(&state, Command::Open);
        assert_eq!(effects, vec![Effect::ShowPicker { generation: 1 }]);

        let (state, effects) = reduce(
            &state,
            Action::PickerClosed { generation: 1, paths: vec!["/img".into(), "/x.png".into()] },
        );
        assert_eq!(
            effects,
            vec![Effect::Resolve {
                generation: 1,
                origin: ResolveOrigin::Open,
                paths: vec!["/img".into(), "/x.png".into()],
            }]
        );
        assert_eq!(&*state.picked_paths, &["/img".to_string(), "/x.png".to_string()]);

        let (state, effects) = reduce(
            &state,
            Action::FilesResolved { generation: 1, origin: ResolveOrigin::Open, files: files(4) },
        );
        assert!(effects.is_empty());
        assert_eq!(state.files.len(), 4);
        assert!(!state.shows_help());
        assert_eq!(state.windows().current, &files(4)[0..1]);
    }

    #[test]
    fn test_cancelled_picker_keeps_state() {
        let state = loaded(5, 2);
        let (state, _) = press(&state, Command::Advance);

        let (opened, _) = press(&state, Command::Open);
        let (after, effects) = reduce(&opened, Action::PickerClosed { generation: opened.generation, paths: vec![] });

        assert!(effects.is_empty());
        assert_eq!(after.files, state.files);
        assert_eq!(after.index, 2);
    }

    #[test]
    fn test_open_resets_index_and_help() {
        let state = loaded(10, 3);
        let (state, _) = press(&state, Command::Advance);
        let (state, _) = press(&state, Command::ToggleHelp);
        assert_eq!(state.index, 3);

        let (state, _) = press(&state, Command::Open);
        let (state, _) = reduce(&state, Action::PickerClosed { generation: state.generation, paths: vec!["/b".into()] });
        assert_eq!(state.view_mode, ViewMode::Browsing);
        let (state, _) = reduce(
            &state,
            Action::FilesResolved { generation: state.generation, origin: ResolveOrigin::Open, files: files(6) },
        );
        assert_eq!(state.index, 0);
        assert_eq!(state.files.len(), 6);
    }

    #[test]
    fn test_reload_keeps_index() {
        let state = loaded(10, 3);
        let (state, _) = press(&state, Command::Advance);
        let (state, _) = press(&state, Command::ToggleHelp);

        let (state, effects) = press(&state, Command::Reload);
        assert_eq!(state.view_mode, ViewMode::Browsing);
        assert_eq!(
            effects,
            vec![Effect::Resolve {
                generation: state.generation,
                origin: ResolveOrigin::Reload,
                paths: vec!["/img".into()],
            }]
        );

        let (state, _) = reduce(
            &state,
            Action::FilesResolved { generation: state.generation, origin: ResolveOrigin::Reload, files: files(12) },
        );
        assert_eq!(state.index, 3);
        assert_eq!(state.files.len(), 12);
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let state = loaded(3, 1);
        let (first, _) = press(&state, Command::Reload);
        let stale_generation = first.generation;
        let (second, _) = press(&first, Command::Reload);

        let (after, effects) = reduce(
            &second,
            Action::FilesResolved { generation: stale_generation, origin: ResolveOrigin::Reload, files: files(99) },
        );
        assert!(effects.is_empty());
        assert_eq!(after.files.len(), 3);

        let (after, _) = reduce(
            &second,
            Action::MetadataFetched {
                generation: stale_generation,
                entries: vec![(files(1)[0].clone(), MetadataEntry::default())],
            },
        );
        assert!(after.metadata.is_empty());
    }

    #[test]
    fn test_advance() {
        let state = loaded(10, 3);
        let (state, effects) = press(&state, Command::Advance);
        assert!(effects.is_empty());
        assert_eq!(state.index, 3);
        assert_eq!(state.windows().current, &files(10)[3..6]);
    }

    #[test]
    fn test_advance_at_end_stays() {
        let mut state = loaded(10, 3);
        state.index = 8;
        let (state, _) = press(&state, Command::Advance);
        assert_eq!(state.index, 8);
    }

    #[test]
    fn test_retreat_floors_at_zero() {
        let mut state = loaded(10, 3);
        state.index = 2;
        let (state, _) = press(&state, Command::Retreat);
        assert_eq!(state.index, 0);
    }

    #[test]
    fn test_first_and_last() {
        let state = loaded(5, 2);
        let (state, _) = press(&state, Command::GoLast);
        assert_eq!(state.index, 3);
        assert_eq!(state.windows().current, &files(5)[3..5]);

        let (state, _) = press(&state, Command::GoFirst);
        assert_eq!(state.index, 0);
    }

    #[test]
    fn test_last_with_oversized_page_falls_back_to_help() {
        let state = loaded(5, 10);
        let (state, _) = press(&state, Command::GoLast);
        assert_eq!(state.index, -5);
        assert!(state.windows().current.is_empty());
        assert!(state.shows_help());
        assert_eq!(state.view_mode, ViewMode::Browsing);
    }

    #[test]
    fn test_steps_change_and_persist() {
        let state = loaded(5, 1);
        let (state, effects) = press(&state, Command::IncreaseSteps);
        assert_eq!(state.steps, 2);
        assert_eq!(
            effects,
            vec![Effect::PersistSettings(ViewerSettings { steps: 2, tooltip_enabled: false })]
        );

        let (state, _) = press(&state, Command::DecreaseSteps);
        assert_eq!(state.steps, 1);
    }

    #[test]
    fn test_decrease_steps_floors_at_one() {
        let state = loaded(5, 1);
        let (state, effects) = press(&state, Command::DecreaseSteps);
        assert_eq!(state.steps, 1);
        assert!(effects.is_empty());
        let (state, _) = press(&state, Command::DecreaseSteps);
        assert_eq!(state.steps, 1);
    }

    #[test]
    fn test_help_toggle_twice() {
        let mut state = loaded(10, 3);
        state.index = 3;
        let (once, _) = press(&state, Command::ToggleHelp);
        assert_eq!(once.view_mode, ViewMode::Help);
        assert!(once.shows_help());

        let (twice, _) = press(&once, Command::ToggleHelp);
        assert_eq!(twice.view_mode, ViewMode::Browsing);
        assert_eq!(twice.index, 3);
        assert_eq!(twice.steps, 3);
    }

    #[test]
    fn test_delegated_commands() {
        let state = loaded(2, 1);
        assert_eq!(press(&state, Command::Quit).1, vec![Effect::Quit]);
        assert_eq!(press(&state, Command::ToggleDevTools).1, vec![Effect::ToggleDevTools]);
    }

    #[test]
    fn test_tooltip_requests_metadata_once() {
        let state = loaded(10, 2);
        let (state, effects) = press(&state, Command::ToggleTooltip);
        assert!(state.tooltip_enabled);

        let expected: Vec<String> = files(10)[0..4].to_vec();
        assert_eq!(
            effects,
            vec![
                Effect::PersistSettings(ViewerSettings { steps: 2, tooltip_enabled: true }),
                Effect::FetchMetadata { generation: state.generation, paths: expected.clone() },
            ]
        );

        // Same page again while the fetch is in flight: nothing new to ask for
        let (state, effects) = press(&state, Command::GoFirst);
        assert!(effects.is_empty());

        let entries: Vec<(String, MetadataEntry)> =
            expected.iter().map(|p| (p.clone(), MetadataEntry::default())).collect();
        let (state, effects) = reduce(&state, Action::MetadataFetched { generation: state.generation, entries });
        assert!(effects.is_empty());
        assert_eq!(state.metadata.len(), 4);
        assert_eq!(state.pending_metadata().count(), 0);

        // Next page only needs the two images after the cached ones
        let (_, effects) = press(&state, Command::Advance);
        assert_eq!(
            effects,
            vec![Effect::FetchMetadata { generation: state.generation, paths: files(10)[4..6].to_vec() }]
        );
    }

    #[test]
    fn test_no_metadata_without_tooltips() {
        let state = loaded(10, 2);
        let (_, effects) = press(&state, Command::Advance);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_reload_clears_metadata() {
        let state = loaded(4, 1);
        let (state, _) = press(&state, Command::ToggleTooltip);
        let entries = vec![(files(4)[0].clone(), MetadataEntry::default())];
        let (state, _) = reduce(&state, Action::MetadataFetched { generation: state.generation, entries });
        assert_eq!(state.metadata.len(), 1);

        let (state, _) = press(&state, Command::Reload);
        assert!(state.metadata.is_empty());
    }

    #[test]
    fn test_metadata_stays_within_new_selection() {
        let state = loaded(4, 2);
        let (state, _) = press(&state, Command::ToggleTooltip);
        let old_list = state.files.to_vec();

        let (state, effects) = press(&state, Command::Open);
        assert_eq!(effects, vec![Effect::ShowPicker { generation: state.generation }]);

        let (state, effects) = reduce(
            &state,
            Action::PickerClosed { generation: state.generation, paths: vec!["/b".into()] },
        );
        assert!(effects.iter().all(|e| !matches!(e, Effect::FetchMetadata { .. })));

        let new_list: Vec<String> = (0..3).map(|i| format!("/b/{}.png", i)).collect();
        let (state, effects) = reduce(
            &state,
            Action::FilesResolved { generation: state.generation, origin: ResolveOrigin::Open, files: new_list.clone() },
        );
        assert_eq!(
            effects,
            vec![Effect::FetchMetadata { generation: state.generation, paths: new_list.clone() }]
        );

        // A fetch for the previous list arriving under the current generation
        let entries: Vec<(String, MetadataEntry)> =
            old_list[0..2].iter().map(|p| (p.clone(), MetadataEntry::default())).collect();
        let (state, _) = reduce(&state, Action::MetadataFetched { generation: state.generation, entries });

        assert!(state.metadata.is_empty());
        assert!(state.metadata.iter().all(|(path, _)| state.files.contains(path)));
    }

    #[test]
    fn test_cancelled_picker_resumes_metadata() {
        let state = loaded(4, 1);
        let (state, _) = press(&state, Command::ToggleTooltip);

        let (state, effects) = press(&state, Command::Open);
        assert_eq!(effects.len(), 1);

        let (state, effects) = reduce(&state, Action::PickerClosed { generation: state.generation, paths: vec![] });
        assert_eq!(
            effects,
            vec![Effect::FetchMetadata { generation: state.generation, paths: files(4)[0..2].to_vec() }]
        );
    }

    #[test]
    fn test_increase_steps_stops_at_cap() {
        let state = ViewerState::new(ViewerSettings { steps: MAX_STEPS, tooltip_enabled: false });
        let (state, effects) = press(&state, Command::IncreaseSteps);
        assert_eq!(state.steps, MAX_STEPS);
        assert!(effects.is_empty());

        let state = ViewerState::new(ViewerSettings { steps: usize::MAX, tooltip_enabled: true });
        assert_eq!(state.steps, MAX_STEPS);
        assert!(state.shows_help());
    }

    #[test]
    fn test_position_label() {
        let state = loaded(10, 3);
        assert_eq!(state.position_label(), "1-3 / 10");
        let (state, _) = press(&state, Command::DecreaseSteps);
        let (state, _) = press(&state, Command::DecreaseSteps);
        assert_eq!(state.position_label(), "1 / 10");
        assert_eq!(ViewerState::default().position_label(), "");
    }
}
