use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::resolver::{resolve, ResolvedRange};
use super::selection::{CalendarBound, CustomRange, PresetDays, RangeSelection};

/// Label shown on the custom range button when no custom range is active
pub const CUSTOM_RANGE_PLACEHOLDER: &str = "Pick a custom date range";

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Holds the chart's range selection and its resolved range.
///
/// All changes go through the named transitions below; the resolved range is
/// always recomputed from the selection and never set directly. Subscribers
/// are notified only when the resolved range actually changes.
pub struct RangeStateStore {
    selection: RangeSelection,
    bound: CalendarBound,
    clock: Clock,
    resolved: watch::Sender<ResolvedRange>,
}

impl fmt::Debug for RangeStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeStateStore")
            .field("selection", &self.selection)
            .field("bound", &self.bound)
            .field("resolved", &*self.resolved.borrow())
            .finish()
    }
}

impl Default for RangeStateStore {
    fn default() -> Self {
        Self::new(CalendarBound::default())
    }
}

impl RangeStateStore {
    /// Create a store on the default 30 day preset using the system clock
    pub fn new(bound: CalendarBound) -> Self {
        Self::with_clock(bound, Utc::now)
    }

    /// Create a store that reads the current time from `clock`
    pub fn with_clock<F>(bound: CalendarBound, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        let clock: Clock = Arc::new(clock);
        let selection = RangeSelection::default();
        let (resolved, _) = watch::channel(resolve(&selection, clock()));

        Self {
            selection,
            bound,
            clock,
            resolved,
        }
    }

    /// Current selection
    pub fn selection(&self) -> RangeSelection {
        self.selection
    }

    /// Current resolved range
    pub fn resolved_range(&self) -> ResolvedRange {
        self.resolved.borrow().clone()
    }

    /// Receive resolved range changes
    pub fn subscribe(&self) -> watch::Receiver<ResolvedRange> {
        self.resolved.subscribe()
    }

    pub fn calendar_bound(&self) -> CalendarBound {
        self.bound
    }

    /// Today's date according to the store clock
    pub fn today(&self) -> NaiveDate {
        (self.clock)().date_naive()
    }

    /// Whether the custom range calendar should allow picking `date`
    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        self.bound.is_selectable(date, self.today())
    }

    /// Switch to a trailing preset, clearing any custom range
    pub fn select_preset(&mut self, days: PresetDays) {
        self.apply(RangeSelection::Preset(days));
    }

    /// Apply a custom range pick.
    ///
    /// `None` clears the custom range and falls back to the default preset.
    /// A pick with only one endpoint leaves nothing to fetch until the second
    /// endpoint arrives. Reversed endpoints are swapped and dates past the
    /// calendar bound are clamped to it.
    pub fn select_custom_range(&mut self, range: Option<CustomRange>) {
        let selection = match range {
            None => RangeSelection::default(),
            Some(CustomRange { from: Some(from), to: Some(to) }) => {
                let (from, to) = if from <= to { (from, to) } else { (to, from) };
                let last = self.bound.last_selectable(self.today());
                RangeSelection::Custom {
                    from: from.min(last),
                    to: to.min(last),
                }
            }
            Some(_) => RangeSelection::Empty,
        };
        self.apply(selection);
    }

    /// Back to the default 30 day preset
    pub fn reset(&mut self) {
        self.apply(RangeSelection::default());
    }

    /// Re-resolve the current selection against the current time
    pub fn refresh(&mut self) {
        self.apply(self.selection);
    }

    /// Text for the custom range button
    pub fn custom_label(&self) -> String {
        match self.selection.custom() {
            Some((from, to)) => format!("{}-{}", from.format("%m/%d/%Y"), to.format("%m/%d/%Y")),
            None => CUSTOM_RANGE_PLACEHOLDER.to_string(),
        }
    }

    fn apply(&mut self, selection: RangeSelection) {
        self.selection = selection;
        let next = resolve(&selection, (self.clock)());

        let changed = self.resolved.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        if changed {
            debug!("Range selection changed to {:?}", self.selection);
        }
    }
}
