use crate::domain::{
    BlockedPeriod, Booking, BookingRequest, DateRange, DisabledDateIndex, PriceBreakdown,
    PricingError, PricingPolicy, PropertyListing, RangeSelection, SessionError, StayQuote,
    InvalidRangeError, compute_blocked_periods, expand_range,
};
use chrono::NaiveDate;
use log::{debug, info};

/// Where the user is in picking a stay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Partial {
        from: NaiveDate,
    },
    Complete {
        from: NaiveDate,
        to: NaiveDate,
    },
}

impl Selection {
    pub fn range(&self) -> RangeSelection {
        match *self {
            Selection::Idle => RangeSelection::default(),
            Selection::Partial { from } => RangeSelection::starting(from),
            Selection::Complete { from, to } => RangeSelection::between(from, to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Idle,
    PartialSelection,
    CompleteSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A property view was opened; replaces whatever was open before.
    Open {
        listing: PropertyListing,
        bookings: Vec<Booking>,
        today: NaiveDate,
    },
    /// The user clicked a day on the calendar.
    PickDay(NaiveDate),
    /// The calendar reported a whole range at once. Unlike clicks, an end
    /// before the start is an error rather than a reordering.
    SetRange(RangeSelection),
    Clear,
    Close,
}

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Opened {
        disabled_days: usize,
    },
    Started {
        from: NaiveDate,
    },
    Completed {
        from: NaiveDate,
        to: NaiveDate,
    },
    /// The candidate range touched a blocked day; the selection was reset.
    Rejected {
        from: NaiveDate,
        to: NaiveDate,
        conflicts: Vec<NaiveDate>,
    },
    /// Start and end fell on the same day; the selection was reset.
    Degenerate {
        day: NaiveDate,
    },
    Cleared,
    Closed,
}

#[derive(Debug, Clone)]
struct PropertyView {
    listing: PropertyListing,
    bookings: Vec<Booking>,
    blocked: Vec<BlockedPeriod>,
    disabled: DisabledDateIndex,
    selection: Selection,
}

impl PropertyView {
    fn new(listing: PropertyListing, bookings: Vec<Booking>, today: NaiveDate) -> Self {
        let blocked = compute_blocked_periods(&bookings, today);
        let disabled = DisabledDateIndex::from_periods(&blocked);
        Self {
            listing,
            bookings,
            blocked,
            disabled,
            selection: Selection::Idle,
        }
    }

    fn begin(&mut self, from: NaiveDate) -> Transition {
        self.selection = Selection::Partial { from };
        Transition::Started { from }
    }

    fn finish(&mut self, from: NaiveDate, to: NaiveDate) -> Transition {
        if from == to {
            self.selection = Selection::Idle;
            return Transition::Degenerate { day: from };
        }

        let range = DateRange::new(from, to);
        let days = expand_range(Some(&RangeSelection::between(range.start, range.end)));
        let conflicts = self.disabled.conflicts(&days);

        if conflicts.is_empty() {
            self.selection = Selection::Complete {
                from: range.start,
                to: range.end,
            };
            Transition::Completed {
                from: range.start,
                to: range.end,
            }
        } else {
            info!(
                "Rejected {} -> {} for property {}: {} blocked days",
                range.start,
                range.end,
                self.listing.id,
                conflicts.len()
            );
            self.selection = Selection::Idle;
            Transition::Rejected {
                from: range.start,
                to: range.end,
                conflicts,
            }
        }
    }
}

/// Per-view booking selection.
///
/// All mutation goes through [`SelectionSession::apply`]; the other mutating
/// methods are shorthands for it.
#[derive(Debug, Clone, Default)]
pub struct SelectionSession {
    view: Option<PropertyView>,
    policy: PricingPolicy,
}

impl SelectionSession {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { view: None, policy }
    }

    pub fn apply(&mut self, event: SelectionEvent) -> Result<Transition, SessionError> {
        let transition = match event {
            SelectionEvent::Open {
                listing,
                bookings,
                today,
            } => {
                let view = PropertyView::new(listing, bookings, today);
                let disabled_days = view.disabled.len();
                self.view = Some(view);
                Transition::Opened { disabled_days }
            }
            SelectionEvent::Close => {
                self.view = None;
                Transition::Closed
            }
            SelectionEvent::Clear => {
                self.view_mut()?.selection = Selection::Idle;
                Transition::Cleared
            }
            SelectionEvent::PickDay(day) => {
                let view = self.view_mut()?;
                match view.selection {
                    Selection::Partial { from } => view.finish(from, day),
                    Selection::Idle | Selection::Complete { .. } => view.begin(day),
                }
            }
            SelectionEvent::SetRange(range) => {
                let view = self.view_mut()?;
                match (range.from, range.to) {
                    (Some(from), Some(to)) if to < from => {
                        view.selection = Selection::Idle;
                        return Err(InvalidRangeError {
                            check_in: from,
                            check_out: to,
                        }
                        .into());
                    }
                    (Some(from), Some(to)) => view.finish(from, to),
                    (Some(from), None) => view.begin(from),
                    (None, _) => {
                        view.selection = Selection::Idle;
                        Transition::Cleared
                    }
                }
            }
        };

        debug!("Selection transition: {transition:?}");
        Ok(transition)
    }

    pub fn open(
        &mut self,
        listing: PropertyListing,
        bookings: Vec<Booking>,
        today: NaiveDate,
    ) -> Result<Transition, SessionError> {
        self.apply(SelectionEvent::Open {
            listing,
            bookings,
            today,
        })
    }

    pub fn pick_day(&mut self, day: NaiveDate) -> Result<Transition, SessionError> {
        self.apply(SelectionEvent::PickDay(day))
    }

    pub fn set_range(&mut self, range: RangeSelection) -> Result<Transition, SessionError> {
        self.apply(SelectionEvent::SetRange(range))
    }

    pub fn clear(&mut self) -> Result<Transition, SessionError> {
        self.apply(SelectionEvent::Clear)
    }

    pub fn close(&mut self) -> Result<Transition, SessionError> {
        self.apply(SelectionEvent::Close)
    }

    pub fn state(&self) -> SessionState {
        match self.view.as_ref().map(|view| view.selection) {
            None => SessionState::Uninitialized,
            Some(Selection::Idle) => SessionState::Idle,
            Some(Selection::Partial { .. }) => SessionState::PartialSelection,
            Some(Selection::Complete { .. }) => SessionState::CompleteSelection,
        }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn listing(&self) -> Option<&PropertyListing> {
        self.view.as_ref().map(|view| &view.listing)
    }

    pub fn bookings(&self) -> &[Booking] {
        self.view
            .as_ref()
            .map(|view| view.bookings.as_slice())
            .unwrap_or_default()
    }

    pub fn blocked_periods(&self) -> &[BlockedPeriod] {
        self.view
            .as_ref()
            .map(|view| view.blocked.as_slice())
            .unwrap_or_default()
    }

    pub fn disabled_dates(&self) -> Option<&DisabledDateIndex> {
        self.view.as_ref().map(|view| &view.disabled)
    }

    pub fn is_disabled(&self, day: NaiveDate) -> bool {
        self.disabled_dates().is_some_and(|index| index.contains(day))
    }

    pub fn selection(&self) -> Selection {
        self.view.as_ref().map(|view| view.selection).unwrap_or_default()
    }

    /// Booking payload, available only once a full range has been accepted.
    pub fn confirmation(&self) -> Option<BookingRequest> {
        let view = self.view.as_ref()?;
        match view.selection {
            Selection::Complete { from, to } => Some(BookingRequest {
                property_id: view.listing.id,
                check_in: from,
                check_out: to,
            }),
            _ => None,
        }
    }

    pub fn price_breakdown(&self) -> Result<Option<PriceBreakdown>, PricingError> {
        let Some(view) = self.view.as_ref() else {
            return Ok(None);
        };
        self.confirmation()
            .map(|request| {
                self.policy.calculate_total(&StayQuote {
                    check_in: request.check_in,
                    check_out: request.check_out,
                    price: view.listing.nightly_price,
                })
            })
            .transpose()
    }

    fn view_mut(&mut self) -> Result<&mut PropertyView, SessionError> {
        self.view.as_mut().ok_or(SessionError::NotOpen)
    }
}
