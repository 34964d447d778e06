//! Event channels exposed by variables (`spec.md` §4.2).

/// The kind of change that just happened to a variable, used to pick which
/// watch lists to enqueue. A single mutation can raise several of these at
/// once (tightening a bound to a singleton raises `Range`, `Domain` and
/// `Bound` together, for instance).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    /// The variable just became bound (domain reduced to a single value).
    Bound,
    /// Either bound (`min` or `max`) moved.
    Range,
    /// Any value was removed from the domain, bound or not.
    Domain,
    /// The variable was bound by an explicit assignment (`set_value`).
    Value,
}

impl DomainEvent {
    pub const ALL: [DomainEvent; 4] =
        [DomainEvent::Bound, DomainEvent::Range, DomainEvent::Domain, DomainEvent::Value];
}
