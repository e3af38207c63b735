/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical lifecycle in one step:
///
/// 1. **Decide**: Calls `aggregate.handle(command)` to get events (pure, no mutation)
/// 2. **Evolve**: Applies each event to the aggregate via `aggregate.apply(event)`
///
/// Note: This function mutates the aggregate in place. Persistence and
/// publication of the returned events are the caller's unit of work — a
/// recompute-and-persist cycle is one scoped read-modify-write.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: batcherp_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
